use std::fmt;

/// Registration-time error
///
/// Returned while routes, groups and resources are being registered. Every
/// variant describes a malformed registration and is meant to abort bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A route was registered with an empty method list
    EmptyMethods {
        /// The path the route was registered for
        path: String,
    },
    /// A method token could not be parsed as an HTTP method
    InvalidMethod {
        /// The rejected token
        method: String,
    },
    /// A middleware alias was referenced but never registered
    UnknownMiddleware {
        /// The alias that could not be resolved
        name: String,
    },
    /// A route name was registered twice
    DuplicateRouteName {
        /// The effective (prefixed) route name
        name: String,
    },
    /// A route that already carries a name was named again
    RouteAlreadyNamed {
        /// The name the route already carries
        existing: String,
        /// The rejected second name
        name: String,
    },
    /// A resource base path yields no route-name stem and none was given
    UnnamedResource {
        /// The resource base path
        base: String,
    },
    /// A placeholder is not of the form `{name}` or `{name:type}`
    InvalidPlaceholder {
        /// The path template containing the placeholder
        path: String,
        /// The offending placeholder text
        placeholder: String,
    },
    /// A placeholder declared a type other than `num`, `str`, `any` or `all`
    UnknownPlaceholderType {
        /// The path template containing the placeholder
        path: String,
        /// The declared type
        kind: String,
    },
    /// The compiled matcher was rejected by the regex engine
    ///
    /// The most common cause is the same placeholder name used twice in one template.
    InvalidPattern {
        /// The path template
        path: String,
        /// Error reported by the regex engine
        reason: String,
    },
    /// A handler string was not of the form `Type@method`
    InvalidHandler {
        /// The rejected handler string
        handler: String,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::EmptyMethods { path } => {
                write!(f, "route '{path}' must declare at least one HTTP method")
            }
            ConfigurationError::InvalidMethod { method } => {
                write!(f, "'{method}' is not a valid HTTP method token")
            }
            ConfigurationError::UnknownMiddleware { name } => {
                write!(
                    f,
                    "middleware '{name}' is not registered. \
                    Register it with Router::alias_middleware before referencing it."
                )
            }
            ConfigurationError::DuplicateRouteName { name } => {
                write!(f, "route name '{name}' is already registered")
            }
            ConfigurationError::RouteAlreadyNamed { existing, name } => {
                write!(
                    f,
                    "cannot name route '{existing}' again as '{name}'. A route carries one name"
                )
            }
            ConfigurationError::UnnamedResource { base } => {
                write!(
                    f,
                    "resource '{base}' has no name stem. \
                    Set one with ResourceOptions::name"
                )
            }
            ConfigurationError::InvalidPlaceholder { path, placeholder } => {
                write!(
                    f,
                    "invalid placeholder '{placeholder}' in '{path}'. \
                    Expected {{name}} or {{name:type}}"
                )
            }
            ConfigurationError::UnknownPlaceholderType { path, kind } => {
                write!(
                    f,
                    "unknown placeholder type '{kind}' in '{path}'. \
                    Expected one of: num, str, any, all"
                )
            }
            ConfigurationError::InvalidPattern { path, reason } => {
                write!(f, "path '{path}' does not compile to a matcher: {reason}")
            }
            ConfigurationError::InvalidHandler { handler } => {
                write!(
                    f,
                    "invalid handler reference '{handler}'. Expected format: Type@method"
                )
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Error returned by URL generation for named routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// No route carries the requested name
    RouteNotFound {
        /// The requested name
        name: String,
    },
    /// Fewer positional arguments were supplied than the template has required placeholders
    MissingArgument {
        /// The route name
        name: String,
        /// The first placeholder left without a value
        parameter: String,
    },
}

impl fmt::Display for UrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlError::RouteNotFound { name } => write!(f, "no route named '{name}'"),
            UrlError::MissingArgument { name, parameter } => {
                write!(f, "route '{name}' requires a value for '{parameter}'")
            }
        }
    }
}

impl std::error::Error for UrlError {}

/// A handler reference could not be resolved when the route was invoked
///
/// Surfaced to the caller of [`crate::dispatcher::Dispatcher::run`] inside the
/// `anyhow::Error` of the handler result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResolutionError {
    /// `Type@method` referenced a controller type that was never registered
    UnknownController {
        /// The controller type name
        controller: String,
    },
    /// The controller does not answer to the requested action
    UnknownAction {
        /// The controller type name (or `<instance>` for live instances)
        controller: String,
        /// The action name
        action: String,
    },
}

impl fmt::Display for HandlerResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerResolutionError::UnknownController { controller } => {
                write!(f, "controller '{controller}' is not registered")
            }
            HandlerResolutionError::UnknownAction { controller, action } => {
                write!(f, "controller '{controller}' has no action '{action}'")
            }
        }
    }
}

impl std::error::Error for HandlerResolutionError {}
