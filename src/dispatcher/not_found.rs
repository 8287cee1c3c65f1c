use super::handler::HandlerRef;
use crate::error::ConfigurationError;
use crate::router::{normalize_template, CompiledPattern};

#[derive(Debug, Clone)]
enum Scope {
    /// Path equal to the prefix or below it
    Prefix {
        prefix: String,
        case_insensitive: bool,
    },
    Pattern(CompiledPattern),
}

impl Scope {
    fn covers(&self, path: &str) -> bool {
        match self {
            Scope::Prefix { prefix, .. } if prefix == "/" => true,
            Scope::Prefix {
                prefix,
                case_insensitive,
            } => {
                let Some(head) = path.get(..prefix.len()) else {
                    return false;
                };
                let same = if *case_insensitive {
                    head.eq_ignore_ascii_case(prefix)
                } else {
                    head == prefix
                };
                let rest = &path[prefix.len()..];
                same && (rest.is_empty() || rest.starts_with('/'))
            }
            Scope::Pattern(pattern) => pattern.is_match(path),
        }
    }
}

/// Handlers invoked when no route matches
///
/// Scoped handlers are tested in registration order against the normalized
/// request path; the first that covers it wins. Otherwise the fallback runs, and
/// without a fallback the dispatcher answers with a plain 404.
#[derive(Debug, Clone, Default)]
pub struct NotFoundHandlers {
    scoped: Vec<(Scope, HandlerRef)>,
    fallback: Option<HandlerRef>,
}

impl NotFoundHandlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler used when no scoped handler applies
    pub fn set_fallback(&mut self, handler: HandlerRef) {
        self.fallback = Some(handler);
    }

    /// Add a handler for paths under `scope`
    ///
    /// A scope containing `{` is compiled as a path template (`/api/{version}/{rest:all}`);
    /// anything else is a path prefix matched on segment boundaries.
    ///
    /// # Errors
    ///
    /// Template scopes fail like route templates do.
    pub fn add_scoped(
        &mut self,
        scope: &str,
        handler: HandlerRef,
        case_insensitive: bool,
    ) -> Result<(), ConfigurationError> {
        let template = normalize_template(scope);
        let scope = if template.contains('{') {
            Scope::Pattern(CompiledPattern::compile(&template, case_insensitive)?)
        } else {
            Scope::Prefix {
                prefix: template,
                case_insensitive,
            }
        };
        self.scoped.push((scope, handler));
        Ok(())
    }

    /// The handler responsible for `path`, if any
    #[must_use]
    pub fn select(&self, path: &str) -> Option<&HandlerRef> {
        self.scoped
            .iter()
            .find(|(scope, _)| scope.covers(path))
            .map(|(_, handler)| handler)
            .or(self.fallback.as_ref())
    }
}
