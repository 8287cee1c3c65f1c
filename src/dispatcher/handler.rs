use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::request::{HandlerRequest, HandlerResult};
use crate::error::{ConfigurationError, HandlerResolutionError};

/// In-process handler function
pub type HandlerFn = Arc<dyn Fn(&mut HandlerRequest) -> HandlerResult + Send + Sync>;

/// A type that answers named actions
///
/// Used for `Type@method` handler references and for resource routes. Return
/// `None` for actions the controller does not provide.
///
/// ```rust
/// use routekit::dispatcher::{Controller, HandlerRequest, HandlerResponse, HandlerResult};
///
/// struct PostController;
///
/// impl Controller for PostController {
///     fn call(&self, action: &str, req: &mut HandlerRequest) -> Option<HandlerResult> {
///         let body = match action {
///             "index" => serde_json::json!([]),
///             "show" => serde_json::json!({ "id": req.get_path_param("id") }),
///             _ => return None,
///         };
///         Some(Ok(HandlerResponse::json(200, body)))
///     }
/// }
/// ```
pub trait Controller: Send + Sync {
    fn call(&self, action: &str, req: &mut HandlerRequest) -> Option<HandlerResult>;
}

/// What a route invokes
///
/// References other than [`HandlerRef::Callable`] are resolved each time the
/// route is invoked, not at registration.
#[derive(Clone)]
pub enum HandlerRef {
    /// A function called directly
    Callable(HandlerFn),
    /// `Type@method`: a fresh controller instance from the registry, then the action
    TypeMethod { controller: String, action: String },
    /// An action on a live controller instance
    InstanceMethod {
        instance: Arc<dyn Controller>,
        action: String,
    },
}

impl HandlerRef {
    /// Reference an in-process function
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&mut HandlerRequest) -> HandlerResult + Send + Sync + 'static,
    {
        HandlerRef::Callable(Arc::new(f))
    }

    /// Reference `action` on the controller type registered as `controller`
    pub fn action(controller: impl Into<String>, action: impl Into<String>) -> Self {
        HandlerRef::TypeMethod {
            controller: controller.into(),
            action: action.into(),
        }
    }

    /// Reference `action` on a live controller instance
    pub fn instance(instance: Arc<dyn Controller>, action: impl Into<String>) -> Self {
        HandlerRef::InstanceMethod {
            instance,
            action: action.into(),
        }
    }

    /// Parse a `Type@method` reference
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidHandler`] unless the string has exactly one
    /// `@` with text on both sides.
    pub fn parse(reference: &str) -> Result<Self, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidHandler {
            handler: reference.to_string(),
        };
        let (controller, action) = reference.split_once('@').ok_or_else(invalid)?;
        let (controller, action) = (controller.trim(), action.trim());
        if controller.is_empty() || action.is_empty() || action.contains('@') {
            return Err(invalid());
        }
        Ok(Self::action(controller, action))
    }

    /// Resolve and call the handler
    pub(crate) fn invoke(
        &self,
        req: &mut HandlerRequest,
        controllers: &ControllerRegistry,
    ) -> HandlerResult {
        match self {
            HandlerRef::Callable(f) => f(req),
            HandlerRef::TypeMethod { controller, action } => {
                let instance = controllers.resolve(controller).ok_or_else(|| {
                    HandlerResolutionError::UnknownController {
                        controller: controller.clone(),
                    }
                })?;
                instance.call(action, req).unwrap_or_else(|| {
                    Err(HandlerResolutionError::UnknownAction {
                        controller: controller.clone(),
                        action: action.clone(),
                    }
                    .into())
                })
            }
            HandlerRef::InstanceMethod { instance, action } => {
                instance.call(action, req).unwrap_or_else(|| {
                    Err(HandlerResolutionError::UnknownAction {
                        controller: "<instance>".to_string(),
                        action: action.clone(),
                    }
                    .into())
                })
            }
        }
    }
}

impl<F> From<F> for HandlerRef
where
    F: Fn(&mut HandlerRequest) -> HandlerResult + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        HandlerRef::func(f)
    }
}

impl FromStr for HandlerRef {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Callable(_) => f.write_str("Callable(..)"),
            HandlerRef::TypeMethod { controller, action } => write!(f, "{controller}@{action}"),
            HandlerRef::InstanceMethod { action, .. } => write!(f, "<instance>@{action}"),
        }
    }
}

type ControllerFactory = Arc<dyn Fn() -> Arc<dyn Controller> + Send + Sync>;

/// Controller type name → factory
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any earlier registration
    pub fn register<C, F>(&mut self, name: impl Into<String>, factory: F)
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.factories.insert(
            name.into(),
            Arc::new(move || Arc::new(factory()) as Arc<dyn Controller>),
        );
    }

    /// Build a fresh instance of the controller registered as `name`
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Controller>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
