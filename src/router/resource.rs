//! Conventional CRUD route sets.
//!
//! | action    | method   | path                  |
//! |-----------|----------|-----------------------|
//! | `index`   | `GET`    | `{base}`              |
//! | `create`  | `GET`    | `{base}/create`       |
//! | `store`   | `POST`   | `{base}`              |
//! | `show`    | `GET`    | `{base}/{id}`         |
//! | `edit`    | `GET`    | `{base}/{id}/edit`    |
//! | `update`  | `PUT`    | `{base}/{id}`         |
//! | `destroy` | `DELETE` | `{base}/{id}`         |
//!
//! Routes are always registered in table order, so `/posts/create` is tried
//! before `/posts/{id}`.

use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::core::MiddlewareRef;
use crate::dispatcher::{Controller, HandlerRef};
use crate::error::ConfigurationError;

/// One of the seven conventional resource actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    Index,
    Create,
    Store,
    Show,
    Edit,
    Update,
    Destroy,
}

impl ResourceAction {
    /// Every action, in registration order
    pub const ALL: [ResourceAction; 7] = [
        ResourceAction::Index,
        ResourceAction::Create,
        ResourceAction::Store,
        ResourceAction::Show,
        ResourceAction::Edit,
        ResourceAction::Update,
        ResourceAction::Destroy,
    ];

    /// Actions of an API resource: everything but the two HTML form pages
    pub const API: [ResourceAction; 5] = [
        ResourceAction::Index,
        ResourceAction::Store,
        ResourceAction::Show,
        ResourceAction::Update,
        ResourceAction::Destroy,
    ];

    /// Lowercase action name, also used as the route name suffix and the
    /// controller action
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceAction::Index => "index",
            ResourceAction::Create => "create",
            ResourceAction::Store => "store",
            ResourceAction::Show => "show",
            ResourceAction::Edit => "edit",
            ResourceAction::Update => "update",
            ResourceAction::Destroy => "destroy",
        }
    }

    #[must_use]
    pub fn parse(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == action)
    }

    #[must_use]
    pub fn method(self) -> Method {
        match self {
            ResourceAction::Index
            | ResourceAction::Create
            | ResourceAction::Show
            | ResourceAction::Edit => Method::GET,
            ResourceAction::Store => Method::POST,
            ResourceAction::Update => Method::PUT,
            ResourceAction::Destroy => Method::DELETE,
        }
    }

    /// Path relative to the resource base, using `{parameter}` for the member id
    #[must_use]
    pub fn path(self, parameter: &str) -> String {
        match self {
            ResourceAction::Index | ResourceAction::Store => String::new(),
            ResourceAction::Create => "/create".to_string(),
            ResourceAction::Show | ResourceAction::Update | ResourceAction::Destroy => {
                format!("/{{{parameter}}}")
            }
            ResourceAction::Edit => format!("/{{{parameter}}}/edit"),
        }
    }
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the handlers of a resource come from
#[derive(Clone)]
pub enum ResourceSource {
    /// A controller type registered with [`super::Router::controller`]; each
    /// action resolves to `Type@action` when invoked
    Type(String),
    /// A live controller; actions are looked up by name on it
    Instance(Arc<dyn Controller>),
    /// Explicit handlers; actions without an entry are skipped
    Actions(HashMap<ResourceAction, HandlerRef>),
}

impl ResourceSource {
    pub fn controller(name: impl Into<String>) -> Self {
        ResourceSource::Type(name.into())
    }

    pub fn instance(instance: Arc<dyn Controller>) -> Self {
        ResourceSource::Instance(instance)
    }

    pub fn actions(actions: impl IntoIterator<Item = (ResourceAction, HandlerRef)>) -> Self {
        ResourceSource::Actions(actions.into_iter().collect())
    }

    pub(crate) fn handler_for(&self, action: ResourceAction) -> Option<HandlerRef> {
        match self {
            ResourceSource::Type(name) => Some(HandlerRef::action(name.as_str(), action.as_str())),
            ResourceSource::Instance(instance) => {
                Some(HandlerRef::instance(Arc::clone(instance), action.as_str()))
            }
            ResourceSource::Actions(map) => map.get(&action).cloned(),
        }
    }
}

/// Options for [`super::Router::resource`]
#[derive(Clone, Default)]
pub struct ResourceOptions {
    pub(crate) only: Option<Vec<ResourceAction>>,
    pub(crate) except: Vec<ResourceAction>,
    pub(crate) name: Option<String>,
    pub(crate) names: HashMap<ResourceAction, String>,
    pub(crate) parameter: Option<String>,
    pub(crate) middleware: Vec<MiddlewareRef>,
}

impl ResourceOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the resource to these actions (registration order is unaffected)
    #[must_use]
    pub fn only(mut self, actions: impl IntoIterator<Item = ResourceAction>) -> Self {
        self.only = Some(actions.into_iter().collect());
        self
    }

    /// Leave these actions out
    #[must_use]
    pub fn except(mut self, actions: impl IntoIterator<Item = ResourceAction>) -> Self {
        self.except.extend(actions);
        self
    }

    /// Replace the conventional base name used for route names
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name the route of one action explicitly
    #[must_use]
    pub fn action_name(mut self, action: ResourceAction, name: impl Into<String>) -> Self {
        self.names.insert(action, name.into());
        self
    }

    /// Placeholder name of the member id (default `id`)
    #[must_use]
    pub fn parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Middleware for every generated route
    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.middleware.push(middleware.into());
        self
    }

    /// The actions to register, in table order
    pub(crate) fn actions(&self, default: &[ResourceAction]) -> Vec<ResourceAction> {
        let allowed = self.only.as_deref().unwrap_or(default);
        ResourceAction::ALL
            .into_iter()
            .filter(|action| allowed.contains(action) && !self.except.contains(action))
            .collect()
    }

    pub(crate) fn route_name(
        &self,
        base: &str,
        action: ResourceAction,
    ) -> Result<String, ConfigurationError> {
        if let Some(name) = self.names.get(&action) {
            return Ok(name.clone());
        }
        let stem = self
            .name
            .clone()
            .unwrap_or_else(|| conventional_name(base));
        if stem.is_empty() {
            return Err(ConfigurationError::UnnamedResource {
                base: base.to_string(),
            });
        }
        Ok(format!("{stem}.{action}"))
    }

    pub(crate) fn parameter_name(&self) -> &str {
        self.parameter.as_deref().unwrap_or("id")
    }
}

/// Conventional route-name stem for a resource base path
///
/// Placeholder segments are dropped and the rest joined with `.`:
/// `/admin/posts` → `admin.posts`, `/users/{user}/posts` → `users.posts`.
#[must_use]
pub fn conventional_name(base: &str) -> String {
    base.split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .collect::<Vec<_>>()
        .join(".")
}
