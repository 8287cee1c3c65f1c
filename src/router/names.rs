//! Named routes and URL generation.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use super::pattern::{CompiledPattern, Segment};
use crate::error::{ConfigurationError, UrlError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Param {
        name: Arc<str>,
        optional: bool,
        separator: bool,
    },
}

/// A route template reduced to literal text and positional value slots
///
/// Used only for substitution; it is never turned back into a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseTemplate {
    parts: Vec<Part>,
}

impl ReverseTemplate {
    /// Build the substitution template for a compiled pattern
    #[must_use]
    pub fn from_pattern(pattern: &CompiledPattern) -> Self {
        let parts = pattern
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Part::Literal(text.clone()),
                Segment::Placeholder {
                    name,
                    optional,
                    separator,
                    ..
                } => Part::Param {
                    name: Arc::clone(name),
                    optional: *optional,
                    separator: *separator,
                },
            })
            .collect();
        Self { parts }
    }

    /// Fill the value slots left to right with `args`
    ///
    /// Optional slots without an argument are dropped together with their
    /// separator. Surplus arguments are ignored.
    ///
    /// # Errors
    ///
    /// [`UrlError::MissingArgument`] when a required slot has no argument.
    pub fn render(&self, route_name: &str, args: &[&dyn Display]) -> Result<String, UrlError> {
        let mut url = String::new();
        let mut args = args.iter();

        for part in &self.parts {
            match part {
                Part::Literal(text) => url.push_str(text),
                Part::Param {
                    name,
                    optional,
                    separator,
                } => match args.next() {
                    Some(value) => {
                        if *separator {
                            url.push('/');
                        }
                        url.push_str(&value.to_string());
                    }
                    None if *optional => {}
                    None => {
                        return Err(UrlError::MissingArgument {
                            name: route_name.to_string(),
                            parameter: name.to_string(),
                        })
                    }
                },
            }
        }

        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }
}

/// Route name → reverse template
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    entries: HashMap<String, ReverseTemplate>,
}

impl NameRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for `pattern`
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateRouteName`] if the name is taken.
    pub fn insert(&mut self, name: &str, pattern: &CompiledPattern) -> Result<(), ConfigurationError> {
        if self.entries.contains_key(name) {
            return Err(ConfigurationError::DuplicateRouteName {
                name: name.to_string(),
            });
        }
        self.entries
            .insert(name.to_string(), ReverseTemplate::from_pattern(pattern));
        Ok(())
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of named routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no route is named
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generate the URL for `name`, substituting `args` by position
    ///
    /// # Errors
    ///
    /// [`UrlError::RouteNotFound`] for an unknown name, [`UrlError::MissingArgument`]
    /// when too few arguments are supplied.
    pub fn url_for(&self, name: &str, args: &[&dyn Display]) -> Result<String, UrlError> {
        let template = self.entries.get(name).ok_or_else(|| UrlError::RouteNotFound {
            name: name.to_string(),
        })?;
        template.render(name, args)
    }
}
