//! Structured logging bootstrap.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a JSON
//! formatter (production) or a pretty formatter (development).
//!
//! The filter starts from `RUST_LOG` when it is set, otherwise from
//! [`LogConfig::level`]. [`LogConfig::directives`] are layered on top, so
//! `routekit::router=debug` can raise registration logging without touching
//! the rest of the application.
//!
//! | variable                  | field              | default |
//! |---------------------------|--------------------|---------|
//! | `ROUTEKIT_LOG_LEVEL`      | `level`            | `info`  |
//! | `ROUTEKIT_LOG_FORMAT`     | `format`           | `json`  |
//! | `ROUTEKIT_LOG_DIRECTIVES` | `directives`       | none    |
//! | `ROUTEKIT_LOG_LOCATION`   | `include_location` | `false` |

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::env_bool;

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base level when `RUST_LOG` is unset: trace/debug/info/warn/error
    pub level: String,
    pub format: LogFormat,
    /// Extra `EnvFilter` directives, e.g. `routekit::dispatcher=debug`
    pub directives: Vec<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            directives: Vec::new(),
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Read `ROUTEKIT_LOG_*` variables; unset or unparsable values keep their defaults
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: env::var("ROUTEKIT_LOG_LEVEL").unwrap_or(defaults.level),
            format: env::var("ROUTEKIT_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.format),
            directives: env::var("ROUTEKIT_LOG_DIRECTIVES")
                .map(|d| split_directives(&d))
                .unwrap_or(defaults.directives),
            include_location: env_bool("ROUTEKIT_LOG_LOCATION")
                .unwrap_or(defaults.include_location),
        }
    }

    /// Parse logging settings from a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or a key has the wrong type.
    pub fn from_toml_str(document: &str) -> Result<Self> {
        toml::from_str(document).context("invalid logging configuration")
    }

    /// Configuration for local development and tests
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            directives: Vec::new(),
            include_location: true,
        }
    }

    /// The filter this configuration installs
    ///
    /// # Errors
    ///
    /// Fails on a directive `EnvFilter` cannot parse.
    pub fn filter(&self) -> Result<EnvFilter> {
        let level = parse_level(&self.level);
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
        for directive in &self.directives {
            let parsed = directive
                .parse::<Directive>()
                .with_context(|| format!("invalid log directive '{directive}'"))?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }
}

fn split_directives(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber described by `config`
///
/// # Errors
///
/// Fails on an invalid directive, or if a global subscriber is already installed.
///
/// ```no_run
/// use routekit::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = config.filter()?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}
