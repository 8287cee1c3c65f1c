//! # Router Configuration Module
//!
//! Dispatch-time behavior of the router, loaded from environment variables or
//! from a TOML document.
//!
//! ## Environment Variables
//!
//! | variable                          | field                     | default |
//! |-----------------------------------|---------------------------|---------|
//! | `ROUTEKIT_CASE_INSENSITIVE`       | `case_insensitive`        | `true`  |
//! | `ROUTEKIT_DECODE_PERCENT`         | `decode_percent`          | `true`  |
//! | `ROUTEKIT_STRIP_TRAILING_SLASH`   | `strip_trailing_slash`    | `true`  |
//! | `ROUTEKIT_SLOW_MATCH_US`          | `slow_match_threshold_us` | `1000`  |
//!
//! Booleans accept `1/0`, `true/false`, `yes/no` and `on/off`. Values that do not
//! parse fall back to the default.
//!
//! ## TOML
//!
//! ```rust
//! use routekit::config::RouterConfig;
//!
//! let config = RouterConfig::from_toml_str("case_insensitive = false").unwrap();
//! assert!(!config.case_insensitive);
//! assert!(config.decode_percent);
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Router configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Compile matchers case-insensitively (default: true)
    pub case_insensitive: bool,
    /// Percent-decode request paths before matching (default: true)
    pub decode_percent: bool,
    /// Treat `/posts/` like `/posts` (default: true)
    pub strip_trailing_slash: bool,
    /// Matches slower than this many microseconds are logged at WARN (default: 1000)
    pub slow_match_threshold_us: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            decode_percent: true,
            strip_trailing_slash: true,
            slow_match_threshold_us: 1000,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            case_insensitive: env_bool("ROUTEKIT_CASE_INSENSITIVE")
                .unwrap_or(defaults.case_insensitive),
            decode_percent: env_bool("ROUTEKIT_DECODE_PERCENT").unwrap_or(defaults.decode_percent),
            strip_trailing_slash: env_bool("ROUTEKIT_STRIP_TRAILING_SLASH")
                .unwrap_or(defaults.strip_trailing_slash),
            slow_match_threshold_us: env::var("ROUTEKIT_SLOW_MATCH_US")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.slow_match_threshold_us),
        }
    }

    /// Parse configuration from a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or a key has the wrong type.
    pub fn from_toml_str(document: &str) -> anyhow::Result<Self> {
        toml::from_str(document).context("invalid router configuration")
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read router config {}", path.display()))?;
        Self::from_toml_str(&document)
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    parse_bool(&env::var(key).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RouterConfig::from_toml_str("slow_match_threshold_us = 250").unwrap();
        assert_eq!(config.slow_match_threshold_us, 250);
        assert!(config.case_insensitive);
        assert!(config.strip_trailing_slash);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(RouterConfig::from_toml_str("decode_percent = \"sometimes\"").is_err());
    }
}
