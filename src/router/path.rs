//! Path joining and normalization.

use std::borrow::Cow;

use crate::config::RouterConfig;

/// Concatenate a group prefix and a route path with exactly one `/` between them
#[must_use]
pub fn join(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => String::new(),
        (true, false) => format!("/{path}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}

/// Normalize a registered template: leading `/`, no trailing `/` except the root
#[must_use]
pub fn normalize_template(template: &str) -> String {
    let trimmed = template.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Normalize a request path before matching
///
/// Drops any query string or fragment, percent-decodes, and strips trailing
/// slashes except for the root, each step subject to `config`. Paths that do
/// not decode to valid UTF-8 are matched undecoded.
#[must_use]
pub fn normalize_request_path<'a>(raw: &'a str, config: &RouterConfig) -> Cow<'a, str> {
    let path = match raw.find(['?', '#']) {
        Some(end) => &raw[..end],
        None => raw,
    };

    let mut path: Cow<'a, str> = if config.decode_percent && path.contains('%') {
        urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
    } else {
        Cow::Borrowed(path)
    };

    if !path.starts_with('/') {
        path = Cow::Owned(format!("/{path}"));
    }

    if config.strip_trailing_slash && path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        path = if trimmed.is_empty() {
            Cow::Borrowed("/")
        } else {
            Cow::Owned(trimmed.to_string())
        };
    }

    path
}
