//! Path template compilation.
//!
//! A template is a path made of literal text and placeholders. Placeholders come
//! in two spellings, `{name}` and `{name:type}`, and may be followed by `?` to
//! make the placeholder optional together with the `/` in front of it:
//!
//! | type  | fragment          | matches                          |
//! |-------|-------------------|----------------------------------|
//! | `num` | `[0-9]+`          | ASCII digits only                |
//! | `str` | `[A-Za-z0-9_\-]+` | ASCII word chars and hyphen      |
//!
//! Both typed fragments are ASCII-only, also under case-insensitive matching.
//! | `any` | `[^/]+`           | anything but `/` (the default)   |
//! | `all` | `.*`              | anything, including `/`          |
//!
//! ```rust
//! use routekit::router::CompiledPattern;
//!
//! let pattern = CompiledPattern::compile("/posts/{id:num}/{slug}?", true).unwrap();
//! assert_eq!(pattern.param_names().len(), 2);
//! assert!(pattern.captures("/posts/42").is_some());
//! assert!(pattern.captures("/posts/42/hello-world").is_some());
//! assert!(pattern.captures("/posts/abc").is_none());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::table::ParamVec;
use crate::error::ConfigurationError;

/// Finds `{...}` placeholders and an optional trailing `?`.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\{([^{}]*)\}(\?)?").expect("placeholder scanner regex is valid")
});

/// Type of a placeholder, selecting the regex fragment it compiles to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// `num`: one or more ASCII digits
    Num,
    /// `str`: ASCII letters, digits, hyphen and underscore
    Str,
    /// `any` (default): one segment, no `/`
    Any,
    /// `all`: greedy, may span separators
    All,
}

impl PlaceholderKind {
    /// Parse the type written after the `:` in `{name:type}`
    #[must_use]
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "num" => Some(PlaceholderKind::Num),
            "str" => Some(PlaceholderKind::Str),
            "any" => Some(PlaceholderKind::Any),
            "all" => Some(PlaceholderKind::All),
            _ => None,
        }
    }

    fn fragment(self) -> &'static str {
        match self {
            PlaceholderKind::Num => r"[0-9]+",
            PlaceholderKind::Str => r"(?-u:[A-Za-z0-9_\-])+",
            PlaceholderKind::Any => r"[^/]+",
            PlaceholderKind::All => r".*",
        }
    }
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, matched verbatim
    Literal(String),
    /// A named capture
    Placeholder {
        /// Capture name
        name: Arc<str>,
        /// Fragment selector
        kind: PlaceholderKind,
        /// Whether the placeholder may be absent
        optional: bool,
        /// Whether the optional part owns the `/` in front of it
        separator: bool,
    },
}

/// A path template compiled into an anchored matcher
///
/// Templates without placeholders additionally keep their literal text so the
/// route table can answer them with a string comparison before running any regex.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    regex: Regex,
    literal: Option<String>,
    param_names: Vec<Arc<str>>,
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// Compile `template` into a matcher
    ///
    /// `template` is expected to be normalized already (leading `/`, no trailing
    /// `/` except for the root). The matcher anchors both ends of the path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for malformed placeholders, unknown
    /// placeholder types, or templates the regex engine rejects (for example a
    /// placeholder name used twice).
    pub fn compile(template: &str, case_insensitive: bool) -> Result<Self, ConfigurationError> {
        let segments = parse_segments(template)?;

        let mut pattern = String::with_capacity(template.len() + 16);
        if case_insensitive {
            pattern.push_str("(?i)");
        }
        pattern.push('^');

        let mut has_placeholders = false;
        for segment in &segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Placeholder {
                    name,
                    kind,
                    optional,
                    separator,
                } => {
                    has_placeholders = true;
                    let capture = format!("(?P<{name}>{})", kind.fragment());
                    match (optional, separator) {
                        (true, true) => {
                            pattern.push_str("(?:/");
                            pattern.push_str(&capture);
                            pattern.push_str(")?");
                        }
                        (true, false) => {
                            pattern.push_str(&capture);
                            pattern.push('?');
                        }
                        (false, _) => pattern.push_str(&capture),
                    }
                }
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| ConfigurationError::InvalidPattern {
            path: template.to_string(),
            reason: e.to_string(),
        })?;

        // Capture order, not declaration order
        let param_names: Vec<Arc<str>> = regex
            .capture_names()
            .flatten()
            .map(Arc::from)
            .collect();

        Ok(Self {
            raw: template.to_string(),
            regex,
            literal: (!has_placeholders).then(|| template.to_string()),
            param_names,
            segments,
        })
    }

    /// The template this pattern was compiled from
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The compiled regular expression
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Literal text for templates without placeholders
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    /// Placeholder names, aligned with capture order
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// Parsed template pieces, left to right
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the whole of `path` matches
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and extract its parameters
    ///
    /// Optional placeholders that did not participate in the match are left out
    /// of the returned parameters.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = captures.get(i + 1) {
                params.push((Arc::clone(name), value.as_str().to_string()));
            }
        }
        Some(params)
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>, ConfigurationError> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut cursor = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            segments.push(Segment::Literal(template[cursor..whole.start()].to_string()));
        }
        cursor = whole.end();

        let (name, kind) = match inner.as_str().split_once(':') {
            Some((name, kind)) => {
                let kind = PlaceholderKind::parse(kind.trim()).ok_or_else(|| {
                    ConfigurationError::UnknownPlaceholderType {
                        path: template.to_string(),
                        kind: kind.to_string(),
                    }
                })?;
                (name.trim(), kind)
            }
            None => (inner.as_str().trim(), PlaceholderKind::Any),
        };
        if !is_valid_name(name) {
            return Err(ConfigurationError::InvalidPlaceholder {
                path: template.to_string(),
                placeholder: whole.as_str().to_string(),
            });
        }

        let optional = caps.get(2).is_some();
        let separator = optional && take_separator(&mut segments);
        segments.push(Segment::Placeholder {
            name: Arc::from(name),
            kind,
            optional,
            separator,
        });
    }

    if cursor < template.len() {
        segments.push(Segment::Literal(template[cursor..].to_string()));
    }

    let stray_brace = segments.iter().any(|s| match s {
        Segment::Literal(text) => text.contains('{') || text.contains('}'),
        Segment::Placeholder { .. } => false,
    });
    if stray_brace {
        return Err(ConfigurationError::InvalidPlaceholder {
            path: template.to_string(),
            placeholder: template.to_string(),
        });
    }

    Ok(segments)
}

/// Move the `/` in front of an optional placeholder into the optional group.
///
/// The root `/` is never moved: `/{page}?` must still match `/`.
fn take_separator(segments: &mut Vec<Segment>) -> bool {
    let count = segments.len();
    let Some(Segment::Literal(text)) = segments.last_mut() else {
        return false;
    };
    if !text.ends_with('/') {
        return false;
    }
    if text.len() == 1 && count == 1 {
        return false;
    }
    text.pop();
    if text.is_empty() {
        segments.pop();
    }
    true
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
