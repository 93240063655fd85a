//! Safe markup templating.
//!
//! DESIGN
//! ======
//! A template is an ordered list of literal fragments with one value slot
//! between each adjacent pair. Values are escaped on the way in unless they
//! are explicitly wrapped as [`Raw`], and the assembled string is parsed into
//! structured [`Node`]s. There are no loops or conditionals: callers build
//! computed pieces in Rust and pass them as values.
//!
//! Escaping is the only defense against hostile input. `Raw` must only carry
//! text produced by a trusted renderer or built internally from values that
//! cannot contain markup (hex colors, fixed class names).

pub mod node;
pub mod parse;

pub use node::{Element, Node};
pub use parse::parse_fragment;

use std::fmt;

/// Replace the five reserved markup characters with entity references.
///
/// `&` goes first so the entities introduced afterwards are not re-escaped.
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

// =============================================================================
// VALUES
// =============================================================================

/// Pre-sanitized markup inserted into template output verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Raw(String);

impl Raw {
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value interpolated between two template fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Untrusted text, escaped before insertion.
    Escaped(String),
    /// Trusted markup, inserted as-is.
    Raw(Raw),
    /// Renders as nothing.
    Absent,
}

impl Value {
    fn render_into(&self, out: &mut String) {
        match self {
            Self::Escaped(text) => out.push_str(&escape(text)),
            Self::Raw(raw) => out.push_str(raw.as_str()),
            Self::Absent => {}
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Escaped(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Escaped(text)
    }
}

impl From<&String> for Value {
    fn from(text: &String) -> Self {
        Self::Escaped(text.clone())
    }
}

impl From<Raw> for Value {
    fn from(raw: Raw) -> Self {
        Self::Raw(raw)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// Assemble fragments and values into one markup string.
///
/// The first and last fragments are trimmed so template indentation does not
/// leak into the output. Values past `fragments.len() - 1` are ignored and
/// missing ones render as nothing.
#[must_use]
pub fn render(fragments: &[&str], values: &[Value]) -> String {
    let last = fragments.len().saturating_sub(1);
    let mut out = String::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if i == 0 || i == last {
            out.push_str(fragment.trim());
        } else {
            out.push_str(fragment);
        }
        if i < last {
            if let Some(value) = values.get(i) {
                value.render_into(&mut out);
            }
        }
    }
    out
}

/// Render a template and parse it into sibling nodes.
#[must_use]
pub fn html(fragments: &[&str], values: &[Value]) -> Vec<Node> {
    parse_fragment(&render(fragments, values))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
