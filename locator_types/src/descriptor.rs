//! Resolved locator descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The UI action a resolved locator is meant for.
///
/// Parsing is case-insensitive. Any kind starting with `select`
/// (`select`, `selectOption`, ...) is treated as [`ActionKind::Select`].
/// Anything else that is not recognised is kept verbatim in
/// [`ActionKind::Unknown`] so the executor can report it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// Type text into the element.
    Fill,
    /// Click the element.
    Click,
    /// Choose an option by its visible label.
    Select,
    /// An action outside the known set.
    Unknown(String),
}

impl ActionKind {
    /// Parse an action kind from service output.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();

        match normalized.as_str() {
            "fill" => Self::Fill,
            "click" => Self::Click,
            s if s.starts_with("select") => Self::Select,
            _ => Self::Unknown(raw.trim().to_string()),
        }
    }

    /// Canonical name used in cache files.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Fill => "fill",
            Self::Click => "click",
            Self::Select => "select",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    /// Whether performing this action needs a data payload.
    pub fn requires_data(&self) -> bool {
        matches!(self, Self::Fill | Self::Select)
    }

    /// Whether the kind is one the executor can perform.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for ActionKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved `{action, selector}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorDescriptor {
    /// What to do with the element.
    pub action: ActionKind,
    /// CSS selector for the element.
    pub selector: String,
}

impl LocatorDescriptor {
    /// Create a new descriptor.
    pub fn new(action: ActionKind, selector: impl Into<String>) -> Self {
        Self {
            action,
            selector: selector.into(),
        }
    }

    /// Shorthand for a fill descriptor.
    pub fn fill(selector: impl Into<String>) -> Self {
        Self::new(ActionKind::Fill, selector)
    }

    /// Shorthand for a click descriptor.
    pub fn click(selector: impl Into<String>) -> Self {
        Self::new(ActionKind::Click, selector)
    }

    /// Shorthand for a select descriptor.
    pub fn select(selector: impl Into<String>) -> Self {
        Self::new(ActionKind::Select, selector)
    }

    /// A descriptor is worth caching only with a known action and a non-empty selector.
    pub fn is_cacheable(&self) -> bool {
        self.action.is_known() && !self.selector.trim().is_empty()
    }
}

impl fmt::Display for LocatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.selector)
    }
}
