//! Event scoping targets.
//!
//! Every subscription and emission carries an [`EventTarget`]. The default
//! is [`EventTarget::Global`]: no directive means no filtering. Labels are
//! not validated client-side; a label the host does not know about simply
//! never matches anything.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery scope attached to both subscriptions and emissions.
///
/// The host uses the pair of targets to filter fan-out: a `Global`
/// emission reaches every subscription, and a targeted emission reaches
/// subscriptions whose target equals the emitted one or is `Global`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventTarget {
    /// No filtering.
    #[default]
    Global,

    /// Scoped to the window with the given label.
    Window {
        /// Window label.
        label: String,
    },

    /// Scoped to the webview with the given label.
    Webview {
        /// Webview label.
        label: String,
    },
}

impl EventTarget {
    /// Target the window with `label`.
    #[must_use]
    pub fn window(label: impl Into<String>) -> Self {
        Self::Window {
            label: label.into(),
        }
    }

    /// Target the webview with `label`.
    #[must_use]
    pub fn webview(label: impl Into<String>) -> Self {
        Self::Webview {
            label: label.into(),
        }
    }

    /// Normalize an optional scoping directive.
    ///
    /// `None` means [`Global`](Self::Global). Pure and infallible.
    #[must_use]
    pub fn resolve(directive: Option<Self>) -> Self {
        directive.unwrap_or_default()
    }

    /// The label this target is scoped to, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Window { label } | Self::Webview { label } => Some(label),
        }
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Window { label } => write!(f, "window:{label}"),
            Self::Webview { label } => write!(f, "webview:{label}"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
