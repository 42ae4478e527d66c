//! Reserved lifecycle event names.
//!
//! The host emits these spontaneously as surfaces change state; callers
//! still subscribe through the ordinary `listen` path to receive them.
//! The enumeration documents the stable names — it is a closed set.

use std::fmt;

/// Well-known events the host emits for surface lifecycle changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A window was resized.
    WindowResized,
    /// A window was moved.
    WindowMoved,
    /// A window received a close request.
    WindowCloseRequested,
    /// A window was destroyed.
    WindowDestroyed,
    /// A window gained focus.
    WindowFocused,
    /// A window lost focus.
    WindowBlurred,
    /// A window's scale factor changed.
    WindowScaleFactorChanged,
    /// The theme changed for a window.
    WindowThemeChanged,
    /// A new window was created.
    WindowCreated,
    /// A new webview was created.
    WebviewCreated,
    /// A drag entered a surface.
    DragEnter,
    /// A drag moved over a surface.
    DragOver,
    /// A drag was dropped on a surface.
    DragDrop,
    /// A drag left a surface.
    DragLeave,
}

impl LifecycleEvent {
    /// Every reserved event, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::WindowResized,
        Self::WindowMoved,
        Self::WindowCloseRequested,
        Self::WindowDestroyed,
        Self::WindowFocused,
        Self::WindowBlurred,
        Self::WindowScaleFactorChanged,
        Self::WindowThemeChanged,
        Self::WindowCreated,
        Self::WebviewCreated,
        Self::DragEnter,
        Self::DragOver,
        Self::DragDrop,
        Self::DragLeave,
    ];

    /// The wire name for this event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WindowResized => "sill://resized",
            Self::WindowMoved => "sill://moved",
            Self::WindowCloseRequested => "sill://close-requested",
            Self::WindowDestroyed => "sill://destroyed",
            Self::WindowFocused => "sill://focus",
            Self::WindowBlurred => "sill://blur",
            Self::WindowScaleFactorChanged => "sill://scale-change",
            Self::WindowThemeChanged => "sill://theme-changed",
            Self::WindowCreated => "sill://window-created",
            Self::WebviewCreated => "sill://webview-created",
            Self::DragEnter => "sill://drag-enter",
            Self::DragOver => "sill://drag-over",
            Self::DragDrop => "sill://drag-drop",
            Self::DragLeave => "sill://drag-leave",
        }
    }

    /// Look up a reserved event by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
