//! # sill-core
//!
//! Shared vocabulary for the sill event bus.
//!
//! This crate defines the types every other sill crate speaks in:
//!
//! - **Event names**: the validation rule for event identifiers
//! - **Targets**: [`EventTarget`] scoping descriptor (global / window / webview)
//! - **Delivered events**: the [`Event`] envelope handlers receive, plus
//!   [`SubscriptionId`]
//! - **Lifecycle names**: the reserved `sill://` set the host may emit
//!   spontaneously

#![deny(unsafe_code)]

pub mod event;
pub mod lifecycle;
pub mod name;
pub mod target;

pub use event::{Event, SubscriptionId};
pub use lifecycle::LifecycleEvent;
pub use name::is_valid_event_name;
pub use target::EventTarget;
