//! # sill-events
//!
//! Client stack for the sill event bus: subscribe to named events across
//! the surface/host boundary, receive deliveries asynchronously, and emit
//! to other surfaces.
//!
//! The three public operations are [`EventClient::listen`],
//! [`EventClient::once`] and [`EventClient::emit`], plus `*_to` variants
//! taking an explicit [`EventTarget`] and surface-bound handles via
//! [`EventClient::scoped`].
//!
//! Design constraint carried throughout: the host owns the subscription
//! table. The client keeps no local registry and never short-circuits
//! local delivery, so every event takes the same host-mediated path
//! regardless of where it was emitted.

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod subscription;
pub mod testing;

pub use client::{EventClient, ScopedClient};
pub use errors::{EventError, Result};
pub use subscription::Listener;

pub use sill_core::{Event, EventTarget, LifecycleEvent, SubscriptionId};
