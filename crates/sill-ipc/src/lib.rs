//! # sill-ipc
//!
//! Boundary primitives for the sill event bus.
//!
//! Two seams, both opaque to the layers above:
//!
//! - **[`Invoke`]**: the async request/response channel to the host
//! - **[`CallbackRegistry`]**: the arena marshaling local closures into
//!   numeric handles the host can route deliveries back through

#![deny(unsafe_code)]

pub mod callback;
pub mod invoke;

pub use callback::{Callback, CallbackId, CallbackRegistry};
pub use invoke::{Invoke, InvokeError, InvokeResult};
