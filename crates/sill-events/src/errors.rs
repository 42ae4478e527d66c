//! Error types for the event client.
//!
//! Every failure is scoped to the single asynchronous call that produced
//! it; nothing here is fatal to the surface.

use thiserror::Error;

/// Errors returned by event client operations.
#[derive(Debug, Error)]
pub enum EventError {
    /// The event name was empty. The only name check performed locally;
    /// charset rejection is the host's.
    #[error("event name must not be empty")]
    EmptyEventName,

    /// The boundary call failed. The host's rejection passes through
    /// unchanged — no retry, no wrapping beyond this variant.
    #[error("invoke failed: {0}")]
    Rpc(#[from] sill_ipc::InvokeError),

    /// Payload serialization or typed deserialization failed.
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// The host's reply did not match the registration contract.
    #[error("unexpected host reply: {0}")]
    UnexpectedReply(String),
}

/// Convenience alias for event client results.
pub type Result<T> = std::result::Result<T, EventError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
