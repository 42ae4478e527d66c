//! The boundary invocation seam.
//!
//! [`Invoke`] is the opaque request/response primitive the event client is
//! built over: a named command with JSON arguments, answered by a single
//! resolved or rejected result. Transports implement it; the layers above
//! never look past it.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by an [`Invoke`] implementation.
///
/// The event client propagates these verbatim and never retries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvokeError {
    /// The host received the command and rejected it.
    #[error("command rejected: {message}")]
    Rejected {
        /// Host-provided rejection reason.
        message: String,
    },

    /// The command never completed a round trip.
    #[error("transport failure: {message}")]
    Transport {
        /// What broke, as reported by the transport.
        message: String,
    },
}

impl InvokeError {
    /// A host rejection with the given reason.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// A transport failure with the given reason.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Convenience alias for invoke results.
pub type InvokeResult = Result<Value, InvokeError>;

/// Asynchronous request/response channel to the host.
///
/// One call, one result; no streaming, no retries. Implementations must be
/// shareable across tasks.
#[async_trait]
pub trait Invoke: Send + Sync {
    /// Issue `command` with `args` and await the host's single reply.
    async fn invoke(&self, command: &str, args: Value) -> InvokeResult;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTransport;

    #[async_trait]
    impl Invoke for EchoTransport {
        async fn invoke(&self, command: &str, args: Value) -> InvokeResult {
            Ok(json!({ "command": command, "args": args }))
        }
    }

    #[test]
    fn rejected_display() {
        let err = InvokeError::rejected("no such command");
        assert_eq!(err.to_string(), "command rejected: no such command");
    }

    #[test]
    fn transport_display() {
        let err = InvokeError::transport("channel closed");
        assert_eq!(err.to_string(), "transport failure: channel closed");
    }

    #[test]
    fn constructors_build_matching_variants() {
        assert!(matches!(
            InvokeError::rejected("r"),
            InvokeError::Rejected { .. }
        ));
        assert!(matches!(
            InvokeError::transport("t"),
            InvokeError::Transport { .. }
        ));
    }

    #[tokio::test]
    async fn trait_object_invocation() {
        let transport: &dyn Invoke = &EchoTransport;
        let reply = transport.invoke("ping", json!({"n": 1})).await.unwrap();
        assert_eq!(reply["command"], "ping");
        assert_eq!(reply["args"]["n"], 1);
    }
}
