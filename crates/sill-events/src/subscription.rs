//! Subscription registration and cancellation.
//!
//! Registration and cancellation are independent round trips rather than a
//! stateful session object: the host is the authority on subscription
//! existence, and the client holds only the id capability it got back —
//! never a local table of live subscriptions.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Value, json};
use tracing::debug;

use sill_core::{EventTarget, SubscriptionId};
use sill_ipc::{CallbackRegistry, Invoke};

use crate::errors::{EventError, Result};

/// Command registering a handler with the host.
pub const LISTEN_COMMAND: &str = "plugin:event|listen";
/// Command removing a subscription from the host.
pub const UNLISTEN_COMMAND: &str = "plugin:event|unlisten";
/// Command handing an emission to the host for fan-out.
pub const EMIT_COMMAND: &str = "plugin:event|emit";

/// Register `handler` for `event` under `target`.
///
/// Marshals the handler into a boundary handle, issues the registration
/// round trip, and returns the host-assigned id. RPC rejections propagate
/// unchanged; the only local check is that the name is non-empty.
pub(crate) async fn register<F>(
    transport: &dyn Invoke,
    callbacks: &CallbackRegistry,
    event: &str,
    target: &EventTarget,
    handler: F,
) -> Result<SubscriptionId>
where
    F: FnMut(Value) + Send + 'static,
{
    if event.is_empty() {
        return Err(EventError::EmptyEventName);
    }

    let handle = callbacks.register(handler);
    let reply = transport
        .invoke(
            LISTEN_COMMAND,
            json!({
                "event": event,
                "target": target,
                "handler": handle,
            }),
        )
        .await?;

    let id = reply
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .map(SubscriptionId::new)
        .ok_or_else(|| EventError::UnexpectedReply(reply.to_string()))?;

    debug!(event, %id, target = %target, "registered listener");
    Ok(id)
}

/// Ask the host to drop subscription `id` for `event`.
///
/// Best-effort: callers decide whether a rejection matters. The host
/// treats unknown ids as a no-op, so only transport-level failures
/// surface here.
pub(crate) async fn cancel(transport: &dyn Invoke, event: &str, id: SubscriptionId) -> Result<()> {
    let _ = transport
        .invoke(
            UNLISTEN_COMMAND,
            json!({
                "event": event,
                "eventId": id,
            }),
        )
        .await?;
    debug!(event, %id, "unregistered listener");
    Ok(())
}

/// Cancellation handle for one subscription.
///
/// Cheap to clone; every clone shares one cancellation latch, so a clone
/// moved into the handler itself may cancel from inside a delivery. The
/// handle captures the event name and id by value at registration time and
/// stays correct however many deliveries have already happened.
///
/// There is no drop-time cancellation: the owner decides when the
/// subscription ends.
#[derive(Clone)]
pub struct Listener {
    inner: Arc<ListenerInner>,
}

struct ListenerInner {
    event: String,
    id: SubscriptionId,
    transport: Arc<dyn Invoke>,
    cancelled: AtomicBool,
}

impl Listener {
    pub(crate) fn new(event: String, id: SubscriptionId, transport: Arc<dyn Invoke>) -> Self {
        Self {
            inner: Arc::new(ListenerInner {
                event,
                id,
                transport,
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// The event name this subscription was registered for.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.inner.event
    }

    /// The host-assigned subscription id.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.inner.id
    }

    /// Whether [`unlisten`](Self::unlisten) has already been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel the subscription.
    ///
    /// Safe to call any number of times from any context. The first call
    /// issues the unregister round trip and reports its failure; every
    /// later call, from any clone, is a local no-op returning success.
    pub async fn unlisten(&self) -> Result<()> {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        cancel(&*self.inner.transport, &self.inner.event, self.inner.id).await
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("event", &self.inner.event)
            .field("id", &self.inner.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sill_ipc::{InvokeError, InvokeResult};

    /// Records every call and answers with a fixed reply.
    struct RecordingTransport {
        calls: Mutex<Vec<(String, Value)>>,
        reply: Value,
    }

    impl RecordingTransport {
        fn new(reply: Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Invoke for RecordingTransport {
        async fn invoke(&self, command: &str, args: Value) -> InvokeResult {
            self.calls.lock().push((command.to_owned(), args));
            Ok(self.reply.clone())
        }
    }

    /// Fails every call with the given error.
    struct FailingTransport(InvokeError);

    #[async_trait]
    impl Invoke for FailingTransport {
        async fn invoke(&self, _command: &str, _args: Value) -> InvokeResult {
            Err(self.0.clone())
        }
    }

    #[tokio::test]
    async fn register_sends_exact_command_and_args() {
        let transport = RecordingTransport::new(json!(7));
        let callbacks = CallbackRegistry::new();
        let id = register(
            &transport,
            &callbacks,
            "ping",
            &EventTarget::window("main"),
            |_| {},
        )
        .await
        .unwrap();

        assert_eq!(id, SubscriptionId::new(7));
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "plugin:event|listen");
        assert_eq!(calls[0].1["event"], "ping");
        assert_eq!(calls[0].1["target"]["kind"], "window");
        assert_eq!(calls[0].1["target"]["label"], "main");
        assert!(calls[0].1["handler"].is_u64());
    }

    #[tokio::test]
    async fn register_empty_name_fails_before_the_round_trip() {
        let transport = RecordingTransport::new(json!(1));
        let callbacks = CallbackRegistry::new();
        let err = register(&transport, &callbacks, "", &EventTarget::Global, |_| {})
            .await
            .unwrap_err();

        assert_matches!(err, EventError::EmptyEventName);
        assert!(transport.calls().is_empty());
        assert!(callbacks.is_empty());
    }

    #[tokio::test]
    async fn register_propagates_rejection_unchanged() {
        let transport = FailingTransport(InvokeError::rejected("invalid event name"));
        let callbacks = CallbackRegistry::new();
        let err = register(&transport, &callbacks, "bad", &EventTarget::Global, |_| {})
            .await
            .unwrap_err();

        assert_matches!(
            err,
            EventError::Rpc(InvokeError::Rejected { message }) if message == "invalid event name"
        );
    }

    #[tokio::test]
    async fn register_non_integer_reply_is_a_protocol_error() {
        let transport = RecordingTransport::new(json!("seven"));
        let callbacks = CallbackRegistry::new();
        let err = register(&transport, &callbacks, "ping", &EventTarget::Global, |_| {})
            .await
            .unwrap_err();

        assert_matches!(err, EventError::UnexpectedReply(reply) if reply.contains("seven"));
    }

    #[tokio::test]
    async fn cancel_sends_event_id_key() {
        let transport = RecordingTransport::new(Value::Null);
        cancel(&transport, "ping", SubscriptionId::new(4))
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].0, "plugin:event|unlisten");
        assert_eq!(calls[0].1["event"], "ping");
        assert_eq!(calls[0].1["eventId"], 4);
    }

    #[tokio::test]
    async fn unlisten_is_idempotent() {
        let transport = Arc::new(RecordingTransport::new(Value::Null));
        let listener = Listener::new(
            "ping".into(),
            SubscriptionId::new(2),
            Arc::clone(&transport) as Arc<dyn Invoke>,
        );

        listener.unlisten().await.unwrap();
        listener.unlisten().await.unwrap();
        listener.unlisten().await.unwrap();

        assert_eq!(transport.calls().len(), 1);
        assert!(listener.is_cancelled());
    }

    #[tokio::test]
    async fn unlisten_reports_failure_once_then_goes_quiet() {
        let transport = Arc::new(FailingTransport(InvokeError::transport("host gone")));
        let listener = Listener::new(
            "ping".into(),
            SubscriptionId::new(2),
            Arc::clone(&transport) as Arc<dyn Invoke>,
        );

        let err = listener.unlisten().await.unwrap_err();
        assert_matches!(err, EventError::Rpc(InvokeError::Transport { .. }));

        // The latch is one-way: later calls are local no-ops.
        listener.unlisten().await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_the_latch() {
        let transport = Arc::new(RecordingTransport::new(Value::Null));
        let listener = Listener::new(
            "ping".into(),
            SubscriptionId::new(9),
            Arc::clone(&transport) as Arc<dyn Invoke>,
        );
        let clone = listener.clone();

        clone.unlisten().await.unwrap();
        listener.unlisten().await.unwrap();

        assert_eq!(transport.calls().len(), 1);
        assert!(listener.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn listener_debug_and_accessors() {
        let transport = Arc::new(RecordingTransport::new(Value::Null));
        let listener = Listener::new(
            "ready".into(),
            SubscriptionId::new(11),
            transport as Arc<dyn Invoke>,
        );

        assert_eq!(listener.event(), "ready");
        assert_eq!(listener.id(), SubscriptionId::new(11));
        assert!(!listener.is_cancelled());
        let debug = format!("{listener:?}");
        assert!(debug.contains("ready"));
        assert!(debug.contains("11"));
    }
}
