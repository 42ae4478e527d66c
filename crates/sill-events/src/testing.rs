//! In-process host double.
//!
//! The real host dispatcher lives on the far side of the boundary and is
//! out of scope for this crate; [`LoopbackHost`] stands in for it by
//! implementing [`Invoke`] over an in-memory subscription table and fanning
//! emissions straight back through the callback arena. It honors the
//! contracts the client relies on: host-assigned ids, event-name charset
//! enforcement, target matching, and idempotent unregistration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use sill_core::{EventTarget, is_valid_event_name};
use sill_ipc::{CallbackId, CallbackRegistry, Invoke, InvokeError, InvokeResult};

use crate::client::EventClient;
use crate::subscription::{EMIT_COMMAND, LISTEN_COMMAND, UNLISTEN_COMMAND};

struct HostSubscription {
    event: String,
    target: EventTarget,
    handler: CallbackId,
}

/// Host-side routing double for tests.
///
/// Deliveries report the emission's target as their source; a real host
/// would substitute the emitting surface's descriptor. Only the shape is
/// contractual.
pub struct LoopbackHost {
    callbacks: Arc<CallbackRegistry>,
    subscriptions: Mutex<HashMap<u32, HostSubscription>>,
    next_id: AtomicU32,
}

impl LoopbackHost {
    /// Create a host delivering through `callbacks`.
    #[must_use]
    pub fn new(callbacks: Arc<CallbackRegistry>) -> Self {
        Self {
            callbacks,
            subscriptions: Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Live subscription ids for `event`, ascending.
    #[must_use]
    pub fn subscriptions_for(&self, event: &str) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .subscriptions
            .lock()
            .iter()
            .filter(|(_, sub)| sub.event == event)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn handle_listen(&self, args: &Value) -> InvokeResult {
        let event = required_str(args, "event")?;
        if !is_valid_event_name(event) {
            return Err(InvokeError::rejected(format!(
                "invalid event name: {event:?}"
            )));
        }
        let target: EventTarget = parse_field(args, "target")?;
        let handler: CallbackId = parse_field(args, "handler")?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self.subscriptions.lock().insert(
            id,
            HostSubscription {
                event: event.to_owned(),
                target,
                handler,
            },
        );
        Ok(json!(id))
    }

    fn handle_unlisten(&self, args: &Value) -> InvokeResult {
        let id: u32 = parse_field(args, "eventId")?;
        // Unknown ids are a no-op: redundant cancellation must not error.
        let _ = self.subscriptions.lock().remove(&id);
        Ok(Value::Null)
    }

    fn handle_emit(&self, args: &Value) -> InvokeResult {
        let event = required_str(args, "event")?;
        if !is_valid_event_name(event) {
            return Err(InvokeError::rejected(format!(
                "invalid event name: {event:?}"
            )));
        }
        let target: EventTarget = parse_field(args, "target")?;
        let payload = args.get("payload").cloned().unwrap_or(Value::Null);

        // Snapshot matches before delivering so no lock is held while
        // handlers run (a handler may touch the host again).
        let matched: Vec<(u32, CallbackId)> = self
            .subscriptions
            .lock()
            .iter()
            .filter(|(_, sub)| sub.event == event && target_matches(&sub.target, &target))
            .map(|(id, sub)| (*id, sub.handler))
            .collect();

        for (id, handler) in matched {
            let delivery = json!({
                "event": event,
                "source": &target,
                "id": id,
                "payload": &payload,
            });
            let _ = self.callbacks.run(handler, delivery);
        }
        Ok(Value::Null)
    }
}

#[async_trait]
impl Invoke for LoopbackHost {
    async fn invoke(&self, command: &str, args: Value) -> InvokeResult {
        match command {
            LISTEN_COMMAND => self.handle_listen(&args),
            UNLISTEN_COMMAND => self.handle_unlisten(&args),
            EMIT_COMMAND => self.handle_emit(&args),
            other => Err(InvokeError::rejected(format!("unknown command: {other}"))),
        }
    }
}

impl fmt::Debug for LoopbackHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopbackHost")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

/// Whether a subscription scoped to `subscribed` observes an emission
/// targeted at `emitted`.
fn target_matches(subscribed: &EventTarget, emitted: &EventTarget) -> bool {
    matches!(subscribed, EventTarget::Global)
        || matches!(emitted, EventTarget::Global)
        || subscribed == emitted
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, InvokeError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| InvokeError::rejected(format!("missing field: {key}")))
}

fn parse_field<T: serde::de::DeserializeOwned>(args: &Value, key: &str) -> Result<T, InvokeError> {
    let value = args
        .get(key)
        .ok_or_else(|| InvokeError::rejected(format!("missing field: {key}")))?;
    serde_json::from_value(value.clone())
        .map_err(|err| InvokeError::rejected(format!("bad field {key}: {err}")))
}

/// Build an [`EventClient`] wired to a fresh [`LoopbackHost`].
#[must_use]
pub fn loopback_client() -> (EventClient, Arc<LoopbackHost>) {
    let callbacks = Arc::new(CallbackRegistry::new());
    let host = Arc::new(LoopbackHost::new(Arc::clone(&callbacks)));
    let client = EventClient::with_callbacks(Arc::clone(&host) as Arc<dyn Invoke>, callbacks);
    (client, host)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
