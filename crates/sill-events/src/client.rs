//! The public dispatch surface: `listen`, `once`, `emit`.
//!
//! [`EventClient`] is a thin stack over the transport. There is no local
//! fan-out and no local subscription table: every delivery, including for
//! events emitted from this very process, takes the host round trip, so
//! there is exactly one delivery path for every event regardless of origin.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use sill_core::{Event, EventTarget};
use sill_ipc::{CallbackRegistry, Invoke};

use crate::errors::Result;
use crate::subscription::{self, EMIT_COMMAND, Listener};

/// Client side of the event bus.
#[derive(Clone)]
pub struct EventClient {
    transport: Arc<dyn Invoke>,
    callbacks: Arc<CallbackRegistry>,
}

impl EventClient {
    /// Create a client over `transport` with a fresh callback arena.
    #[must_use]
    pub fn new(transport: Arc<dyn Invoke>) -> Self {
        Self::with_callbacks(transport, Arc::new(CallbackRegistry::new()))
    }

    /// Create a client over `transport` sharing an existing arena.
    ///
    /// Use this when the transport resolves handles through an arena it
    /// already holds (the loopback host does).
    #[must_use]
    pub fn with_callbacks(transport: Arc<dyn Invoke>, callbacks: Arc<CallbackRegistry>) -> Self {
        Self {
            transport,
            callbacks,
        }
    }

    /// The arena this client marshals handlers into.
    ///
    /// Transport implementations route host deliveries back through it.
    #[must_use]
    pub fn callbacks(&self) -> &Arc<CallbackRegistry> {
        &self.callbacks
    }

    /// Subscribe to `event` with no target filtering.
    pub async fn listen<F>(&self, event: impl Into<String>, handler: F) -> Result<Listener>
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.listen_to(EventTarget::Global, event, handler).await
    }

    /// Subscribe to `event` under `target`.
    ///
    /// Resolves to the cancellation handle once the host has assigned an
    /// id. The handler is invoked once per delivery and never concurrently
    /// with itself.
    pub async fn listen_to<F>(
        &self,
        target: EventTarget,
        event: impl Into<String>,
        handler: F,
    ) -> Result<Listener>
    where
        F: FnMut(Event) + Send + 'static,
    {
        let event = event.into();
        let id = subscription::register(
            &*self.transport,
            &self.callbacks,
            &event,
            &target,
            envelope_handler(event.clone(), handler),
        )
        .await?;
        Ok(Listener::new(event, id, Arc::clone(&self.transport)))
    }

    /// Subscribe to the next occurrence of `event`, then self-cancel.
    pub async fn once<F>(&self, event: impl Into<String>, handler: F) -> Result<Listener>
    where
        F: FnOnce(Event) + Send + 'static,
    {
        self.once_to(EventTarget::Global, event, handler).await
    }

    /// Subscribe to the next occurrence of `event` under `target`.
    ///
    /// Composed on [`listen_to`](Self::listen_to), not a distinct
    /// registration path. The handler runs at most once even if further
    /// deliveries race in before cleanup completes: the wrapped closure
    /// consumes the handler under a lock. Cleanup uses the id carried on
    /// the delivered event — a delivery may arrive before the registration
    /// future's continuation has captured the id locally — and a cleanup
    /// rejection is logged and swallowed, since the at-most-once contract
    /// has already been met by then.
    pub async fn once_to<F>(
        &self,
        target: EventTarget,
        event: impl Into<String>,
        handler: F,
    ) -> Result<Listener>
    where
        F: FnOnce(Event) + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        let slot = Mutex::new(Some(handler));
        self.listen_to(target, event, move |event: Event| {
            let Some(handler) = slot.lock().take() else {
                return;
            };
            let id = event.id;
            let name = event.event.clone();
            handler(event);

            let transport = Arc::clone(&transport);
            let _ = tokio::spawn(async move {
                if let Err(err) = subscription::cancel(&*transport, &name, id).await {
                    debug!(event = %name, %id, error = %err, "one-shot cleanup failed");
                }
            });
        })
        .await
    }

    /// Emit `event` with `payload` and no target filtering.
    pub async fn emit<P: Serialize>(&self, event: &str, payload: P) -> Result<()> {
        self.emit_to(EventTarget::Global, event, payload).await
    }

    /// Emit `event` to `target` with `payload`.
    ///
    /// Fire-and-forget: resolves once the host has accepted the emission,
    /// whether zero or many subscriptions matched.
    pub async fn emit_to<P: Serialize>(
        &self,
        target: EventTarget,
        event: &str,
        payload: P,
    ) -> Result<()> {
        let payload = serde_json::to_value(payload)?;
        let _ = self
            .transport
            .invoke(
                EMIT_COMMAND,
                json!({
                    "event": event,
                    "target": &target,
                    "payload": payload,
                }),
            )
            .await?;
        debug!(event, target = %target, "emitted event");
        Ok(())
    }

    /// A handle bound to `target` whose listen/once/emit default to it.
    #[must_use]
    pub fn scoped(&self, target: EventTarget) -> ScopedClient {
        ScopedClient {
            client: self.clone(),
            target,
        }
    }
}

impl fmt::Debug for EventClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventClient")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Wrap a caller handler so the arena sees raw delivery JSON.
///
/// A payload that does not parse as an [`Event`] envelope is a host
/// contract violation: logged and dropped, never a panic.
fn envelope_handler<F>(event: String, mut handler: F) -> impl FnMut(Value) + Send
where
    F: FnMut(Event) + Send + 'static,
{
    move |raw: Value| match serde_json::from_value::<Event>(raw) {
        Ok(delivered) => handler(delivered),
        Err(err) => {
            warn!(event = %event, error = %err, "dropping malformed delivery");
        }
    }
}

/// An [`EventClient`] bound to one surface target.
///
/// Mirrors the per-surface event APIs of the host windows themselves:
/// everything this handle does is scoped to its target.
#[derive(Clone, Debug)]
pub struct ScopedClient {
    client: EventClient,
    target: EventTarget,
}

impl ScopedClient {
    /// The bound target.
    #[must_use]
    pub fn target(&self) -> &EventTarget {
        &self.target
    }

    /// [`EventClient::listen_to`] with the bound target.
    pub async fn listen<F>(&self, event: impl Into<String>, handler: F) -> Result<Listener>
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.client
            .listen_to(self.target.clone(), event, handler)
            .await
    }

    /// [`EventClient::once_to`] with the bound target.
    pub async fn once<F>(&self, event: impl Into<String>, handler: F) -> Result<Listener>
    where
        F: FnOnce(Event) + Send + 'static,
    {
        self.client
            .once_to(self.target.clone(), event, handler)
            .await
    }

    /// [`EventClient::emit_to`] with the bound target.
    pub async fn emit<P: Serialize>(&self, event: &str, payload: P) -> Result<()> {
        self.client
            .emit_to(self.target.clone(), event, payload)
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
