//! The delivered event envelope.
//!
//! The host creates one [`Event`] per matching subscription per occurrence;
//! the local handler consumes it exactly once. Payloads stay raw JSON at
//! this layer — callers opt into typing at the call site via
//! [`Event::payload_as`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::target::EventTarget;

/// Host-assigned identifier for one active subscription.
///
/// Opaque to the client: issued at registration time, unique within the
/// host's lifetime, and the only capability needed to request cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    /// Wrap a raw host-assigned id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw id value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SubscriptionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<SubscriptionId> for u32 {
    fn from(id: SubscriptionId) -> Self {
        id.0
    }
}

/// A single delivered event occurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name the subscription matched.
    pub event: String,

    /// Where the occurrence was emitted from.
    pub source: EventTarget,

    /// The subscription that matched. One-shot cleanup uses this rather
    /// than the registration-time id, since a delivery may arrive before
    /// the registration future's continuation has captured that id.
    pub id: SubscriptionId,

    /// Raw payload as emitted. See [`Event::payload_as`] for a typed view.
    pub payload: Value,
}

impl Event {
    /// Deserialize the payload into `T`.
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
