//! Callback marshaling arena.
//!
//! Converts local closures into numeric handles a transport can carry
//! across the boundary, and resolves a handle back to an invocation when
//! the host routes a delivery to it. Slots are keyed by a monotonically
//! increasing counter and never reused. There is no release path: a
//! marshaled handler stays reachable for the life of the process, which is
//! exactly as long as the host may still deliver to it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A marshaled handler, invoked with the raw delivery payload.
pub type Callback = Box<dyn FnMut(Value) + Send>;

/// Boundary-transmissible handle to a marshaled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(u32);

impl CallbackId {
    /// Wrap a raw handle value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw handle value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Indexed arena mapping handles to callbacks.
///
/// Each slot carries its own mutex, held for the duration of a call: the
/// same handler is never invoked concurrently with itself, and a running
/// handler never blocks the arena as a whole.
pub struct CallbackRegistry {
    slots: DashMap<CallbackId, Arc<Mutex<Callback>>>,
    next: AtomicU32,
}

impl CallbackRegistry {
    /// Create an empty arena. Handles start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            next: AtomicU32::new(1),
        }
    }

    /// Marshal `callback` and return its handle.
    pub fn register<F>(&self, callback: F) -> CallbackId
    where
        F: FnMut(Value) + Send + 'static,
    {
        let id = CallbackId(self.next.fetch_add(1, Ordering::Relaxed));
        let _ = self
            .slots
            .insert(id, Arc::new(Mutex::new(Box::new(callback))));
        debug!(handle = %id, "marshaled callback");
        id
    }

    /// Invoke the callback behind `id` with `payload`.
    ///
    /// Returns `false` when no such handle exists.
    pub fn run(&self, id: CallbackId, payload: Value) -> bool {
        // Clone the slot out before calling so the map shard lock is not
        // held while the handler runs.
        let slot = self.slots.get(&id).map(|entry| Arc::clone(entry.value()));
        match slot {
            Some(slot) => {
                (slot.lock())(payload);
                true
            }
            None => {
                debug!(handle = %id, "delivery for unknown callback handle");
                false
            }
        }
    }

    /// Whether `id` is a live handle.
    #[must_use]
    pub fn contains(&self, id: CallbackId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of marshaled callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena holds no callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("slots", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_arena_is_empty() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn handles_are_monotonic_and_unique() {
        let registry = CallbackRegistry::new();
        let a = registry.register(|_| {});
        let b = registry.register(|_| {});
        let c = registry.register(|_| {});
        assert!(a.as_u32() < b.as_u32());
        assert!(b.as_u32() < c.as_u32());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn run_invokes_with_payload() {
        let registry = CallbackRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        let id = registry.register(move |payload| {
            seen_in.lock().push(payload);
        });

        assert!(registry.run(id, json!({"n": 1})));
        assert!(registry.run(id, json!({"n": 2})));

        let seen = seen.lock();
        assert_eq!(seen.as_slice(), &[json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn run_unknown_handle_is_false() {
        let registry = CallbackRegistry::new();
        assert!(!registry.run(CallbackId::new(999), json!(null)));
    }

    #[test]
    fn fnmut_state_is_kept_across_calls() {
        let registry = CallbackRegistry::new();
        let count = Arc::new(AtomicU32::new(0));
        let count_in = Arc::clone(&count);
        let mut local = 0u32;
        let id = registry.register(move |_| {
            local += 1;
            count_in.store(local, Ordering::SeqCst);
        });

        let _ = registry.run(id, json!(null));
        let _ = registry.run(id, json!(null));
        let _ = registry.run(id, json!(null));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn contains_reflects_registration() {
        let registry = CallbackRegistry::new();
        let id = registry.register(|_| {});
        assert!(registry.contains(id));
        assert!(!registry.contains(CallbackId::new(id.as_u32() + 1)));
    }

    #[test]
    fn handler_may_register_through_shared_arena() {
        // A handler mid-delivery must be able to touch the arena without
        // deadlocking on a shard lock.
        let registry = Arc::new(CallbackRegistry::new());
        let registry_in = Arc::clone(&registry);
        let id = registry.register(move |_| {
            let _ = registry_in.register(|_| {});
        });

        assert!(registry.run(id, json!(null)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn callback_id_serde_is_transparent() {
        let id = CallbackId::new(17);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, json!(17));
        let back: CallbackId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn debug_shows_slot_count() {
        let registry = CallbackRegistry::new();
        let _ = registry.register(|_| {});
        let debug = format!("{registry:?}");
        assert!(debug.contains("CallbackRegistry"));
        assert!(debug.contains('1'));
    }
}
