//! Event name validation.
//!
//! Event names are opaque identifiers: the bus never interprets them
//! structurally. The charset rule here is the host's registration contract;
//! the client only enforces non-emptiness when registering and leaves
//! charset rejection to the host.

/// Characters an event name may contain besides ASCII alphanumerics.
pub const ALLOWED_SYMBOLS: &[u8] = &[b'-', b'/', b':', b'_'];

/// Whether `name` is a well-formed event name.
///
/// Valid names are non-empty and contain only ASCII alphanumerics and
/// `-`, `/`, `:`, `_`.
#[must_use]
pub fn is_valid_event_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || ALLOWED_SYMBOLS.contains(&b))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
