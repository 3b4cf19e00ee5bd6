//! System-wide constants and defaults.

/// Default TTL for an unanswered match-decryption request, in seconds.
/// After this long the admin may expire the request and release the pair.
pub const DEFAULT_MATCH_REQUEST_TTL_SECS: u64 = 3600;

/// Slots in a `place_order` input: amount, price, direction.
pub const ORDER_INPUT_SLOTS: usize = 3;

/// Slots in a deposit/withdraw input: amount only.
pub const FUNDS_INPUT_SLOTS: usize = 1;
