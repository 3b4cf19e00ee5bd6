//! Configuration for a Darkbook pool instance.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Runtime configuration for a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// How long a match-decryption request may stay unanswered before the
    /// admin can expire it and release the reserved pair.
    pub match_request_ttl_secs: u64,
}

impl PoolConfig {
    /// The TTL as a `chrono` duration for timestamp arithmetic.
    #[must_use]
    pub fn match_request_ttl(&self) -> Duration {
        Duration::seconds(i64::try_from(self.match_request_ttl_secs).unwrap_or(i64::MAX))
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            match_request_ttl_secs: constants::DEFAULT_MATCH_REQUEST_TTL_SECS,
        }
    }
}
