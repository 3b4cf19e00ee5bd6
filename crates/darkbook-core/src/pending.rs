//! The pending match book: bookkeeping for the asynchronous decryption
//! round trip.
//!
//! Nothing can block mid-operation waiting for an external decryption
//! oracle, so the two-phase match protocol persists an intermediate
//! `PendingMatch` between the request and the verdict callback. The book
//! also remembers every resolved request id so a duplicate callback is
//! detected and never double-applied.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use darkbook_types::{CtHandle, DarkbookError, OrderId, RequestId, Result};
use serde::{Deserialize, Serialize};

/// A match pair awaiting its decrypted verdict. The referenced orders are
/// reserved (inactive) for as long as the request is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMatch {
    pub request_id: RequestId,
    pub buy_id: OrderId,
    pub sell_id: OrderId,
    /// The encrypted verdict handed off for decryption.
    pub can_match: CtHandle<bool>,
    pub requested_at: DateTime<Utc>,
}

impl PendingMatch {
    /// Whether the request has outlived `ttl` as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.requested_at >= ttl
    }
}

/// Open requests plus the resolved-id set.
#[derive(Default)]
pub struct PendingBook {
    open: HashMap<RequestId, PendingMatch>,
    resolved: HashSet<RequestId>,
    next_request_id: RequestId,
}

impl PendingBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a new pending pair and allocate its request id.
    pub fn open(
        &mut self,
        buy_id: OrderId,
        sell_id: OrderId,
        can_match: CtHandle<bool>,
        now: DateTime<Utc>,
    ) -> RequestId {
        let request_id = self.next_request_id;
        self.next_request_id = request_id.next();
        self.open.insert(
            request_id,
            PendingMatch {
                request_id,
                buy_id,
                sell_id,
                can_match,
                requested_at: now,
            },
        );
        request_id
    }

    /// Close a request. `Ok(Some)` hands the pending pair to the caller for
    /// exactly one application of the verdict; `Ok(None)` marks a duplicate
    /// delivery for an already-resolved id (must not be re-applied).
    ///
    /// # Errors
    /// `MatchRequestNotFound` if the id was never allocated.
    pub fn resolve(&mut self, request_id: RequestId) -> Result<Option<PendingMatch>> {
        if let Some(pending) = self.open.remove(&request_id) {
            self.resolved.insert(request_id);
            return Ok(Some(pending));
        }
        if self.resolved.contains(&request_id) {
            return Ok(None);
        }
        Err(DarkbookError::MatchRequestNotFound(request_id))
    }

    /// The open request under `request_id`, if any.
    #[must_use]
    pub fn get(&self, request_id: RequestId) -> Option<&PendingMatch> {
        self.open.get(&request_id)
    }

    /// Whether the id has already been resolved.
    #[must_use]
    pub fn is_resolved(&self, request_id: RequestId) -> bool {
        self.resolved.contains(&request_id)
    }

    /// All open requests, oldest allocation first.
    #[must_use]
    pub fn open_requests(&self) -> Vec<&PendingMatch> {
        let mut requests: Vec<_> = self.open.values().collect();
        requests.sort_by_key(|p| p.request_id);
        requests
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}
