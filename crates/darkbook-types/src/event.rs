//! Events emitted by the pool, one per completed public operation.
//!
//! Events carry only the metadata the design declares public: ids,
//! principals, and timestamps. Nothing ciphertext-derived ever appears
//! here. A failed operation emits nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, Principal, RequestId};

/// A durable notification appended to the pool's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    FundsDeposited {
        principal: Principal,
        at: DateTime<Utc>,
    },
    FundsWithdrawn {
        principal: Principal,
        at: DateTime<Utc>,
    },
    OrderPlaced {
        id: OrderId,
        trader: Principal,
        at: DateTime<Utc>,
    },
    OrderCancelled {
        id: OrderId,
        trader: Principal,
    },
    OrderMatched {
        buy_id: OrderId,
        sell_id: OrderId,
        at: DateTime<Utc>,
    },
    /// Two-phase path: an encrypted verdict was handed off for decryption.
    MatchRequested {
        request_id: RequestId,
        buy_id: OrderId,
        sell_id: OrderId,
        at: DateTime<Utc>,
    },
    /// Two-phase path: the decrypted verdict was negative (or the request
    /// timed out) and the pair went back to active.
    MatchRejected {
        request_id: RequestId,
        buy_id: OrderId,
        sell_id: OrderId,
    },
    AdminUpdated {
        old: Principal,
        new: Principal,
    },
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::FundsDeposited { .. } => EventKind::FundsDeposited,
            Self::FundsWithdrawn { .. } => EventKind::FundsWithdrawn,
            Self::OrderPlaced { .. } => EventKind::OrderPlaced,
            Self::OrderCancelled { .. } => EventKind::OrderCancelled,
            Self::OrderMatched { .. } => EventKind::OrderMatched,
            Self::MatchRequested { .. } => EventKind::MatchRequested,
            Self::MatchRejected { .. } => EventKind::MatchRejected,
            Self::AdminUpdated { .. } => EventKind::AdminUpdated,
        }
    }
}

/// Discriminant of an [`Event`], for log fields and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    FundsDeposited,
    FundsWithdrawn,
    OrderPlaced,
    OrderCancelled,
    OrderMatched,
    MatchRequested,
    MatchRejected,
    AdminUpdated,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FundsDeposited => write!(f, "FUNDS_DEPOSITED"),
            Self::FundsWithdrawn => write!(f, "FUNDS_WITHDRAWN"),
            Self::OrderPlaced => write!(f, "ORDER_PLACED"),
            Self::OrderCancelled => write!(f, "ORDER_CANCELLED"),
            Self::OrderMatched => write!(f, "ORDER_MATCHED"),
            Self::MatchRequested => write!(f, "MATCH_REQUESTED"),
            Self::MatchRejected => write!(f, "MATCH_REJECTED"),
            Self::AdminUpdated => write!(f, "ADMIN_UPDATED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", EventKind::OrderPlaced), "ORDER_PLACED");
        assert_eq!(format!("{}", EventKind::MatchRequested), "MATCH_REQUESTED");
    }

    #[test]
    fn event_kind_matches_variant() {
        let ev = Event::OrderCancelled {
            id: OrderId(3),
            trader: Principal([2u8; 32]),
        };
        assert_eq!(ev.kind(), EventKind::OrderCancelled);
    }

    #[test]
    fn event_serde_roundtrip() {
        let ev = Event::OrderMatched {
            buy_id: OrderId(0),
            sell_id: OrderId(1),
            at: Utc::now(),
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
