//! The confidential order model.
//!
//! An order's terms — amount, limit price, direction — are ciphertext
//! handles and can never be edited after placement, only cancelled or
//! matched. The trader identity, placement time, and lifecycle flag are
//! intentionally public.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CtHandle, OrderId, Principal};

/// A stored order. Immutable after creation except for `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub trader: Principal,
    /// Encrypted quantity.
    pub amount: CtHandle<u32>,
    /// Encrypted limit price.
    pub price: CtHandle<u32>,
    /// Encrypted direction: true = buy, false = sell.
    pub is_buy: CtHandle<bool>,
    /// Lifecycle flag; flips true -> false exactly once under the
    /// synchronous operations.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The zeroed record returned for out-of-range id lookups.
    ///
    /// Looking up an id the store never allocated is not an error; callers
    /// get this inert record instead (null handles, null trader, inactive).
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            id: OrderId(0),
            trader: Principal::ZERO,
            amount: CtHandle::null(),
            price: CtHandle::null(),
            is_buy: CtHandle::null(),
            active: false,
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    /// Whether this is the out-of-range sentinel rather than a stored order.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.trader.is_zero() && self.amount.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_inert() {
        let order = Order::sentinel();
        assert!(order.is_sentinel());
        assert!(!order.active);
        assert!(order.trader.is_zero());
        assert!(order.amount.is_null());
        assert!(order.price.is_null());
        assert!(order.is_buy.is_null());
    }

    #[test]
    fn stored_order_is_not_sentinel() {
        let order = Order {
            id: OrderId(0),
            trader: Principal([1u8; 32]),
            amount: CtHandle::from_raw(crate::RawHandle(1)),
            price: CtHandle::from_raw(crate::RawHandle(2)),
            is_buy: CtHandle::from_raw(crate::RawHandle(3)),
            active: true,
            created_at: Utc::now(),
        };
        assert!(!order.is_sentinel());
    }

    #[test]
    fn order_serde_roundtrip() {
        let order = Order::sentinel();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
