//! The durable order store.
//!
//! Append-only: orders are created by `place`, flipped inactive by `cancel`
//! or the match paths, and never deleted. Ids are a monotonic counter from
//! 0, so the store is a plain vector indexed by id, with a per-trader index
//! alongside. Out-of-range lookups return the sentinel record, not an
//! error.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use darkbook_engine::{EncryptedInput, HomomorphicEngine, InputProof};
use darkbook_types::{constants, CtHandle, DarkbookError, Order, OrderId, Principal, Result};

use crate::access::AccessControlManager;

/// Orders indexed by monotonic id, plus the per-trader history.
#[derive(Default)]
pub struct OrderStore {
    orders: Vec<Order>,
    by_trader: HashMap<Principal, Vec<OrderId>>,
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: Vec::new(),
            by_trader: HashMap::new(),
        }
    }

    /// Ingest an order's three ciphertexts (amount, price, direction) under
    /// one proof, allocate the next id, and store the order active.
    ///
    /// The trader identity and placement time are intentionally public;
    /// only the order's terms are private.
    ///
    /// # Errors
    /// `ProofInvalid` if the input is not a three-slot submission sealed
    /// for this caller/pool pair.
    pub fn place<E: HomomorphicEngine>(
        &mut self,
        engine: &mut E,
        acl: &mut AccessControlManager,
        caller: Principal,
        input: &EncryptedInput,
        proof: &InputProof,
        now: DateTime<Utc>,
    ) -> Result<OrderId> {
        if input.slots() != constants::ORDER_INPUT_SLOTS {
            return Err(DarkbookError::ProofInvalid {
                reason: format!(
                    "order input needs {} slots, got {}",
                    constants::ORDER_INPUT_SLOTS,
                    input.slots()
                ),
            });
        }

        let pool = acl.system();
        let amount: CtHandle<u32> = engine.ingest(input, 0, proof, caller, pool)?;
        let price: CtHandle<u32> = engine.ingest(input, 1, proof, caller, pool)?;
        let is_buy: CtHandle<bool> = engine.ingest(input, 2, proof, caller, pool)?;

        let id = OrderId(self.orders.len() as u64);
        self.orders.push(Order {
            id,
            trader: caller,
            amount,
            price,
            is_buy,
            active: true,
            created_at: now,
        });
        self.by_trader.entry(caller).or_default().push(id);

        acl.grant_standard(amount, caller);
        acl.grant_standard(price, caller);
        acl.grant_standard(is_buy, caller);
        Ok(id)
    }

    /// Flip an order inactive. Irreversible through this path.
    ///
    /// # Errors
    /// `NotOrderOwner` if `caller` is not the trader (checked first);
    /// `OrderNotActive` if the flag is already false.
    pub fn cancel(&mut self, caller: Principal, id: OrderId) -> Result<()> {
        // Out-of-range ids resolve to the sentinel and fail the owner check.
        let order = self.get(id);
        if order.trader != caller {
            return Err(DarkbookError::NotOrderOwner { id, caller });
        }
        if !order.active {
            return Err(DarkbookError::OrderNotActive(id));
        }
        self.set_active(id, false)
    }

    /// The stored order, or [`Order::sentinel`] for an id the store never
    /// allocated.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Order {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.orders.get(idx))
            .cloned()
            .unwrap_or_else(Order::sentinel)
    }

    /// Every id the principal has ever placed, in placement order,
    /// including cancelled and matched ones.
    #[must_use]
    pub fn user_orders(&self, principal: Principal) -> Vec<OrderId> {
        self.by_trader.get(&principal).cloned().unwrap_or_default()
    }

    /// The id counter value: number of successful placements.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.orders.len() as u64
    }

    pub(crate) fn set_active(&mut self, id: OrderId, active: bool) -> Result<()> {
        let order = usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.orders.get_mut(idx))
            .ok_or_else(|| DarkbookError::Internal(format!("no stored order {id}")))?;
        order.active = active;
        Ok(())
    }
}
