//! The pool facade: one public operation per call.
//!
//! `DarkPool` owns the engine, the access table, the balance ledger, the
//! order store, the match records, and the pending book, plus the admin
//! cell and the append-only event log. Each operation is atomic — every
//! failure check precedes the first mutation, so an error leaves no
//! partial writes and emits no event. The execution environment is assumed
//! to serialize calls; `&mut self` makes that structural.

use chrono::Utc;
use darkbook_engine::{ClearEngine, EncryptedInput, HomomorphicEngine, InputProof};
use darkbook_types::{
    CtHandle, CtValue, DarkbookError, Event, Order, OrderId, PoolConfig, Principal, RequestId,
    Result,
};

use crate::access::AccessControlManager;
use crate::balance::BalanceLedger;
use crate::matching::{self, MatchRecord};
use crate::orders::OrderStore;
use crate::pending::{PendingBook, PendingMatch};

/// A confidential order book instance.
pub struct DarkPool<E> {
    pool_id: Principal,
    admin: Principal,
    config: PoolConfig,
    engine: E,
    access: AccessControlManager,
    balances: BalanceLedger,
    orders: OrderStore,
    matches: Vec<MatchRecord>,
    pending: PendingBook,
    events: Vec<Event>,
}

impl<E: HomomorphicEngine> DarkPool<E> {
    /// Create a pool bound to its own identity and an initial admin.
    ///
    /// # Errors
    /// `InvalidAddress` if either principal is the null address.
    pub fn new(pool_id: Principal, admin: Principal, engine: E, config: PoolConfig) -> Result<Self> {
        if pool_id.is_zero() || admin.is_zero() {
            return Err(DarkbookError::InvalidAddress);
        }
        Ok(Self {
            pool_id,
            admin,
            config,
            engine,
            access: AccessControlManager::new(pool_id),
            balances: BalanceLedger::new(),
            orders: OrderStore::new(),
            matches: Vec::new(),
            pending: PendingBook::new(),
            events: Vec::new(),
        })
    }

    // =====================================================================
    // Funds
    // =====================================================================

    /// Deposit an externally encrypted amount into the caller's balance.
    pub fn deposit_funds(
        &mut self,
        caller: Principal,
        input: &EncryptedInput,
        proof: &InputProof,
    ) -> Result<()> {
        let handle =
            self.balances
                .deposit(&mut self.engine, &mut self.access, caller, input, proof)?;
        let at = Utc::now();
        self.events.push(Event::FundsDeposited {
            principal: caller,
            at,
        });
        tracing::info!(caller = %caller, balance_handle = %handle, "Funds deposited");
        Ok(())
    }

    /// Withdraw an externally encrypted amount from the caller's balance.
    ///
    /// Insufficient funds silently debit zero; the event is emitted either
    /// way and the caller cannot tell which case occurred without
    /// decrypting their balance off-chain.
    ///
    /// # Errors
    /// `BalanceUninitialized` before any deposit.
    pub fn withdraw_funds(
        &mut self,
        caller: Principal,
        input: &EncryptedInput,
        proof: &InputProof,
    ) -> Result<()> {
        let handle =
            self.balances
                .withdraw(&mut self.engine, &mut self.access, caller, input, proof)?;
        let at = Utc::now();
        self.events.push(Event::FundsWithdrawn {
            principal: caller,
            at,
        });
        tracing::info!(caller = %caller, balance_handle = %handle, "Funds withdrawn");
        Ok(())
    }

    // =====================================================================
    // Orders
    // =====================================================================

    /// Place an order from a three-slot encrypted input
    /// (amount, price, direction) under one proof.
    pub fn place_order(
        &mut self,
        caller: Principal,
        input: &EncryptedInput,
        proof: &InputProof,
    ) -> Result<OrderId> {
        let at = Utc::now();
        let id = self
            .orders
            .place(&mut self.engine, &mut self.access, caller, input, proof, at)?;
        self.events.push(Event::OrderPlaced {
            id,
            trader: caller,
            at,
        });
        tracing::info!(order = %id, trader = %caller, "Order placed");
        Ok(id)
    }

    /// Cancel the caller's own active order. Irreversible.
    pub fn cancel_order(&mut self, caller: Principal, id: OrderId) -> Result<()> {
        self.orders.cancel(caller, id)?;
        self.events.push(Event::OrderCancelled { id, trader: caller });
        tracing::info!(order = %id, trader = %caller, "Order cancelled");
        Ok(())
    }

    // =====================================================================
    // Matching — synchronous reference path
    // =====================================================================

    /// Evaluate and finalize a candidate pair. Admin only.
    ///
    /// Finalization is unconditional: within one execution the encrypted
    /// verdict cannot be read back into a plaintext branch, so both orders
    /// are deactivated and the match recorded whatever `can_match` holds.
    /// The verdict handle is granted to the admin and returned for
    /// off-chain decryption. The conditional protocol lives in
    /// [`Self::request_match`] / [`Self::deliver_match_verdict`].
    ///
    /// # Errors
    /// `OnlyAdmin`; `OrderNotActive` if either order's flag is false
    /// (out-of-range ids resolve to the inactive sentinel).
    pub fn match_orders(
        &mut self,
        caller: Principal,
        buy_id: OrderId,
        sell_id: OrderId,
    ) -> Result<CtHandle<bool>> {
        let (buy, sell) = self.prepare_match(caller, buy_id, sell_id)?;

        let can_match = matching::evaluate(&mut self.engine, &buy, &sell)?;
        self.access.grant_standard(can_match, self.admin);

        self.orders.set_active(buy_id, false)?;
        self.orders.set_active(sell_id, false)?;

        let at = Utc::now();
        self.matches.push(MatchRecord {
            buy_id,
            sell_id,
            can_match,
            matched_at: at,
        });
        self.events.push(Event::OrderMatched {
            buy_id,
            sell_id,
            at,
        });
        tracing::info!(
            buy = %buy_id,
            sell = %sell_id,
            verdict_handle = %can_match,
            total_matches = self.matches.len(),
            "Orders matched"
        );
        Ok(can_match)
    }

    // =====================================================================
    // Matching — two-phase decryption round trip
    // =====================================================================

    /// Phase one: evaluate a pair, reserve it, and hand the encrypted
    /// verdict off for asynchronous decryption. Admin only.
    ///
    /// Both orders go inactive while the request is open; they are retired
    /// for good or released again only by the verdict (or expiry).
    pub fn request_match(
        &mut self,
        caller: Principal,
        buy_id: OrderId,
        sell_id: OrderId,
    ) -> Result<RequestId> {
        let (buy, sell) = self.prepare_match(caller, buy_id, sell_id)?;

        let can_match = matching::evaluate(&mut self.engine, &buy, &sell)?;
        self.access.grant_standard(can_match, self.admin);

        self.orders.set_active(buy_id, false)?;
        self.orders.set_active(sell_id, false)?;

        let at = Utc::now();
        let request_id = self.pending.open(buy_id, sell_id, can_match, at);
        self.events.push(Event::MatchRequested {
            request_id,
            buy_id,
            sell_id,
            at,
        });
        tracing::info!(
            request = %request_id,
            buy = %buy_id,
            sell = %sell_id,
            "Match verdict requested"
        );
        Ok(request_id)
    }

    /// Phase two: consume the decrypted verdict. Admin only (acting as the
    /// decryption-oracle relay).
    ///
    /// A duplicate delivery for an already-resolved request is a logged
    /// no-op — the verdict is never double-applied.
    ///
    /// # Errors
    /// `OnlyAdmin`; `MatchRequestNotFound` for an id never allocated.
    pub fn deliver_match_verdict(
        &mut self,
        caller: Principal,
        request_id: RequestId,
        verdict: bool,
    ) -> Result<()> {
        self.require_admin(caller)?;

        let Some(pending) = self.pending.resolve(request_id)? else {
            tracing::debug!(request = %request_id, "Duplicate verdict delivery ignored");
            return Ok(());
        };

        if verdict {
            let at = Utc::now();
            self.matches.push(MatchRecord {
                buy_id: pending.buy_id,
                sell_id: pending.sell_id,
                can_match: pending.can_match,
                matched_at: at,
            });
            self.events.push(Event::OrderMatched {
                buy_id: pending.buy_id,
                sell_id: pending.sell_id,
                at,
            });
            tracing::info!(request = %request_id, "Match confirmed by verdict");
        } else {
            self.orders.set_active(pending.buy_id, true)?;
            self.orders.set_active(pending.sell_id, true)?;
            self.events.push(Event::MatchRejected {
                request_id,
                buy_id: pending.buy_id,
                sell_id: pending.sell_id,
            });
            tracing::info!(request = %request_id, "Match rejected by verdict, pair released");
        }
        Ok(())
    }

    /// Timeout policy: expire an unanswered request and release the pair.
    /// Admin only. Behaves exactly like a negative verdict.
    ///
    /// # Errors
    /// `OnlyAdmin`; `MatchRequestNotFound`; `MatchRequestNotExpired` before
    /// the configured TTL has elapsed.
    pub fn expire_match_request(&mut self, caller: Principal, request_id: RequestId) -> Result<()> {
        self.require_admin(caller)?;

        let now = Utc::now();
        let ttl = self.config.match_request_ttl();
        let pending = self
            .pending
            .get(request_id)
            .ok_or(DarkbookError::MatchRequestNotFound(request_id))?;
        if !pending.is_expired(now, ttl) {
            return Err(DarkbookError::MatchRequestNotExpired(request_id));
        }

        let Some(pending) = self.pending.resolve(request_id)? else {
            return Err(DarkbookError::Internal(format!(
                "open request {request_id} vanished during expiry"
            )));
        };
        self.orders.set_active(pending.buy_id, true)?;
        self.orders.set_active(pending.sell_id, true)?;
        self.events.push(Event::MatchRejected {
            request_id,
            buy_id: pending.buy_id,
            sell_id: pending.sell_id,
        });
        tracing::info!(request = %request_id, "Match request expired, pair released");
        Ok(())
    }

    // =====================================================================
    // Admin
    // =====================================================================

    /// Hand the admin role to another principal. Admin only.
    ///
    /// # Errors
    /// `OnlyAdmin`; `InvalidAddress` for the null principal.
    pub fn update_admin(&mut self, caller: Principal, new_admin: Principal) -> Result<()> {
        self.require_admin(caller)?;
        if new_admin.is_zero() {
            return Err(DarkbookError::InvalidAddress);
        }
        let old = self.admin;
        self.admin = new_admin;
        self.events.push(Event::AdminUpdated {
            old,
            new: new_admin,
        });
        tracing::info!(old = %old, new = %new_admin, "Admin updated");
        Ok(())
    }

    // =====================================================================
    // Views (read-only, never fail on valid input)
    // =====================================================================

    /// The caller-visible encrypted balance handle, if initialized.
    #[must_use]
    pub fn encrypted_balance(&self, principal: Principal) -> Option<CtHandle<u64>> {
        self.balances.balance_of(principal)
    }

    #[must_use]
    pub fn has_balance(&self, principal: Principal) -> bool {
        self.balances.has_balance(principal)
    }

    /// Plaintext metadata plus opaque handles; the sentinel for ids the
    /// store never allocated.
    #[must_use]
    pub fn get_order(&self, id: OrderId) -> Order {
        self.orders.get(id)
    }

    #[must_use]
    pub fn user_orders(&self, principal: Principal) -> Vec<OrderId> {
        self.orders.user_orders(principal)
    }

    #[must_use]
    pub fn total_orders(&self) -> u64 {
        self.orders.total()
    }

    #[must_use]
    pub fn total_matches(&self) -> u64 {
        self.matches.len() as u64
    }

    #[must_use]
    pub fn match_records(&self) -> &[MatchRecord] {
        &self.matches
    }

    #[must_use]
    pub fn pending_requests(&self) -> Vec<&PendingMatch> {
        self.pending.open_requests()
    }

    #[must_use]
    pub fn admin(&self) -> Principal {
        self.admin
    }

    #[must_use]
    pub fn pool_id(&self) -> Principal {
        self.pool_id
    }

    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The append-only event log, in operation order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn access(&self) -> &AccessControlManager {
        &self.access
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn require_admin(&self, caller: Principal) -> Result<()> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(DarkbookError::OnlyAdmin)
        }
    }

    /// Common match preamble: admin gate, then the plaintext active-flag
    /// checks (synchronous — these flags are public metadata).
    fn prepare_match(
        &self,
        caller: Principal,
        buy_id: OrderId,
        sell_id: OrderId,
    ) -> Result<(Order, Order)> {
        self.require_admin(caller)?;
        let buy = self.orders.get(buy_id);
        if !buy.active {
            return Err(DarkbookError::OrderNotActive(buy_id));
        }
        let sell = self.orders.get(sell_id);
        if !sell.active {
            return Err(DarkbookError::OrderNotActive(sell_id));
        }
        Ok((buy, sell))
    }
}

impl DarkPool<ClearEngine> {
    /// Off-chain decryption path for the reference engine: reveal a handle
    /// to a principal holding a grant on it.
    ///
    /// # Errors
    /// `AccessDenied` without a grant; engine errors for unknown handles.
    pub fn decrypt_for<T: CtValue>(
        &self,
        principal: Principal,
        handle: CtHandle<T>,
    ) -> Result<T> {
        if !self.access.has_grant(handle.raw(), principal) {
            return Err(DarkbookError::AccessDenied {
                handle: handle.raw(),
                principal,
            });
        }
        self.engine.reveal(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_null_identities() {
        let err = DarkPool::new(
            Principal::ZERO,
            Principal::random(),
            ClearEngine::new(),
            PoolConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, DarkbookError::InvalidAddress));

        let err = DarkPool::new(
            Principal::random(),
            Principal::ZERO,
            ClearEngine::new(),
            PoolConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, DarkbookError::InvalidAddress));
    }

    #[test]
    fn update_admin_transfers_the_role() {
        let admin = Principal::random();
        let next = Principal::random();
        let mut pool = DarkPool::new(
            Principal::random(),
            admin,
            ClearEngine::new(),
            PoolConfig::default(),
        )
        .unwrap();

        // Non-admin cannot transfer.
        let err = pool.update_admin(next, next).unwrap_err();
        assert!(matches!(err, DarkbookError::OnlyAdmin));

        pool.update_admin(admin, next).unwrap();
        assert_eq!(pool.admin(), next);

        // Old admin is locked out afterwards.
        let err = pool.update_admin(admin, admin).unwrap_err();
        assert!(matches!(err, DarkbookError::OnlyAdmin));
    }

    #[test]
    fn update_admin_rejects_null() {
        let admin = Principal::random();
        let mut pool = DarkPool::new(
            Principal::random(),
            admin,
            ClearEngine::new(),
            PoolConfig::default(),
        )
        .unwrap();

        let err = pool.update_admin(admin, Principal::ZERO).unwrap_err();
        assert!(matches!(err, DarkbookError::InvalidAddress));
        assert_eq!(pool.admin(), admin);
        assert!(pool.events().is_empty());
    }
}
