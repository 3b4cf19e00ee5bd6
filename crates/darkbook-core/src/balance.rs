//! The encrypted balance ledger.
//!
//! One encrypted scalar per principal. Absence is the "uninitialized"
//! state, distinct from an encrypted zero. Every mutation installs a
//! brand-new handle — the old one is abandoned with its grants intact,
//! never mutated in place. All mutations are atomic: every failure check
//! precedes the first write.

use std::collections::HashMap;

use darkbook_engine::{EncryptedInput, HomomorphicEngine, InputProof};
use darkbook_types::{constants, CtHandle, DarkbookError, Principal, Result};

use crate::access::AccessControlManager;

/// Per-principal encrypted balances.
#[derive(Default)]
pub struct BalanceLedger {
    balances: HashMap<Principal, CtHandle<u64>>,
}

impl BalanceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Deposit an externally encrypted amount.
    ///
    /// First deposit sets the balance to the ingested handle; later
    /// deposits set it to `add(existing, ingested)`. No overflow check is
    /// made — wrapping semantics belong to the engine. Cannot fail on the
    /// encrypted value itself.
    ///
    /// # Errors
    /// `ProofInvalid` if the input was not sealed for this caller/pool pair.
    pub fn deposit<E: HomomorphicEngine>(
        &mut self,
        engine: &mut E,
        acl: &mut AccessControlManager,
        caller: Principal,
        input: &EncryptedInput,
        proof: &InputProof,
    ) -> Result<CtHandle<u64>> {
        check_funds_input(input)?;
        let amount: CtHandle<u64> = engine.ingest(input, 0, proof, caller, acl.system())?;

        let updated = match self.balances.get(&caller) {
            Some(&existing) => engine.add(existing, amount)?,
            None => amount,
        };

        self.balances.insert(caller, updated);
        acl.grant_standard(updated, caller);
        Ok(updated)
    }

    /// Withdraw an externally encrypted amount.
    ///
    /// Computes `sufficient = le(amount, balance)` and debits
    /// `select(sufficient, amount, 0)`. When funds are insufficient this is
    /// *not* an error: zero is silently debited and the caller cannot tell
    /// the difference without decrypting their balance off-chain. That
    /// asymmetry is a deliberate design contract, not an omission.
    ///
    /// # Errors
    /// `BalanceUninitialized` if the caller never deposited;
    /// `ProofInvalid` on a bad input binding.
    pub fn withdraw<E: HomomorphicEngine>(
        &mut self,
        engine: &mut E,
        acl: &mut AccessControlManager,
        caller: Principal,
        input: &EncryptedInput,
        proof: &InputProof,
    ) -> Result<CtHandle<u64>> {
        let balance = *self
            .balances
            .get(&caller)
            .ok_or(DarkbookError::BalanceUninitialized(caller))?;

        check_funds_input(input)?;
        let amount: CtHandle<u64> = engine.ingest(input, 0, proof, caller, acl.system())?;
        let sufficient = engine.le(amount, balance)?;
        let zero = engine.constant(0u64);
        let debit = engine.select(sufficient, amount, zero)?;
        let updated = engine.sub(balance, debit)?;

        self.balances.insert(caller, updated);
        acl.grant_standard(updated, caller);
        Ok(updated)
    }

    /// The current balance handle, if any. Decrypting it requires a grant.
    #[must_use]
    pub fn balance_of(&self, principal: Principal) -> Option<CtHandle<u64>> {
        self.balances.get(&principal).copied()
    }

    /// Whether the principal's balance has ever been initialized.
    #[must_use]
    pub fn has_balance(&self, principal: Principal) -> bool {
        self.balances.contains_key(&principal)
    }
}

fn check_funds_input(input: &EncryptedInput) -> Result<()> {
    if input.slots() == constants::FUNDS_INPUT_SLOTS {
        Ok(())
    } else {
        Err(DarkbookError::ProofInvalid {
            reason: format!(
                "funds input needs {} slot, got {}",
                constants::FUNDS_INPUT_SLOTS,
                input.slots()
            ),
        })
    }
}
