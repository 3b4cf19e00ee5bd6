//! Access-control bookkeeping for ciphertext handles.
//!
//! Tracks, per handle, the set of principals permitted to later request
//! decryption of that handle. The relation is append-only: grants
//! accumulate for the lifetime of the system and re-granting is idempotent.
//! The manager owns no ciphertexts — it is a pure side-table, lifetime-
//! independent of the handles it describes.

use std::collections::{HashMap, HashSet};

use darkbook_types::{CtHandle, CtValue, Principal, RawHandle};

/// Append-only `(handle, principal) -> granted` relation.
pub struct AccessControlManager {
    /// The pool's own identity; granted on every handle so future
    /// operations can keep using it.
    system: Principal,
    grants: HashMap<RawHandle, HashSet<Principal>>,
}

impl AccessControlManager {
    #[must_use]
    pub fn new(system: Principal) -> Self {
        Self {
            system,
            grants: HashMap::new(),
        }
    }

    /// The system identity grants are issued under.
    #[must_use]
    pub fn system(&self) -> Principal {
        self.system
    }

    /// Idempotent insert. Returns whether the grant was new.
    pub fn grant(&mut self, handle: RawHandle, principal: Principal) -> bool {
        self.grants.entry(handle).or_default().insert(principal)
    }

    /// Standard grant for a freshly produced handle: the system identity
    /// plus the owning principal. Invoked immediately after every balance
    /// or order mutation, covering exactly the new handle — abandoned
    /// handles keep their old grants.
    pub fn grant_standard<T: CtValue>(&mut self, handle: CtHandle<T>, owner: Principal) {
        self.grant(handle.raw(), self.system);
        self.grant(handle.raw(), owner);
    }

    /// Whether `principal` may request decryption of `handle`.
    #[must_use]
    pub fn has_grant(&self, handle: RawHandle, principal: Principal) -> bool {
        self.grants
            .get(&handle)
            .is_some_and(|set| set.contains(&principal))
    }

    /// Total number of (handle, principal) grants recorded.
    #[must_use]
    pub fn grant_count(&self) -> usize {
        self.grants.values().map(HashSet::len).sum()
    }
}
