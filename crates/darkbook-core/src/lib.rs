//! # darkbook-core
//!
//! The encrypted state machine of the Darkbook confidential order book.
//!
//! Traders deposit funds, place buy/sell orders, and have an admin match
//! compatible pairs — with every numeric and boolean attribute of balances
//! and orders kept as opaque ciphertext throughout. No component here ever
//! reads a plaintext amount, price, or direction; every mutation is
//! ciphertext algebra through the `HomomorphicEngine` seam.
//!
//! ## Components
//!
//! 1. [`AccessControlManager`]: per-handle decryption grants, append-only
//! 2. [`BalanceLedger`]: per-principal encrypted balances
//! 3. [`OrderStore`]: durable orders with monotonic id allocation
//! 4. [`matching`]: the encrypted can-match predicate
//! 5. [`PendingBook`]: the asynchronous decryption round trip
//! 6. [`DarkPool`]: the facade exposing one public operation per call
//!
//! ## Execution model
//!
//! Single-threaded and fully serialized: each public operation runs to
//! completion as one atomic unit (`&mut self`), with every failure check
//! preceding the first mutation. The only asynchrony in the domain is the
//! match-verdict decryption round trip, modeled as two separate atomic
//! operations bridged by a persisted [`PendingMatch`].

pub mod access;
pub mod balance;
pub mod matching;
pub mod orders;
pub mod pending;
pub mod pool;

pub use access::AccessControlManager;
pub use balance::BalanceLedger;
pub use matching::MatchRecord;
pub use orders::OrderStore;
pub use pending::{PendingBook, PendingMatch};
pub use pool::DarkPool;
