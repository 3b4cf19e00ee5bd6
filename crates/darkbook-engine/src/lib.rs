//! # darkbook-engine
//!
//! The homomorphic engine seam of the Darkbook workspace.
//!
//! The core state machine never touches plaintext amounts, prices, or
//! directions. Everything it does with encrypted data goes through the
//! [`HomomorphicEngine`] trait defined here:
//!
//! 1. **Ingestion**: externally encrypted values enter as an
//!    [`EncryptedInput`] plus an [`InputProof`] binding them to the
//!    submitting caller and the pool identity. A bad binding fails with
//!    `DB_ERR_500` before any value is used.
//! 2. **Algebra**: add/sub, comparisons, boolean ops, and the branchless
//!    [`HomomorphicEngine::select`] — the only way any value may depend on
//!    an encrypted condition.
//!
//! [`ClearEngine`] is the reference implementation: plaintext words behind
//! opaque handles, suitable for tests and local runs. Its `reveal` method
//! (the decryption-oracle door) is deliberately *not* part of the trait, so
//! core code generic over the trait cannot decrypt anything.

pub mod clear;
pub mod engine;
pub mod input;

pub use clear::ClearEngine;
pub use engine::HomomorphicEngine;
pub use input::{EncryptedInput, InputProof};
