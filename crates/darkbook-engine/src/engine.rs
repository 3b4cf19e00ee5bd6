//! The ciphertext algebra consumed by the core state machine.
//!
//! Every operation is pure with respect to plaintext: nothing here returns
//! or logs cleartext, and every result is a *fresh* handle — ciphertexts
//! are never mutated in place. Conditional effects on encrypted data must
//! go through [`HomomorphicEngine::select`]; there is no way to read an
//! encrypted boolean back into a plaintext branch within an operation.

use darkbook_types::{CtHandle, CtScalar, CtValue, Principal, Result};

use crate::input::{EncryptedInput, InputProof};

/// Ciphertext handle supplier and algebra.
///
/// Implementations type-check handles internally: presenting a handle the
/// engine never issued fails with `DB_ERR_501`, and presenting a handle of
/// the wrong ciphertext kind fails with `DB_ERR_502`.
pub trait HomomorphicEngine {
    /// Verify `proof` against the (caller, pool) binding and, on success,
    /// admit slot `slot` of `input` as a fresh ciphertext of type `T`.
    ///
    /// # Errors
    /// `ProofInvalid` if the proof does not attest this caller/pool pair or
    /// the slot is out of range. The proof is checked before any use of the
    /// payload.
    fn ingest<T: CtValue>(
        &mut self,
        input: &EncryptedInput,
        slot: usize,
        proof: &InputProof,
        caller: Principal,
        pool: Principal,
    ) -> Result<CtHandle<T>>;

    /// Encrypt a known plaintext (e.g. zero for the withdraw floor).
    fn constant<T: CtValue>(&mut self, value: T) -> CtHandle<T>;

    /// Encrypted addition. Wrapping at `T`'s width; overflow semantics
    /// belong to the engine, not the core.
    fn add<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<T>>;

    /// Encrypted subtraction, wrapping at `T`'s width.
    fn sub<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<T>>;

    /// Encrypted `a <= b`.
    fn le<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<bool>>;

    /// Encrypted `a >= b`.
    fn ge<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<bool>>;

    /// Encrypted `a == b`.
    fn eq<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<bool>>;

    /// Encrypted boolean AND.
    fn and(&mut self, a: CtHandle<bool>, b: CtHandle<bool>) -> Result<CtHandle<bool>>;

    /// Encrypted boolean OR.
    fn or(&mut self, a: CtHandle<bool>, b: CtHandle<bool>) -> Result<CtHandle<bool>>;

    /// Encrypted boolean NOT.
    fn not(&mut self, a: CtHandle<bool>) -> Result<CtHandle<bool>>;

    /// Branchless conditional: the value behind the result is `if_true`'s
    /// when `cond` holds, `if_false`'s otherwise. The only permitted way to
    /// make a value depend on a secret condition.
    fn select<T: CtValue>(
        &mut self,
        cond: CtHandle<bool>,
        if_true: CtHandle<T>,
        if_false: CtHandle<T>,
    ) -> Result<CtHandle<T>>;
}
