//! The in-process reference engine.
//!
//! `ClearEngine` keeps plaintext words behind opaque, monotonically
//! allocated handles. It exists so the state machine can run and be tested
//! without a real FHE backend; the trait surface it implements is identical
//! to what a hardware-backed engine would expose. Handle ids start at 1 —
//! id 0 is the reserved null handle and every operation on it fails with
//! `UnknownHandle`.

use std::collections::HashMap;

use darkbook_types::{CtHandle, CtKind, CtScalar, CtValue, DarkbookError, Principal, RawHandle, Result};

use crate::engine::HomomorphicEngine;
use crate::input::{EncryptedInput, InputProof};

/// One stored ciphertext: its kind tag and the plaintext word.
#[derive(Debug, Clone, Copy)]
struct Slot {
    kind: CtKind,
    word: u64,
}

/// Reference engine holding plaintexts behind opaque handles.
#[derive(Debug)]
pub struct ClearEngine {
    slots: HashMap<u64, Slot>,
    next: u64,
}

impl Default for ClearEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClearEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            next: 1,
        }
    }

    /// Number of ciphertexts ever issued (abandoned handles included).
    #[must_use]
    pub fn ciphertext_count(&self) -> usize {
        self.slots.len()
    }

    /// Decrypt a handle. This is the off-chain oracle door: it is an
    /// inherent method, not part of [`HomomorphicEngine`], so core code
    /// generic over the trait cannot reach it. Access-control gating is the
    /// caller's responsibility.
    pub fn reveal<T: CtValue>(&self, handle: CtHandle<T>) -> Result<T> {
        Ok(T::from_word(self.word_of::<T>(handle)?))
    }

    fn alloc<T: CtValue>(&mut self, word: u64) -> CtHandle<T> {
        let id = self.next;
        self.next += 1;
        self.slots.insert(
            id,
            Slot {
                kind: T::KIND,
                word: word & width_mask(T::BITS),
            },
        );
        CtHandle::from_raw(RawHandle(id))
    }

    fn word_of<T: CtValue>(&self, handle: CtHandle<T>) -> Result<u64> {
        let slot = self
            .slots
            .get(&handle.raw().0)
            .ok_or(DarkbookError::UnknownHandle(handle.raw()))?;
        if slot.kind != T::KIND {
            return Err(DarkbookError::CiphertextTypeMismatch {
                expected: T::KIND,
                actual: slot.kind,
            });
        }
        Ok(slot.word)
    }
}

fn width_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

impl HomomorphicEngine for ClearEngine {
    fn ingest<T: CtValue>(
        &mut self,
        input: &EncryptedInput,
        slot: usize,
        proof: &InputProof,
        caller: Principal,
        pool: Principal,
    ) -> Result<CtHandle<T>> {
        // Proof before payload, always.
        if let Err(err) = input.verify(proof, caller, pool) {
            tracing::warn!(caller = %caller, "input proof rejected");
            return Err(err);
        }
        let word = input.unmask(slot, caller, pool)?;
        Ok(self.alloc::<T>(word))
    }

    fn constant<T: CtValue>(&mut self, value: T) -> CtHandle<T> {
        self.alloc::<T>(value.to_word())
    }

    fn add<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<T>> {
        let sum = self.word_of::<T>(a)?.wrapping_add(self.word_of::<T>(b)?);
        Ok(self.alloc::<T>(sum))
    }

    fn sub<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<T>> {
        let diff = self.word_of::<T>(a)?.wrapping_sub(self.word_of::<T>(b)?);
        Ok(self.alloc::<T>(diff))
    }

    fn le<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<bool>> {
        let le = self.word_of::<T>(a)? <= self.word_of::<T>(b)?;
        Ok(self.alloc::<bool>(u64::from(le)))
    }

    fn ge<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<bool>> {
        let ge = self.word_of::<T>(a)? >= self.word_of::<T>(b)?;
        Ok(self.alloc::<bool>(u64::from(ge)))
    }

    fn eq<T: CtScalar>(&mut self, a: CtHandle<T>, b: CtHandle<T>) -> Result<CtHandle<bool>> {
        let eq = self.word_of::<T>(a)? == self.word_of::<T>(b)?;
        Ok(self.alloc::<bool>(u64::from(eq)))
    }

    fn and(&mut self, a: CtHandle<bool>, b: CtHandle<bool>) -> Result<CtHandle<bool>> {
        let word = self.word_of::<bool>(a)? & self.word_of::<bool>(b)?;
        Ok(self.alloc::<bool>(word))
    }

    fn or(&mut self, a: CtHandle<bool>, b: CtHandle<bool>) -> Result<CtHandle<bool>> {
        let word = self.word_of::<bool>(a)? | self.word_of::<bool>(b)?;
        Ok(self.alloc::<bool>(word))
    }

    fn not(&mut self, a: CtHandle<bool>) -> Result<CtHandle<bool>> {
        let word = self.word_of::<bool>(a)? ^ 1;
        Ok(self.alloc::<bool>(word))
    }

    fn select<T: CtValue>(
        &mut self,
        cond: CtHandle<bool>,
        if_true: CtHandle<T>,
        if_false: CtHandle<T>,
    ) -> Result<CtHandle<T>> {
        let cond_word = self.word_of::<bool>(cond)?;
        let true_word = self.word_of::<T>(if_true)?;
        let false_word = self.word_of::<T>(if_false)?;
        // Branchless even here: mask arithmetic, no data-dependent jump.
        let mask = cond_word.wrapping_neg();
        let word = (true_word & mask) | (false_word & !mask);
        Ok(self.alloc::<T>(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seal_one(value: u64, caller: Principal, pool: Principal) -> (EncryptedInput, InputProof) {
        let mut nonce = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut nonce[..]);
        EncryptedInput::seal(&[value], nonce, caller, pool)
    }

    #[test]
    fn constant_reveals_itself() {
        let mut engine = ClearEngine::new();
        let h = engine.constant(123u64);
        assert_eq!(engine.reveal(h).unwrap(), 123);
    }

    #[test]
    fn ingest_reveals_sealed_value() {
        let mut engine = ClearEngine::new();
        let caller = Principal::random();
        let pool = Principal::random();
        let (input, proof) = seal_one(5000, caller, pool);
        let h: CtHandle<u64> = engine.ingest(&input, 0, &proof, caller, pool).unwrap();
        assert_eq!(engine.reveal(h).unwrap(), 5000);
    }

    #[test]
    fn ingest_rejects_bad_binding_without_allocating() {
        let mut engine = ClearEngine::new();
        let caller = Principal::random();
        let pool = Principal::random();
        let (input, proof) = seal_one(5000, caller, pool);

        let err = engine
            .ingest::<u64>(&input, 0, &proof, Principal::random(), pool)
            .unwrap_err();
        assert!(matches!(err, DarkbookError::ProofInvalid { .. }));
        assert_eq!(engine.ciphertext_count(), 0);
    }

    #[test]
    fn add_and_sub() {
        let mut engine = ClearEngine::new();
        let a = engine.constant(3000u64);
        let b = engine.constant(2000u64);
        let sum = engine.add(a, b).unwrap();
        let diff = engine.sub(sum, a).unwrap();
        assert_eq!(engine.reveal(sum).unwrap(), 5000);
        assert_eq!(engine.reveal(diff).unwrap(), 2000);
    }

    #[test]
    fn arithmetic_wraps_at_width() {
        let mut engine = ClearEngine::new();
        let max = engine.constant(u32::MAX);
        let one = engine.constant(1u32);
        let wrapped = engine.add(max, one).unwrap();
        assert_eq!(engine.reveal(wrapped).unwrap(), 0u32);

        let zero = engine.constant(0u32);
        let under = engine.sub(zero, one).unwrap();
        assert_eq!(engine.reveal(under).unwrap(), u32::MAX);
    }

    #[test]
    fn comparisons() {
        let mut engine = ClearEngine::new();
        let lo = engine.constant(45u32);
        let hi = engine.constant(50u32);

        let le = engine.le(lo, hi).unwrap();
        let ge = engine.ge(lo, hi).unwrap();
        let eq = engine.eq(lo, lo).unwrap();
        assert!(engine.reveal(le).unwrap());
        assert!(!engine.reveal(ge).unwrap());
        assert!(engine.reveal(eq).unwrap());
    }

    #[test]
    fn boolean_algebra() {
        let mut engine = ClearEngine::new();
        let t = engine.constant(true);
        let f = engine.constant(false);

        let and = engine.and(t, f).unwrap();
        let or = engine.or(t, f).unwrap();
        let not = engine.not(f).unwrap();
        assert!(!engine.reveal(and).unwrap());
        assert!(engine.reveal(or).unwrap());
        assert!(engine.reveal(not).unwrap());
    }

    #[test]
    fn select_is_branchless_conditional() {
        let mut engine = ClearEngine::new();
        let t = engine.constant(true);
        let f = engine.constant(false);
        let a = engine.constant(2000u64);
        let zero = engine.constant(0u64);

        let picked = engine.select(t, a, zero).unwrap();
        assert_eq!(engine.reveal(picked).unwrap(), 2000);
        let picked = engine.select(f, a, zero).unwrap();
        assert_eq!(engine.reveal(picked).unwrap(), 0);
    }

    #[test]
    fn every_result_is_a_fresh_handle() {
        let mut engine = ClearEngine::new();
        let a = engine.constant(1u64);
        let b = engine.constant(2u64);
        let sum = engine.add(a, b).unwrap();
        assert_ne!(sum.raw(), a.raw());
        assert_ne!(sum.raw(), b.raw());
        // operands untouched
        assert_eq!(engine.reveal(a).unwrap(), 1);
        assert_eq!(engine.reveal(b).unwrap(), 2);
    }

    #[test]
    fn null_handle_is_unknown() {
        let engine = ClearEngine::new();
        let err = engine.reveal(CtHandle::<u64>::null()).unwrap_err();
        assert!(matches!(err, DarkbookError::UnknownHandle(h) if h.is_null()));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut engine = ClearEngine::new();
        let h = engine.constant(1u32);
        // Same raw id, reinterpreted as a u64 handle.
        let alias = CtHandle::<u64>::from_raw(h.raw());
        let err = engine.reveal(alias).unwrap_err();
        assert!(matches!(
            err,
            DarkbookError::CiphertextTypeMismatch {
                expected: CtKind::Uint64,
                actual: CtKind::Uint32,
            }
        ));
    }
}
