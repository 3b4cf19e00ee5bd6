//! External ciphertext ingestion: the verified-conversion boundary.
//!
//! Clients encrypt values off-pool and submit them as an [`EncryptedInput`]
//! (one or more masked 64-bit words under a shared nonce) together with a
//! single [`InputProof`]. The proof binds the payload words, the nonce, the
//! submitting caller, and the pool identity; ingestion recomputes it and
//! rejects any mismatch before a single word is unmasked. One proof covers
//! every slot of the input, so a multi-value submission (amount, price,
//! direction) rides one attestation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use darkbook_types::{DarkbookError, Principal, Result};

const PROOF_DOMAIN: &[u8] = b"darkbook:input-proof:v1:";
const MASK_DOMAIN: &[u8] = b"darkbook:input-mask:v1:";

/// One or more externally encrypted 64-bit words.
///
/// Words are stored masked; the mask keystream is derived from the nonce,
/// the slot index, and the (caller, pool) binding, so a payload lifted out
/// of one submission is useless in another context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    words: Vec<u64>,
    nonce: [u8; 32],
}

/// Proof that an [`EncryptedInput`] was correctly formed for a specific
/// caller/pool pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputProof([u8; 32]);

impl EncryptedInput {
    /// Client-side: mask `values` under `nonce` for the given caller/pool
    /// binding and produce the matching proof.
    #[must_use]
    pub fn seal(
        values: &[u64],
        nonce: [u8; 32],
        caller: Principal,
        pool: Principal,
    ) -> (Self, InputProof) {
        let words = values
            .iter()
            .enumerate()
            .map(|(slot, value)| value ^ mask_word(&nonce, slot, caller, pool))
            .collect();
        let input = Self { words, nonce };
        let proof = input.prove(caller, pool);
        (input, proof)
    }

    /// Number of value slots carried by this input.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.words.len()
    }

    /// Verify the binding proof. Must pass before any slot is unmasked.
    pub fn verify(&self, proof: &InputProof, caller: Principal, pool: Principal) -> Result<()> {
        let expected = self.prove(caller, pool);
        if expected == *proof {
            Ok(())
        } else {
            Err(DarkbookError::ProofInvalid {
                reason: format!("binding mismatch for caller {caller}"),
            })
        }
    }

    /// Unmask one slot. Callers must have verified the proof first.
    pub fn unmask(&self, slot: usize, caller: Principal, pool: Principal) -> Result<u64> {
        let word = self
            .words
            .get(slot)
            .ok_or_else(|| DarkbookError::ProofInvalid {
                reason: format!("input has {} slots, slot {slot} requested", self.words.len()),
            })?;
        Ok(word ^ mask_word(&self.nonce, slot, caller, pool))
    }

    fn prove(&self, caller: Principal, pool: Principal) -> InputProof {
        let mut hasher = Sha256::new();
        hasher.update(PROOF_DOMAIN);
        hasher.update(self.nonce);
        hasher.update(caller.as_bytes());
        hasher.update(pool.as_bytes());
        for word in &self.words {
            hasher.update(word.to_le_bytes());
        }
        InputProof(hasher.finalize().into())
    }
}

/// Keystream word for one slot of one submission.
fn mask_word(nonce: &[u8; 32], slot: usize, caller: Principal, pool: Principal) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(MASK_DOMAIN);
    hasher.update(nonce);
    hasher.update((slot as u64).to_le_bytes());
    hasher.update(caller.as_bytes());
    hasher.update(pool.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nonce() -> [u8; 32] {
        let mut n = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut n[..]);
        n
    }

    #[test]
    fn seal_verify_unmask_roundtrip() {
        let caller = Principal::random();
        let pool = Principal::random();
        let (input, proof) = EncryptedInput::seal(&[5000, 42, 1], nonce(), caller, pool);

        input.verify(&proof, caller, pool).unwrap();
        assert_eq!(input.slots(), 3);
        assert_eq!(input.unmask(0, caller, pool).unwrap(), 5000);
        assert_eq!(input.unmask(1, caller, pool).unwrap(), 42);
        assert_eq!(input.unmask(2, caller, pool).unwrap(), 1);
    }

    #[test]
    fn masked_words_differ_from_values() {
        let caller = Principal::random();
        let pool = Principal::random();
        let (input, _) = EncryptedInput::seal(&[5000], nonce(), caller, pool);
        assert_ne!(input.words[0], 5000);
    }

    #[test]
    fn wrong_caller_fails_verification() {
        let caller = Principal::random();
        let pool = Principal::random();
        let (input, proof) = EncryptedInput::seal(&[100], nonce(), caller, pool);

        let err = input
            .verify(&proof, Principal::random(), pool)
            .unwrap_err();
        assert!(matches!(err, DarkbookError::ProofInvalid { .. }));
    }

    #[test]
    fn wrong_pool_fails_verification() {
        let caller = Principal::random();
        let pool = Principal::random();
        let (input, proof) = EncryptedInput::seal(&[100], nonce(), caller, pool);

        let err = input
            .verify(&proof, caller, Principal::random())
            .unwrap_err();
        assert!(matches!(err, DarkbookError::ProofInvalid { .. }));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let caller = Principal::random();
        let pool = Principal::random();
        let (mut input, proof) = EncryptedInput::seal(&[100], nonce(), caller, pool);
        input.words[0] ^= 1;

        let err = input.verify(&proof, caller, pool).unwrap_err();
        assert!(matches!(err, DarkbookError::ProofInvalid { .. }));
    }

    #[test]
    fn out_of_range_slot_fails() {
        let caller = Principal::random();
        let pool = Principal::random();
        let (input, _) = EncryptedInput::seal(&[100], nonce(), caller, pool);

        let err = input.unmask(1, caller, pool).unwrap_err();
        assert!(matches!(err, DarkbookError::ProofInvalid { .. }));
    }

    #[test]
    fn input_serde_roundtrip() {
        let caller = Principal::random();
        let pool = Principal::random();
        let (input, proof) = EncryptedInput::seal(&[1, 2], nonce(), caller, pool);

        let json = serde_json::to_string(&input).unwrap();
        let back: EncryptedInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, back);
        back.verify(&proof, caller, pool).unwrap();
    }
}
