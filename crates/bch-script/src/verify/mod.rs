//! Spend verification.
//!
//! Script execution is consumed through the [`ScriptExecutor`] trait so a
//! full interpreter can be plugged in. The crate ships [`StandardExecutor`],
//! which verifies the two single-signature standard spends (P2PKH and P2PK)
//! and reports every other script class as unsupported.
//!
//! # Architecture
//!
//! This crate does not depend on the wire crate. Callers provide a
//! [`TxContext`] that exposes the spending transaction's unlocking scripts
//! and computes signature hashes.

pub mod flags;

pub use flags::VerifyFlags;

use bch_primitives::ec::{PublicKey, Signature};
use bch_primitives::hash::hash160;

use crate::class::{classify, ScriptClass};
use crate::Script;

/// Sighash bit that marks a replay-protected (FORKID) signature.
const SIGHASH_FORKID_BIT: u32 = 0x40;

/// Sighash bit for ANYONECANPAY.
const SIGHASH_ANYONECANPAY_BIT: u32 = 0x80;

/// Why a single input failed verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("input {0} does not exist")]
    MissingInput(usize),

    #[error("unlocking script is not push-only")]
    NotPushOnly,

    #[error("malformed unlocking script: {0}")]
    MalformedUnlockingScript(String),

    #[error("script class {0} is not supported by this executor")]
    Unsupported(ScriptClass),

    #[error("public key does not hash to the locked hash")]
    PubKeyHashMismatch,

    #[error("signature lacks the FORKID sighash bit")]
    MissingForkId,

    #[error("invalid sighash type {0:#x}")]
    InvalidSighashType(u32),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("signature hash: {0}")]
    SighashFailed(String),

    #[error("signature does not verify")]
    CheckSigFailed,
}

/// Transaction data an executor needs to check a signature.
pub trait TxContext {
    /// The unlocking script of input `input_idx`, if it exists.
    fn unlocking_script(&self, input_idx: usize) -> Option<&Script>;

    /// Signature hash of input `input_idx`.
    ///
    /// `sub_script` is the locking script being satisfied, `value` the
    /// amount of the spent output and `sighash_type` the flag byte taken
    /// from the end of the signature.
    fn signature_hash(
        &self,
        input_idx: usize,
        sub_script: &Script,
        value: u64,
        sighash_type: u32,
    ) -> Result<[u8; 32], VerifyError>;
}

/// Executes one input's spending condition.
pub trait ScriptExecutor {
    /// Run `locking` against input `input_idx` of `tx`.
    ///
    /// # Returns
    /// `Ok(())` when the input's unlocking script satisfies `locking`.
    fn execute(
        &self,
        locking: &Script,
        tx: &dyn TxContext,
        input_idx: usize,
        value: u64,
        flags: VerifyFlags,
    ) -> Result<(), VerifyError>;
}

/// Verifier for P2PKH and P2PK spends.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardExecutor;

impl StandardExecutor {
    pub fn new() -> Self {
        StandardExecutor
    }

    fn check_sig(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        locking: &Script,
        tx: &dyn TxContext,
        input_idx: usize,
        value: u64,
        flags: VerifyFlags,
    ) -> Result<(), VerifyError> {
        let (&flag_byte, der) = full_sig
            .split_last()
            .ok_or_else(|| VerifyError::InvalidSignature("empty signature".to_string()))?;
        let sighash_type = flag_byte as u32;

        if flags.has_flag(VerifyFlags::STRICT_ENCODING) {
            let base = sighash_type & !(SIGHASH_FORKID_BIT | SIGHASH_ANYONECANPAY_BIT);
            if !(1..=3).contains(&base) {
                return Err(VerifyError::InvalidSighashType(sighash_type));
            }
        }
        if flags.has_flag(VerifyFlags::ENABLE_SIGHASH_FORKID)
            && sighash_type & SIGHASH_FORKID_BIT == 0
        {
            return Err(VerifyError::MissingForkId);
        }

        let sig = Signature::from_der(der).map_err(|e| VerifyError::InvalidSignature(e.to_string()))?;
        let key = PublicKey::from_bytes(pub_key).map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))?;
        let digest = tx.signature_hash(input_idx, locking, value, sighash_type)?;

        if sig.verify(&digest, &key) {
            Ok(())
        } else {
            Err(VerifyError::CheckSigFailed)
        }
    }
}

impl ScriptExecutor for StandardExecutor {
    fn execute(
        &self,
        locking: &Script,
        tx: &dyn TxContext,
        input_idx: usize,
        value: u64,
        flags: VerifyFlags,
    ) -> Result<(), VerifyError> {
        let unlocking = tx
            .unlocking_script(input_idx)
            .ok_or(VerifyError::MissingInput(input_idx))?;
        let chunks = unlocking
            .chunks()
            .map_err(|e| VerifyError::MalformedUnlockingScript(e.to_string()))?;
        if flags.has_flag(VerifyFlags::SIG_PUSH_ONLY) && !chunks.iter().all(|c| c.is_push()) {
            return Err(VerifyError::NotPushOnly);
        }
        let pushes: Vec<&[u8]> = chunks.iter().map(|c| c.data.as_deref().unwrap_or(&[])).collect();

        match classify(locking) {
            ScriptClass::PubKeyHash => {
                let &[sig, pub_key] = pushes.as_slice() else {
                    return Err(VerifyError::MalformedUnlockingScript(format!(
                        "expected 2 pushes, got {}",
                        pushes.len()
                    )));
                };
                if hash160(pub_key)[..] != locking.to_bytes()[3..23] {
                    return Err(VerifyError::PubKeyHashMismatch);
                }
                self.check_sig(sig, pub_key, locking, tx, input_idx, value, flags)
            }
            ScriptClass::PubKey => {
                let &[sig] = pushes.as_slice() else {
                    return Err(VerifyError::MalformedUnlockingScript(format!(
                        "expected 1 push, got {}",
                        pushes.len()
                    )));
                };
                let key_len = locking.len() - 2;
                let pub_key = &locking.to_bytes()[1..1 + key_len];
                self.check_sig(sig, pub_key, locking, tx, input_idx, value, flags)
            }
            other => Err(VerifyError::Unsupported(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bch_primitives::ec::PrivateKey;
    use bch_primitives::hash::sha256d;

    /// A one-input context whose sighash commits to the sub script,
    /// value and flag so tampering with any of them is detectable.
    struct FakeTx {
        unlocking: Script,
    }

    impl TxContext for FakeTx {
        fn unlocking_script(&self, input_idx: usize) -> Option<&Script> {
            (input_idx == 0).then_some(&self.unlocking)
        }

        fn signature_hash(
            &self,
            _input_idx: usize,
            sub_script: &Script,
            value: u64,
            sighash_type: u32,
        ) -> Result<[u8; 32], VerifyError> {
            let mut preimage = sub_script.to_bytes().to_vec();
            preimage.extend_from_slice(&value.to_le_bytes());
            preimage.extend_from_slice(&sighash_type.to_le_bytes());
            Ok(sha256d(&preimage))
        }
    }

    fn key() -> PrivateKey {
        PrivateKey::from_hex("c0ffee0000000000000000000000000000000000000000000000000000000001").unwrap()
    }

    fn signed(locking: &Script, value: u64, flag: u8, with_pubkey: bool) -> FakeTx {
        let probe = FakeTx { unlocking: Script::new() };
        let digest = probe.signature_hash(0, locking, value, flag as u32).unwrap();
        let mut sig = key().sign(&digest).unwrap().to_der();
        sig.push(flag);
        let mut unlocking = Script::new();
        unlocking.append_push_data(&sig).unwrap();
        if with_pubkey {
            unlocking.append_push_data(&key().pub_key().to_compressed()).unwrap();
        }
        FakeTx { unlocking }
    }

    #[test]
    fn test_p2pkh_spend_verifies() {
        let locking = Script::p2pkh_lock(&key().pub_key().hash160());
        let tx = signed(&locking, 5000, 0x41, true);
        StandardExecutor::new()
            .execute(&locking, &tx, 0, 5000, VerifyFlags::STANDARD)
            .unwrap();
    }

    #[test]
    fn test_p2pkh_wrong_value_fails() {
        let locking = Script::p2pkh_lock(&key().pub_key().hash160());
        let tx = signed(&locking, 5000, 0x41, true);
        assert_eq!(
            StandardExecutor::new().execute(&locking, &tx, 0, 5001, VerifyFlags::STANDARD),
            Err(VerifyError::CheckSigFailed)
        );
    }

    #[test]
    fn test_p2pkh_wrong_key_fails() {
        let locking = Script::p2pkh_lock(&[0u8; 20]);
        let tx = signed(&locking, 1, 0x41, true);
        assert_eq!(
            StandardExecutor::new().execute(&locking, &tx, 0, 1, VerifyFlags::STANDARD),
            Err(VerifyError::PubKeyHashMismatch)
        );
    }

    #[test]
    fn test_missing_forkid_rejected() {
        let locking = Script::p2pkh_lock(&key().pub_key().hash160());
        let tx = signed(&locking, 1, 0x01, true);
        assert_eq!(
            StandardExecutor::new().execute(&locking, &tx, 0, 1, VerifyFlags::STANDARD),
            Err(VerifyError::MissingForkId)
        );
        // Without the fork flag the legacy sighash byte is acceptable.
        StandardExecutor::new()
            .execute(&locking, &tx, 0, 1, VerifyFlags::STRICT_ENCODING)
            .unwrap();
    }

    #[test]
    fn test_p2pk_spend_verifies() {
        let mut locking = Script::new();
        locking.append_push_data(&key().pub_key().to_compressed()).unwrap();
        locking.append_opcodes(&[crate::opcodes::OP_CHECKSIG]).unwrap();
        let tx = signed(&locking, 7, 0x41, false);
        StandardExecutor::new()
            .execute(&locking, &tx, 0, 7, VerifyFlags::STANDARD)
            .unwrap();
    }

    #[test]
    fn test_unsupported_and_missing_input() {
        let locking = Script::from_hex("a9149a1c78a507689f6f54b847ad1cef1e614ee23f1e87").unwrap();
        let tx = FakeTx { unlocking: Script::new() };
        assert_eq!(
            StandardExecutor::new().execute(&locking, &tx, 0, 0, VerifyFlags::STANDARD),
            Err(VerifyError::Unsupported(ScriptClass::ScriptHash))
        );
        assert_eq!(
            StandardExecutor::new().execute(&locking, &tx, 3, 0, VerifyFlags::STANDARD),
            Err(VerifyError::MissingInput(3))
        );
    }

    #[test]
    fn test_non_push_unlocking_rejected() {
        let locking = Script::p2pkh_lock(&key().pub_key().hash160());
        let tx = FakeTx {
            unlocking: Script::from_hex("76").unwrap(),
        };
        assert_eq!(
            StandardExecutor::new().execute(&locking, &tx, 0, 0, VerifyFlags::STANDARD),
            Err(VerifyError::NotPushOnly)
        );
    }
}
