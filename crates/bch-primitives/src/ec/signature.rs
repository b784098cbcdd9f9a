//! ECDSA signatures in the DER form scripts carry.
//!
//! Signing uses RFC6979 deterministic nonces and always yields low-S
//! signatures, which is what standard-policy verification requires.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// An ECDSA signature over secp256k1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: ecdsa::Signature,
}

impl Signature {
    /// Sign a 32-byte digest.
    ///
    /// # Arguments
    /// * `hash` - The digest to sign; must be exactly 32 bytes.
    /// * `priv_key` - The signing key.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        if hash.len() != 32 {
            return Err(PrimitivesError::InvalidSignature(format!(
                "digest must be 32 bytes, got {}",
                hash.len()
            )));
        }
        let inner: ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner })
    }

    /// Parse a strict DER signature (without a trailing sighash byte).
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = ecdsa::Signature::from_der(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner })
    }

    pub fn to_der(&self) -> Vec<u8> {
        self.inner.to_der().as_bytes().to_vec()
    }

    /// Verify against a 32-byte digest. High-S signatures are rejected.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        pub_key.verifying_key().verify_prehash(hash, &self.inner).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256d;

    fn key() -> PrivateKey {
        PrivateKey::from_hex("0000000000000000000000000000000000000000000000000000000000000001").unwrap()
    }

    #[test]
    fn test_der_roundtrip() {
        let digest = sha256d(b"der");
        let sig = key().sign(&digest).unwrap();
        let der = sig.to_der();
        assert_eq!(der[0], 0x30);
        assert_eq!(der[1] as usize, der.len() - 2);
        assert_eq!(Signature::from_der(&der).unwrap(), sig);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let digest = sha256d(b"rfc6979");
        assert_eq!(key().sign(&digest).unwrap(), key().sign(&digest).unwrap());
    }

    #[test]
    fn test_verify_wrong_digest_fails() {
        let sig = key().sign(&sha256d(b"a")).unwrap();
        assert!(!sig.verify(&sha256d(b"b"), &key().pub_key()));
    }

    #[test]
    fn test_sign_rejects_short_digest() {
        assert!(key().sign(&[0u8; 10]).is_err());
    }

    #[test]
    fn test_from_der_rejects_garbage() {
        assert!(Signature::from_der(&[0x30, 0x02, 0x01]).is_err());
    }
}
