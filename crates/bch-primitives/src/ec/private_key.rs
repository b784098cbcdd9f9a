//! secp256k1 private key.
//!
//! Wraps a k256 signing key and adds the additive tweak used by BIP32
//! private child derivation.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar};
use rand::rngs::OsRng;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a random key from the OS RNG.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` for a scalar in `1..n`, `InvalidPrivateKey` otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_bytes(FieldBytes::from_slice(bytes))
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// The 32-byte big-endian scalar.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_BYTES_LEN] {
        self.inner.to_bytes().into()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest with an RFC6979 nonce.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// Return `self + tweak (mod n)`.
    ///
    /// # Arguments
    /// * `tweak` - A 32-byte big-endian scalar, e.g. the left half of a
    ///   BIP32 HMAC output.
    ///
    /// # Returns
    /// `InvalidPrivateKey` when the tweak is not below the curve order or
    /// the sum is zero. Both cases mean the child index is unusable.
    pub fn tweak_add(&self, tweak: &[u8; 32]) -> Result<PrivateKey, PrimitivesError> {
        let tweak = scalar_from_canonical_bytes(tweak)?;
        let sum = tweak + self.to_scalar();
        let inner = SigningKey::from_bytes(&sum.to_bytes())
            .map_err(|_| PrimitivesError::InvalidPrivateKey("tweaked key is zero".to_string()))?;
        Ok(PrivateKey { inner })
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        let mut bytes = self.inner.to_bytes();
        bytes.zeroize();
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

/// Parse a scalar without reducing it; values `>= n` are rejected.
pub(crate) fn scalar_from_canonical_bytes(bytes: &[u8; 32]) -> Result<Scalar, PrimitivesError> {
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*bytes))).ok_or_else(|| {
        PrimitivesError::InvalidPrivateKey("scalar is not below the curve order".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "eaf02ca348c524e6392655ba4d29603cd1a7347d9d65cfe93ce1ebffdca22694";

    #[test]
    fn test_from_bytes_roundtrip() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        assert_eq!(key.to_hex(), KEY_HEX);
        assert_eq!(PrivateKey::from_bytes(&key.to_bytes()).unwrap(), key);
    }

    #[test]
    fn test_from_bytes_rejects_bad_length_and_zero() {
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        let digest = crate::hash::sha256d(b"bunny");
        let sig = key.sign(&digest).unwrap();
        assert!(key.pub_key().verify(&digest, &sig));
    }

    #[test]
    fn test_tweak_add_matches_public_tweak() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        let tweak = crate::hash::sha256(b"tweak");
        let child = key.tweak_add(&tweak).unwrap();
        let child_pub = key.pub_key().tweak_add(&tweak).unwrap();
        assert_eq!(child.pub_key().to_compressed(), child_pub.to_compressed());
    }

    #[test]
    fn test_tweak_add_rejects_out_of_range() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        assert!(key.tweak_add(&[0xff; 32]).is_err());
    }
}
