//! The 32-byte chain hash.
//!
//! Raw bytes are kept in network (internal) order for storage, comparison
//! and hashing. Only the text and JSON forms reverse them, so block and
//! transaction ids print the way explorers show them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// Maximum hex string length for a Hash.
pub const MAX_HASH_STRING_SIZE: usize = HASH_SIZE * 2;

/// A 32-byte block, transaction or token-category hash.
///
/// The all-zero value is the empty sentinel ([`Hash::EMPTY`]) used as a
/// default stop hash and as a "no previous output" marker.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// The all-zero hash.
    pub const EMPTY: Hash = Hash([0u8; HASH_SIZE]);

    /// Wrap 32 bytes given in internal order.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a slice in internal order.
    ///
    /// # Returns
    /// `Ok(Hash)` if the slice is exactly 32 bytes, `InvalidHash` otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            ))
        })?;
        Ok(Hash(arr))
    }

    /// Parse display-order hex into a Hash.
    ///
    /// Short strings are zero-extended on the most significant (display
    /// left) side; an empty string yields [`Hash::EMPTY`].
    ///
    /// # Arguments
    /// * `hex_str` - Up to 64 hex characters in display order.
    ///
    /// # Returns
    /// `Ok(Hash)` on success, or an error for over-long or non-hex input.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() > MAX_HASH_STRING_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "max hash string length is {} characters",
                MAX_HASH_STRING_SIZE
            )));
        }
        let padded = if hex_str.len() % 2 != 0 {
            format!("0{}", hex_str)
        } else {
            hex_str.to_string()
        };
        let decoded = hex::decode(&padded)?;
        let mut display = [0u8; HASH_SIZE];
        display[HASH_SIZE - decoded.len()..].copy_from_slice(&decoded);
        Ok(Hash(display).reverse())
    }

    /// Return the byte-reversed hash.
    ///
    /// Only the display and serialization boundary reverses; comparisons
    /// always work on raw bytes.
    pub fn reverse(&self) -> Hash {
        let mut out = self.0;
        out.reverse();
        Hash(out)
    }

    /// True iff every byte is zero.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The raw bytes in internal order.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// The raw bytes in internal order, by value.
    pub fn to_bytes(self) -> [u8; HASH_SIZE] {
        self.0
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Display order is the reverse of the internal bytes.
impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.reverse().0))
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Double SHA-256 of `data` as a Hash.
pub fn double_hash_h(data: &[u8]) -> Hash {
    Hash(sha256d(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Genesis block hash bytes in internal order.
    const MAIN_NET_GENESIS_HASH: Hash = Hash([
        0x6f, 0xe2, 0x8c, 0x0a, 0xb6, 0xf1, 0xb3, 0x72,
        0xc1, 0xa6, 0xa2, 0x46, 0xae, 0x63, 0xf7, 0x4f,
        0x93, 0x1e, 0x83, 0x65, 0xe1, 0x5a, 0x08, 0x9c,
        0x68, 0xd6, 0x19, 0x00, 0x00, 0x00, 0x00, 0x00,
    ]);

    #[test]
    fn test_display_is_reversed() {
        let hash = Hash::new([
            0x06, 0xe5, 0x33, 0xfd, 0x1a, 0xda, 0x86, 0x39,
            0x1f, 0x3f, 0x6c, 0x34, 0x32, 0x04, 0xb0, 0xd2,
            0x78, 0xd4, 0xaa, 0xec, 0x1c, 0x0b, 0x20, 0xaa,
            0x27, 0xba, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]);
        assert_eq!(
            hash.to_string(),
            "000000000003ba27aa200b1cecaad478d2b00432346c3f1f3986da1afd33e506"
        );
    }

    #[test]
    fn test_from_hex_genesis() {
        let parsed = Hash::from_hex(
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
        )
        .unwrap();
        assert_eq!(parsed, MAIN_NET_GENESIS_HASH);
        assert_eq!(parsed.to_string().parse::<Hash>().unwrap(), parsed);
    }

    #[test]
    fn test_from_hex_short_and_empty() {
        let short = Hash::from_hex("1").unwrap();
        assert_eq!(short.as_bytes()[0], 0x01);
        assert!(short.as_bytes()[1..].iter().all(|&b| b == 0));
        assert_eq!(Hash::from_hex("").unwrap(), Hash::EMPTY);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Hash::from_hex(&"0".repeat(65)).is_err());
        assert!(Hash::from_hex("zz").is_err());
        assert!(Hash::from_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_reverse_is_involution() {
        assert_eq!(MAIN_NET_GENESIS_HASH.reverse().reverse(), MAIN_NET_GENESIS_HASH);
        assert_ne!(MAIN_NET_GENESIS_HASH.reverse(), MAIN_NET_GENESIS_HASH);
    }

    #[test]
    fn test_is_empty() {
        assert!(Hash::EMPTY.is_empty());
        assert!(Hash::default().is_empty());
        assert!(!MAIN_NET_GENESIS_HASH.is_empty());
        let mut last = [0u8; HASH_SIZE];
        last[31] = 1;
        assert!(!Hash::new(last).is_empty());
    }

    #[test]
    fn test_serde_json_uses_display_order() {
        let json = serde_json::to_string(&MAIN_NET_GENESIS_HASH).unwrap();
        assert_eq!(
            json,
            "\"000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f\""
        );
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MAIN_NET_GENESIS_HASH);
    }

    #[test]
    fn test_double_hash_h() {
        assert_eq!(
            double_hash_h(b"").to_bytes()[..4],
            [0x5d, 0xf6, 0xe0, 0xe2]
        );
    }
}
