/// Cashaddr address handling.
///
/// Renders a 20-byte hash under a network prefix as the bech32-style
/// `prefix:payload` text form, protected by the 40-bit polymod checksum,
/// and parses that form back.
use std::fmt;
use std::str::FromStr;

use bch_primitives::hash::hash160;

use crate::error::EncodingError;

/// The 32-character alphabet, indexed by 5-bit value.
pub const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Mainnet prefix.
pub const MAINNET_PREFIX: &str = "bitcoincash";

/// Testnet prefix.
pub const TESTNET_PREFIX: &str = "bchtest";

/// Number of 5-bit checksum groups.
const CHECKSUM_LEN: usize = 8;

/// Generator constants of the polymod, one per bit of the top 5 state bits.
const GENERATORS: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

/// What the 20-byte hash commits to. Encoded into the high bits of the
/// version byte; the size bits are always 0 for 160-bit hashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    PubKeyHash,
    ScriptHash,
}

impl AddressKind {
    fn version_byte(self) -> u8 {
        match self {
            AddressKind::PubKeyHash => 0x00,
            AddressKind::ScriptHash => 0x08,
        }
    }

    fn from_version_byte(version: u8) -> Result<Self, EncodingError> {
        match version {
            0x00 => Ok(AddressKind::PubKeyHash),
            0x08 => Ok(AddressKind::ScriptHash),
            other => Err(EncodingError::UnsupportedVersion(other)),
        }
    }
}

/// A decoded cashaddr: network prefix, kind and 20-byte hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CashAddress {
    pub prefix: String,
    pub kind: AddressKind,
    pub hash: [u8; 20],
}

impl CashAddress {
    /// A pay-to-public-key-hash address.
    pub fn p2pkh(prefix: &str, hash: [u8; 20]) -> Self {
        CashAddress {
            prefix: prefix.to_string(),
            kind: AddressKind::PubKeyHash,
            hash,
        }
    }

    /// A pay-to-script-hash address.
    pub fn p2sh(prefix: &str, hash: [u8; 20]) -> Self {
        CashAddress {
            prefix: prefix.to_string(),
            kind: AddressKind::ScriptHash,
            hash,
        }
    }

    /// The P2PKH address of a serialized public key.
    ///
    /// The bytes are hashed as given, so compressed and uncompressed forms
    /// of one key give different addresses.
    pub fn from_public_key_bytes(prefix: &str, pub_key: &[u8]) -> Self {
        Self::p2pkh(prefix, hash160(pub_key))
    }

    /// Render the text form.
    ///
    /// # Returns
    /// `prefix:payload` or an `EncodingError` on an internal invariant
    /// violation.
    pub fn encode(&self) -> Result<String, EncodingError> {
        encode_with_version(&self.prefix, self.kind.version_byte(), &self.hash)
    }

    /// Parse `prefix:payload` text, verifying the checksum.
    ///
    /// Upper-case input is accepted as long as it is not mixed case.
    pub fn decode(address: &str) -> Result<Self, EncodingError> {
        let has_lower = address.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = address.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            return Err(EncodingError::MixedCase);
        }
        let address = address.to_ascii_lowercase();
        let (prefix, payload) = address
            .rsplit_once(':')
            .ok_or(EncodingError::MissingPrefix)?;
        if prefix.is_empty() {
            return Err(EncodingError::MissingPrefix);
        }
        let values = to_5bit_groups(payload)?;
        if values.len() <= CHECKSUM_LEN {
            return Err(EncodingError::InvalidLength(values.len()));
        }
        if polymod(&checksum_input(prefix, &values)) != 0 {
            return Err(EncodingError::InvalidChecksum);
        }
        let data = convert_bits(&values[..values.len() - CHECKSUM_LEN], 5, 8, false)?;
        if data.len() != 21 {
            return Err(EncodingError::InvalidLength(data.len()));
        }
        let kind = AddressKind::from_version_byte(data[0])?;
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&data[1..]);
        Ok(CashAddress {
            prefix: prefix.to_string(),
            kind,
            hash,
        })
    }
}

impl fmt::Display for CashAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode() {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromStr for CashAddress {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CashAddress::decode(s)
    }
}

impl serde::Serialize for CashAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.encode().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> serde::Deserialize<'de> for CashAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CashAddress::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Encode a P2PKH hash under `prefix`.
///
/// Pure and deterministic: the same inputs always give the same string.
pub fn encode(prefix: &str, hash: &[u8; 20]) -> Result<String, EncodingError> {
    encode_with_version(prefix, AddressKind::PubKeyHash.version_byte(), hash)
}

fn encode_with_version(prefix: &str, version: u8, hash: &[u8]) -> Result<String, EncodingError> {
    let mut raw = Vec::with_capacity(hash.len() + 1);
    raw.push(version);
    raw.extend_from_slice(hash);
    let payload = convert_bits(&raw, 8, 5, true)?;

    let mut input = checksum_input(prefix, &payload);
    input.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let checksum = polymod(&input);

    let mut out = String::with_capacity(prefix.len() + 1 + payload.len() + CHECKSUM_LEN);
    out.push_str(prefix);
    out.push(':');
    for &v in &payload {
        out.push(to_char(v)?);
    }
    for i in 0..CHECKSUM_LEN {
        out.push(to_char(((checksum >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f) as u8)?);
    }
    Ok(out)
}

/// Prefix characters reduced to their low 5 bits, a 0 separator, then the
/// payload groups.
fn checksum_input(prefix: &str, payload: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(prefix.len() + 1 + payload.len() + CHECKSUM_LEN);
    input.extend(prefix.bytes().map(|b| b & 0x1f));
    input.push(0);
    input.extend_from_slice(payload);
    input
}

/// The cashaddr polymod over 5-bit values.
///
/// A 40-bit state is shifted left by five per value; the five bits shifted
/// out select which generator constants are XORed back in. The returned
/// value is the final state XOR 1, so a valid address sums to 0.
pub fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ d as u64;
        for (i, g) in GENERATORS.iter().enumerate() {
            if c0 & (1 << i) != 0 {
                c ^= g;
            }
        }
    }
    c ^ 1
}

fn to_char(value: u8) -> Result<char, EncodingError> {
    CHARSET
        .get(value as usize)
        .map(|&b| b as char)
        .ok_or(EncodingError::InvalidValue(value))
}

/// Map alphabet characters back to their 5-bit values.
pub fn to_5bit_groups(text: &str) -> Result<Vec<u8>, EncodingError> {
    text.chars()
        .map(|c| {
            CHARSET
                .iter()
                .position(|&b| b as char == c)
                .map(|p| p as u8)
                .ok_or(EncodingError::InvalidCharacter(c))
        })
        .collect()
}

/// Regroup a bit stream from `from`-bit to `to`-bit values.
///
/// With `pad`, leftover bits are zero-filled on the right into one final
/// group. Without it, leftovers must be fewer than `from` bits and all
/// zero.
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, EncodingError> {
    let max_value: u32 = (1 << to) - 1;
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for &value in data {
        if (value as u32) >> from != 0 {
            return Err(EncodingError::InvalidValue(value));
        }
        acc = (acc << from) | value as u32;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
        acc &= (1 << bits) - 1;
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || acc != 0 {
        return Err(EncodingError::InvalidPadding);
    }
    Ok(out)
}
