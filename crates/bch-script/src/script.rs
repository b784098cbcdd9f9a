/// Script type - a sequence of opcodes and data pushes.
///
/// Locking scripts sit in outputs and unlocking scripts in inputs. The
/// `Script` newtype owns the raw bytes and offers shape predicates used by
/// the classifier, plus builders for the standard P2PKH forms.
use std::fmt;

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex string.
    ///
    /// # Returns
    /// The decoded script, or `InvalidHex`.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Build `OP_DUP OP_HASH160 <pkh> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn p2pkh_lock(pub_key_hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(25);
        b.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(pub_key_hash);
        b.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(b)
    }

    /// Build `OP_HASH160 <script hash> OP_EQUAL`.
    pub fn p2sh_lock(script_hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(23);
        b.extend_from_slice(&[OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(script_hash);
        b.push(OP_EQUAL);
        Script(b)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Space-separated ASM; empty for empty or malformed scripts.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Shape predicates
    // -----------------------------------------------------------------------

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// `<33 or 65 byte pubkey> OP_CHECKSIG`
    pub fn is_p2pk(&self) -> bool {
        let b = &self.0;
        match b.len() {
            35 => b[0] == OP_DATA_33 && (b[1] == 0x02 || b[1] == 0x03) && b[34] == OP_CHECKSIG,
            67 => b[0] == OP_DATA_65 && b[1] == 0x04 && b[66] == OP_CHECKSIG,
            _ => false,
        }
    }

    /// `OP_HASH160 <20 bytes> OP_EQUAL`
    pub fn is_p2sh(&self) -> bool {
        let b = &self.0;
        b.len() == 23 && b[0] == OP_HASH160 && b[1] == OP_DATA_20 && b[22] == OP_EQUAL
    }

    /// `OP_RETURN` followed only by pushes.
    pub fn is_null_data(&self) -> bool {
        if self.0.first() != Some(&OP_RETURN) {
            return false;
        }
        match decode_script(&self.0[1..]) {
            Ok(chunks) => chunks.iter().all(|c| c.op <= OP_16 && c.op != OP_RESERVED),
            Err(_) => false,
        }
    }

    /// `OP_m <pubkey>... OP_n OP_CHECKMULTISIG` with `1 <= m <= n` and
    /// exactly `n` keys.
    pub fn is_multisig(&self) -> bool {
        let chunks = match self.chunks() {
            Ok(c) => c,
            Err(_) => return false,
        };
        if chunks.len() < 4 || chunks[chunks.len() - 1].op != OP_CHECKMULTISIG {
            return false;
        }
        let required = small_int_value(chunks[0].op);
        let total = small_int_value(chunks[chunks.len() - 2].op);
        let keys = &chunks[1..chunks.len() - 2];
        match (required, total) {
            (Some(m), Some(n)) => {
                m >= 1
                    && m <= n
                    && keys.len() == n
                    && keys
                        .iter()
                        .all(|k| matches!(k.data.as_ref().map(Vec::len), Some(33) | Some(65)))
            }
            _ => false,
        }
    }

    /// True when the script starts with the CashToken prefix marker.
    pub fn has_token_prefix(&self) -> bool {
        self.0.first() == Some(&PREFIX_TOKEN)
    }

    // -----------------------------------------------------------------------
    // Data extraction
    // -----------------------------------------------------------------------

    /// The 20-byte hash of a P2PKH locking script.
    ///
    /// # Returns
    /// The hash, `EmptyScript`, or `NotP2PKH` for any other shape.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if self.0.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_p2pkh() {
            return Err(ScriptError::NotP2PKH);
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.0[3..23]);
        Ok(out)
    }

    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Append `data` with the minimal push prefix.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append bare opcodes. Push opcodes are rejected; use
    /// [`Script::append_push_data`] for those.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        if let Some(&op) = opcodes
            .iter()
            .find(|&&op| (OP_DATA_1..=OP_PUSHDATA4).contains(&op))
        {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op)));
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
