//! Transaction input referencing a previous output.
//!
//! Carries the outpoint being spent, the unlocking script and sequence,
//! plus the address recovered from the unlocking script when it follows
//! the usual `<sig> <pubkey>` shape.

use bch_primitives::chainhash::Hash;
use bch_primitives::util::{VarInt, WireReader, WireWriter};
use bch_script::{CashAddress, Script};

use crate::DecodeError;

/// Default sequence number indicating a finalized input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single input in a Bitcoin Cash transaction.
///
/// # Wire format
///
/// | Field            | Size          |
/// |------------------|---------------|
/// | prev_hash        | 32 bytes      |
/// | prev_index       | 4 bytes (LE)  |
/// | script length    | VarInt        |
/// | unlocking_script | variable      |
/// | sequence         | 4 bytes (LE)  |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// Hash of the transaction holding the spent output, internal byte order.
    pub prev_hash: Hash,

    /// Index of the spent output within that transaction.
    pub prev_index: u32,

    /// The unlocking script. Empty until the input is signed.
    pub unlocking_script: Script,

    pub sequence: u32,

    /// Address of the public key pushed by the unlocking script, if any.
    /// Not serialized.
    pub address: Option<CashAddress>,
}

impl TxInput {
    /// Create an unsigned input spending `prev_hash:prev_index`.
    pub fn new(prev_hash: Hash, prev_index: u32) -> Self {
        TxInput {
            prev_hash,
            prev_index,
            unlocking_script: Script::new(),
            sequence: DEFAULT_SEQUENCE_NUMBER,
            address: None,
        }
    }

    /// Deserialize an input, deriving its address under `prefix`.
    pub fn read_from(reader: &mut WireReader, prefix: &str) -> Result<Self, DecodeError> {
        let prev_hash = reader.read_hash()?;
        let prev_index = reader.read_u32_le()?;
        let unlocking_script = Script::from_bytes(reader.read_var_bytes()?);
        let sequence = reader.read_u32_le()?;

        let address = address_from_unlocking_script(&unlocking_script, prefix);

        Ok(TxInput {
            prev_hash,
            prev_index,
            unlocking_script,
            sequence,
            address,
        })
    }

    /// Serialize this input into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_hash(&self.prev_hash);
        writer.write_u32_le(self.prev_index);
        let script_bytes = self.unlocking_script.to_bytes();
        writer.write_varint(VarInt::from(script_bytes.len()));
        writer.write_bytes(script_bytes);
        writer.write_u32_le(self.sequence);
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        let script_len = self.unlocking_script.len();
        32 + 4 + VarInt::from(script_len).length() + script_len + 4
    }
}

/// Address of the public key in a `<sig> <pubkey>` unlocking script.
///
/// The second data push is taken as the public key and hashed into a
/// P2PKH cashaddr. Scripts of any other shape yield `None`.
pub fn address_from_unlocking_script(script: &Script, prefix: &str) -> Option<CashAddress> {
    if script.is_empty() {
        return None;
    }
    let chunks = match script.chunks() {
        Ok(chunks) => chunks,
        Err(e) => {
            log::debug!("unlocking script does not parse: {}", e);
            return None;
        }
    };
    let pub_key = chunks.iter().filter_map(|c| c.data.as_deref()).nth(1)?;
    if pub_key.is_empty() {
        return None;
    }
    Some(CashAddress::from_public_key_bytes(prefix, pub_key))
}
