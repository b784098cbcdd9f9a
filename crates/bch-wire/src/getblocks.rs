//! Block locator requests: `getblocks` and `getheaders`.
//!
//! Both commands share one payload: the protocol version, the locator
//! hashes (newest first), and a stop hash. An empty stop hash asks for as
//! many entries as the peer will send.

use bch_primitives::chainhash::Hash;
use bch_primitives::util::{VarInt, WireReader, WireWriter};

use crate::message::PROTOCOL_VERSION;
use crate::DecodeError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetBlocksMsg {
    pub protocol_version: u32,
    pub locator: Vec<Hash>,
    pub stop_hash: Hash,
}

impl GetBlocksMsg {
    /// An empty locator at the current protocol version.
    pub fn new() -> Self {
        GetBlocksMsg {
            protocol_version: PROTOCOL_VERSION,
            locator: Vec::new(),
            stop_hash: Hash::EMPTY,
        }
    }

    pub fn add_block(&mut self, hash: Hash) {
        self.locator.push(hash);
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(4 + 9 + 32 * (self.locator.len() + 1));
        writer.write_u32_le(self.protocol_version);
        writer.write_varint(VarInt::from(self.locator.len()));
        for hash in &self.locator {
            writer.write_hash(hash);
        }
        writer.write_hash(&self.stop_hash);
        writer.into_bytes()
    }

    pub fn decode(reader: &mut WireReader) -> Result<Self, DecodeError> {
        let protocol_version = reader.read_u32_le()?;
        let count = reader.read_varint()?.value();
        // the stop hash follows the locator
        if count > (reader.remaining() / 32).saturating_sub(1) as u64 {
            return Err(DecodeError::LengthMismatch {
                declared: count.saturating_add(1).saturating_mul(32) as usize,
                actual: reader.remaining(),
            });
        }
        let mut locator = Vec::with_capacity(count as usize);
        for _ in 0..count {
            locator.push(reader.read_hash()?);
        }
        let stop_hash = reader.read_hash()?;
        Ok(GetBlocksMsg {
            protocol_version,
            locator,
            stop_hash,
        })
    }
}

impl Default for GetBlocksMsg {
    fn default() -> Self {
        Self::new()
    }
}
