//! Block headers and the `headers` message.

use bch_primitives::chainhash::{double_hash_h, Hash};
use bch_primitives::util::{VarInt, WireReader, WireWriter};

use crate::DecodeError;

/// Serialized size of a block header.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Most headers a peer sends in one `headers` message.
pub const MAX_HEADERS_PER_MSG: usize = 2000;

/// Proof-of-work target in compact form, kept verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompactTarget {
    pub exponent: u8,
    pub significand: [u8; 3],
}

/// An 80-byte block header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: CompactTarget,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_i32_le(self.version);
        writer.write_hash(&self.prev_block);
        writer.write_hash(&self.merkle_root);
        writer.write_u32_le(self.timestamp);
        writer.write_u8(self.bits.exponent);
        writer.write_bytes(&self.bits.significand);
        writer.write_u32_le(self.nonce);
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(BLOCK_HEADER_SIZE);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn decode(reader: &mut WireReader) -> Result<Self, DecodeError> {
        Ok(BlockHeader {
            version: reader.read_i32_le()?,
            prev_block: reader.read_hash()?,
            merkle_root: reader.read_hash()?,
            timestamp: reader.read_u32_le()?,
            bits: CompactTarget {
                exponent: reader.read_u8()?,
                significand: reader.read_array()?,
            },
            nonce: reader.read_u32_le()?,
        })
    }

    /// Block hash: sha256d of the 80 serialized bytes.
    pub fn hash(&self) -> Hash {
        double_hash_h(&self.pack())
    }
}

/// A contiguous run of block headers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadersMsg {
    pub headers: Vec<BlockHeader>,
}

impl HeadersMsg {
    /// Each header is followed by a zero transaction count.
    pub fn pack(&self) -> Vec<u8> {
        let mut writer =
            WireWriter::with_capacity(9 + self.headers.len() * (BLOCK_HEADER_SIZE + 1));
        writer.write_varint(VarInt::from(self.headers.len()));
        for header in &self.headers {
            header.write_to(&mut writer);
            writer.write_u8(0x00);
        }
        writer.into_bytes()
    }

    /// Decode the headers, skipping the transaction count after each one.
    pub fn decode(reader: &mut WireReader) -> Result<Self, DecodeError> {
        let count = reader.read_varint()?.value();
        if count > (reader.remaining() / (BLOCK_HEADER_SIZE + 1)) as u64 {
            return Err(DecodeError::LengthMismatch {
                declared: count.saturating_mul((BLOCK_HEADER_SIZE + 1) as u64) as usize,
                actual: reader.remaining(),
            });
        }
        let mut headers = Vec::with_capacity(count as usize);
        for _ in 0..count {
            headers.push(BlockHeader::decode(reader)?);
            reader.read_varint()?;
        }
        Ok(HeadersMsg { headers })
    }
}
