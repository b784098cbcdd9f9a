//! Full blocks: a header followed by its transactions.

use bch_primitives::chainhash::Hash;
use bch_primitives::util::{VarInt, WireReader, WireWriter};
use bch_script::address::MAINNET_PREFIX;

use crate::headers::BlockHeader;
use crate::transaction::Tx;
use crate::DecodeError;

/// Smallest possible serialized transaction: version, two empty counts
/// and lock time.
const MIN_TX_SIZE: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockMsg {
    pub header: BlockHeader,
    pub transactions: Vec<Tx>,
}

impl BlockMsg {
    pub fn pack(&self) -> Vec<u8> {
        let mut writer = WireWriter::new();
        self.header.write_to(&mut writer);
        writer.write_varint(VarInt::from(self.transactions.len()));
        for tx in &self.transactions {
            tx.write_to(&mut writer);
        }
        writer.into_bytes()
    }

    pub fn decode(reader: &mut WireReader) -> Result<Self, DecodeError> {
        Self::decode_with_prefix(reader, MAINNET_PREFIX)
    }

    /// Decode a block, deriving transaction addresses under `prefix`.
    pub fn decode_with_prefix(reader: &mut WireReader, prefix: &str) -> Result<Self, DecodeError> {
        let header = BlockHeader::decode(reader)?;
        let count = reader.read_varint()?.value();
        if count > (reader.remaining() / MIN_TX_SIZE) as u64 {
            return Err(DecodeError::MalformedVarInt(format!(
                "{} transactions cannot fit in {} bytes",
                count,
                reader.remaining()
            )));
        }
        let mut transactions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            transactions.push(Tx::decode_with_prefix(reader, prefix)?);
        }
        Ok(BlockMsg {
            header,
            transactions,
        })
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }
}
