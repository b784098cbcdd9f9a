//! CashToken output prefix.
//!
//! A token-carrying locking script starts with the `0xEF` marker, followed
//! by the 32-byte token category, a bitfield, and the optional NFT
//! commitment and fungible amount. Whatever follows the prefix is the
//! ordinary spending condition of the output.

use bch_primitives::chainhash::Hash;
use bch_primitives::util::{VarInt, WireReader, WireWriter};
use bch_script::opcodes::PREFIX_TOKEN;

use crate::DecodeError;

/// Bitfield flag: the prefix carries a fungible amount.
pub const HAS_AMOUNT: u8 = 0x10;

/// Bitfield flag: the prefix carries a non-fungible token.
pub const HAS_NFT: u8 = 0x20;

/// Bitfield flag: the NFT carries a commitment.
pub const HAS_COMMITMENT: u8 = 0x40;

/// Capability bit selecting a mutable NFT.
pub const CAPABILITY_MUTABLE: u8 = 0x01;

/// Capability bit selecting a minting NFT.
pub const CAPABILITY_MINTING: u8 = 0x02;

/// Capability of the non-fungible part of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenType {
    Immutable,
    Mutable,
    Minting,
}

impl TokenType {
    /// Capability from the bitfield. Checked in order, so a minting bit
    /// overrides a mutable bit.
    fn from_bitfield(bitfield: u8) -> Self {
        let mut token_type = TokenType::Immutable;
        if bitfield & CAPABILITY_MUTABLE != 0 {
            token_type = TokenType::Mutable;
        }
        if bitfield & CAPABILITY_MINTING != 0 {
            token_type = TokenType::Minting;
        }
        token_type
    }
}

/// A decoded CashToken prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CashToken {
    /// Token category id.
    pub category: Hash,
    /// Raw bitfield byte as found on the wire.
    pub bitfield: u8,
    /// NFT capability, `None` for a purely fungible token.
    pub token_type: Option<TokenType>,
    pub commitment: Vec<u8>,
    pub amount: u64,
}

impl CashToken {
    /// Decode a token prefix from the start of a locking script.
    ///
    /// # Returns
    /// The token and the number of script bytes left after the prefix.
    /// Fails with `MissingTokenMarker` when the script does not start with
    /// `0xEF`. A prefix cut short gives `TruncatedInput`, or
    /// `LengthMismatch` when the commitment length runs past the end.
    pub fn decode(script: &[u8]) -> Result<(CashToken, usize), DecodeError> {
        let mut reader = WireReader::new(script);
        if reader.read_u8()? != PREFIX_TOKEN {
            return Err(DecodeError::MissingTokenMarker);
        }

        let category = reader.read_hash()?;
        let bitfield = reader.read_u8()?;

        let token_type = (bitfield & HAS_NFT != 0).then(|| TokenType::from_bitfield(bitfield));

        let commitment = if bitfield & HAS_COMMITMENT != 0 {
            reader.read_var_bytes()?.to_vec()
        } else {
            Vec::new()
        };

        let amount = if bitfield & HAS_AMOUNT != 0 {
            reader.read_varint()?.value()
        } else {
            0
        };

        let token = CashToken {
            category,
            bitfield,
            token_type,
            commitment,
            amount,
        };
        Ok((token, reader.remaining()))
    }

    /// Serialize the prefix, ready to be followed by a spending condition.
    ///
    /// The bitfield is written as stored; commitment and amount are
    /// written when their flag bits are set.
    pub fn pack(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(34 + self.commitment.len() + 9);
        writer.write_u8(PREFIX_TOKEN);
        writer.write_hash(&self.category);
        writer.write_u8(self.bitfield);
        if self.bitfield & HAS_COMMITMENT != 0 {
            writer.write_var_bytes(&self.commitment);
        }
        if self.bitfield & HAS_AMOUNT != 0 {
            writer.write_varint(VarInt(self.amount));
        }
        writer.into_bytes()
    }

    pub fn is_fungible(&self) -> bool {
        self.bitfield & HAS_AMOUNT != 0
    }

    pub fn is_nft(&self) -> bool {
        self.token_type.is_some()
    }
}
