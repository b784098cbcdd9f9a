use bch_primitives::PrimitivesError;

/// Error types for wire decoding.
///
/// Packing never fails; every decode path returns one of these instead of
/// a partially-filled message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended before the field being read.
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    /// A varint prefix or a varint-declared length was unusable.
    #[error("malformed varint: {0}")]
    MalformedVarInt(String),

    /// A length field disagrees with the bytes actually present.
    #[error("length mismatch: header says {declared} bytes, {actual} present")]
    LengthMismatch { declared: usize, actual: usize },

    /// The frame does not start with the network magic.
    #[error("bad magic {0:02x?}")]
    BadMagic([u8; 4]),

    /// The frame checksum does not match its payload.
    #[error("bad checksum: expected {expected:02x?}, got {actual:02x?}")]
    BadChecksum { expected: [u8; 4], actual: [u8; 4] },

    /// A token prefix was expected but the script starts with another byte.
    #[error("missing CashToken marker")]
    MissingTokenMarker,

    /// Hex input that is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<PrimitivesError> for DecodeError {
    fn from(e: PrimitivesError) -> Self {
        match e {
            PrimitivesError::UnexpectedEof { needed, available } => {
                DecodeError::TruncatedInput { needed, available }
            }
            PrimitivesError::MalformedVarInt(msg) => DecodeError::MalformedVarInt(msg),
            PrimitivesError::LengthMismatch { declared, available } => DecodeError::LengthMismatch {
                declared,
                actual: available,
            },
            PrimitivesError::InvalidHex(msg) => DecodeError::InvalidHex(msg),
            other => DecodeError::MalformedVarInt(other.to_string()),
        }
    }
}

impl From<hex::FromHexError> for DecodeError {
    fn from(e: hex::FromHexError) -> Self {
        DecodeError::InvalidHex(e.to_string())
    }
}

/// Error computing a signature hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SighashError {
    #[error("input index {index} out of range (tx has {count} inputs)")]
    InputOutOfRange { index: usize, count: usize },
}
