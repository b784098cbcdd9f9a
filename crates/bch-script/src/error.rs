/// Error types for script operations.
///
/// Covers malformed pushes, hex input and shape mismatches.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Attempted to use append_opcodes for a push data opcode.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Script is empty when a non-empty script was expected.
    #[error("script is empty")]
    EmptyScript,

    #[error("not a P2PKH")]
    NotP2PKH,

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds the 4-byte length range.
    #[error("data too big")]
    DataTooBig,

    /// A push part of a multi-push encoding is too large.
    #[error("part too big '{0}'")]
    PartTooBig(usize),

    #[error("address error: {0}")]
    Address(#[from] EncodingError),

    #[error("primitives error: {0}")]
    Primitives(#[from] bch_primitives::PrimitivesError),
}

/// Errors from the cashaddr encoder and decoder.
///
/// Encoding only fails on an internal invariant violation (a group value
/// outside the 5-bit alphabet); every other variant comes from decoding
/// untrusted text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("value {0} does not fit the 5-bit alphabet")]
    InvalidValue(u8),

    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("address mixes upper and lower case")]
    MixedCase,

    #[error("address has no prefix separator")]
    MissingPrefix,

    #[error("checksum mismatch")]
    InvalidChecksum,

    #[error("invalid payload length {0}")]
    InvalidLength(usize),

    #[error("non-zero padding bits")]
    InvalidPadding,

    #[error("unsupported version byte {0:#04x}")]
    UnsupportedVersion(u8),
}
