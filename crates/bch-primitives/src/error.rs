/// Error type shared by the primitives layer.
///
/// Covers short reads on wire buffers, hex and hash parsing, and secp256k1
/// key or signature failures.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("unexpected end of data: needed {needed} bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("malformed varint: {0}")]
    MalformedVarInt(String),

    #[error("length prefix says {declared} bytes, {available} available")]
    LengthMismatch { declared: usize, available: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
