/// Errors from walking the HD key tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    /// Seed length outside 16..=64 bytes, or a seed whose master key is unusable.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// The child index produced an unusable key. Use the next index.
    #[error("child {0} is not a valid key")]
    InvalidChild(u32),

    #[error("cannot derive hardened child {0} from a public key")]
    DeriveHardenedFromPublic(u32),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("address error: {0}")]
    Address(#[from] bch_script::EncodingError),
}

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet not initialized")]
    NotInitialized,

    /// An input carries no locking script to sign against.
    #[error("input {0} has an empty pubScript")]
    EmptyScript(usize),

    #[error("not all inputs have been signed")]
    PartiallySigned,

    #[error("transaction failed validation")]
    ValidationFailed,

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("derivation error: {0}")]
    Derivation(#[from] DerivationError),

    #[error("primitives error: {0}")]
    Primitives(#[from] bch_primitives::PrimitivesError),

    #[error("script error: {0}")]
    Script(#[from] bch_script::ScriptError),

    #[error("address error: {0}")]
    Encoding(#[from] bch_script::EncodingError),

    #[error("decode error: {0}")]
    Decode(#[from] bch_wire::DecodeError),

    #[error("signature hash error: {0}")]
    Sighash(#[from] bch_wire::SighashError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
