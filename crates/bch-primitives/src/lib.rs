/// Bitcoin Cash SDK - Cryptographic primitives and wire integers.
///
/// This crate provides the foundational building blocks for the SDK:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160, HMAC-SHA512)
/// - The 32-byte chain hash with reversed-hex display
/// - VarInt, bounds-checked wire reader and wire writer
/// - secp256k1 keys and DER signatures

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod ec;

mod error;
pub use error::PrimitivesError;
