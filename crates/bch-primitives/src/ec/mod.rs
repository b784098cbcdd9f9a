/// Elliptic curve cryptography on secp256k1.
///
/// Private keys, public keys and DER signatures, plus the scalar and point
/// tweaks BIP32 child derivation is built from.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
