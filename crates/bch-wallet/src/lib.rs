/// Bitcoin Cash SDK - BIP44 key tree, wallet context and transaction signing.
///
/// Derives the wallet's receiving key from a BIP39 mnemonic, keeps one
/// process-wide wallet, signs and validates application transactions and
/// exposes it all through a string-in, string-out API.

mod error;
pub use error::{DerivationError, WalletError};

pub mod bip44;
pub mod mnemonic;
pub mod config;
pub mod context;
pub mod global;
pub mod signer;
pub mod model;
pub mod api;
pub mod convert;
pub mod version;

pub use api::{call, ApiReturn, BackendParams};
pub use bip44::{AccountKey, Address, ChangeType, ExtendedKey, HdEndPath, HdStartPath};
pub use config::{Network, NetworkParams, WalletConfig};
pub use context::WalletContext;
pub use signer::{sign_transaction, validate_tx};
