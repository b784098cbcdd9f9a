/// Bitcoin Cash SDK - Peer-to-peer wire messages and transactions.
///
/// Provides message framing, the supported message set (block locators,
/// headers, blocks, transactions), the CashToken output prefix, and the
/// FORKID signature hash used to sign transaction inputs.

pub mod message;
pub mod getblocks;
pub mod headers;
pub mod block;
pub mod transaction;
pub mod input;
pub mod output;
pub mod cashtoken;
pub mod sighash;

mod error;
pub use error::{DecodeError, SighashError};
pub use message::{frame, Message, VersionMsg};
pub use getblocks::GetBlocksMsg;
pub use headers::{BlockHeader, CompactTarget, HeadersMsg};
pub use block::BlockMsg;
pub use transaction::Tx;
pub use input::TxInput;
pub use output::TxOutput;
pub use cashtoken::{CashToken, TokenType};
