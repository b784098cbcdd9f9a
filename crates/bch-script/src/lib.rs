/// Bitcoin Cash SDK - Scripts, classification, cashaddr and spend checks.
///
/// Provides the Script type, opcode constants, chunk parsing, standard
/// script classification, the cashaddr address format, and the
/// script-execution seam used to validate signed inputs.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod class;
pub mod address;
pub mod verify;

mod error;
pub use error::{EncodingError, ScriptError};
pub use script::Script;
pub use address::{AddressKind, CashAddress};
pub use chunk::ScriptChunk;
pub use class::{classify, extract_addresses, ScriptClass};
pub use verify::{ScriptExecutor, StandardExecutor, TxContext, VerifyError, VerifyFlags};
