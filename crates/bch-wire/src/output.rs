//! Transaction output with value, locking script and optional CashToken.
//!
//! The locking script is kept byte-for-byte as it appeared on the wire,
//! token prefix included, so re-serializing an output is lossless. The
//! decoded token and the address of the spending condition ride along
//! for display.

use bch_primitives::util::{VarInt, WireReader, WireWriter};
use bch_script::opcodes::PREFIX_TOKEN;
use bch_script::{extract_addresses, CashAddress, Script};

use crate::cashtoken::CashToken;
use crate::DecodeError;

/// A single output in a Bitcoin Cash transaction.
///
/// # Wire format
///
/// | Field          | Size          |
/// |----------------|---------------|
/// | value          | 8 bytes (LE)  |
/// | script length  | VarInt        |
/// | locking_script | variable      |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount locked by this output, in satoshis.
    pub value: u64,

    /// Full locking script, including any token prefix.
    pub locking_script: Script,

    /// Token carried by the output. Not serialized separately.
    pub token: Option<CashToken>,

    /// Address the spending condition pays to. Not serialized.
    pub address: Option<CashAddress>,
}

impl TxOutput {
    /// Create an output paying `value` to `locking_script`.
    ///
    /// Token and address are derived under `prefix` the same way decoding
    /// derives them.
    pub fn new(value: u64, locking_script: Script, prefix: &str) -> Self {
        let (token, address) = inspect_locking_script(&locking_script, prefix);
        TxOutput {
            value,
            locking_script,
            token,
            address,
        }
    }

    /// Deserialize an output, deriving token and address under `prefix`.
    pub fn read_from(reader: &mut WireReader, prefix: &str) -> Result<Self, DecodeError> {
        let value = reader.read_u64_le()?;
        let locking_script = Script::from_bytes(reader.read_var_bytes()?);
        Ok(Self::new(value, locking_script, prefix))
    }

    /// Serialize this output into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_u64_le(self.value);
        let script_bytes = self.locking_script.to_bytes();
        writer.write_varint(VarInt::from(script_bytes.len()));
        writer.write_bytes(script_bytes);
    }

    /// Serialize this output to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(self.size());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        let script_len = self.locking_script.len();
        8 + VarInt::from(script_len).length() + script_len
    }

    /// The spending condition: the locking script with any token prefix
    /// removed.
    pub fn spending_condition(&self) -> Script {
        let bytes = self.locking_script.to_bytes();
        match CashToken::decode(bytes) {
            Ok((_, remaining)) => Script::from_bytes(&bytes[bytes.len() - remaining..]),
            Err(_) => self.locking_script.clone(),
        }
    }
}

/// Best-effort token and address extraction for a locking script.
///
/// A token prefix that fails to decode is logged and the output is left
/// without token or address; it never fails the surrounding decode.
fn inspect_locking_script(script: &Script, prefix: &str) -> (Option<CashToken>, Option<CashAddress>) {
    let bytes = script.to_bytes();

    let (token, condition) = if bytes.first() == Some(&PREFIX_TOKEN) {
        match CashToken::decode(bytes) {
            Ok((token, remaining)) => {
                let condition = Script::from_bytes(&bytes[bytes.len() - remaining..]);
                (Some(token), condition)
            }
            Err(e) => {
                log::warn!("output carries an undecodable CashToken prefix: {}", e);
                return (None, None);
            }
        }
    } else {
        (None, script.clone())
    };

    let (class, mut addresses) = extract_addresses(&condition, prefix);
    if addresses.is_empty() {
        log::debug!("no address for {} locking script", class);
        return (token, None);
    }
    (token, Some(addresses.swap_remove(0)))
}
