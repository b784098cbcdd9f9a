//! Core transaction type for the Bitcoin Cash network.
//!
//! Represents a complete transaction with version, inputs, outputs, and
//! lock time. The transaction hash is cached: it is computed when the
//! value is built or decoded and recomputed by every mutator, so it always
//! equals `sha256d(pack())`.

use bch_primitives::chainhash::{double_hash_h, Hash};
use bch_primitives::util::{VarInt, WireReader, WireWriter};
use bch_script::address::MAINNET_PREFIX;
use bch_script::{Script, TxContext, VerifyError};

use crate::input::{address_from_unlocking_script, TxInput};
use crate::output::TxOutput;
use crate::sighash;
use crate::DecodeError;

/// Per-input allowance used by the fee estimate, counted twice: once for
/// the outpoint side and once for the unlocking script.
const ESTIMATED_INPUT_SCRIPT: usize = 100;

/// Allowance for a P2PKH change output in the fee estimate.
const ESTIMATED_CHANGE_OUTPUT: usize = 8 + 2 + 32;

/// A Bitcoin Cash transaction.
///
/// # Wire format
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    version: u32,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    lock_time: u32,
    hash: Hash,
    /// Address prefix used when re-deriving input addresses.
    prefix: String,
}

impl Tx {
    /// Build a mainnet transaction and compute its hash.
    pub fn new(version: u32, inputs: Vec<TxInput>, outputs: Vec<TxOutput>, lock_time: u32) -> Self {
        Self::with_prefix(MAINNET_PREFIX, version, inputs, outputs, lock_time)
    }

    /// Build a transaction whose input addresses use `prefix`.
    pub fn with_prefix(
        prefix: &str,
        version: u32,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        lock_time: u32,
    ) -> Self {
        let mut tx = Tx {
            version,
            inputs,
            outputs,
            lock_time,
            hash: Hash::EMPTY,
            prefix: prefix.to_string(),
        };
        tx.rehash();
        tx
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Decode a transaction from `reader`, deriving mainnet addresses.
    pub fn decode(reader: &mut WireReader) -> Result<Self, DecodeError> {
        Self::decode_with_prefix(reader, MAINNET_PREFIX)
    }

    /// Decode a transaction from `reader`, deriving addresses under `prefix`.
    ///
    /// The hash is taken over exactly the bytes consumed. Address and token
    /// extraction is best-effort and never fails the decode.
    pub fn decode_with_prefix(reader: &mut WireReader, prefix: &str) -> Result<Self, DecodeError> {
        let start = reader.rest();

        let version = reader.read_u32_le()?;

        let input_count = read_count(reader, 32 + 4 + 1 + 4)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TxInput::read_from(reader, prefix)?);
        }

        let output_count = read_count(reader, 8 + 1)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOutput::read_from(reader, prefix)?);
        }

        let lock_time = reader.read_u32_le()?;

        let consumed = start.len() - reader.remaining();
        let hash = double_hash_h(&start[..consumed]);

        Ok(Tx {
            version,
            inputs,
            outputs,
            lock_time,
            hash,
            prefix: prefix.to_string(),
        })
    }

    /// Parse a transaction from raw bytes.
    ///
    /// The slice must hold exactly one transaction.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(bytes);
        let tx = Self::decode(&mut reader)?;
        if !reader.is_empty() {
            return Err(DecodeError::LengthMismatch {
                declared: bytes.len() - reader.remaining(),
                actual: bytes.len(),
            });
        }
        Ok(tx)
    }

    /// Parse a transaction from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, DecodeError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(writer);
        }

        writer.write_u32_le(self.lock_time);
    }

    /// Serialize to raw bytes.
    pub fn pack(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(self.size());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.pack())
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    /// Transaction hash in internal byte order.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Transaction id as conventionally displayed (byte-reversed hex).
    pub fn tx_id(&self) -> String {
        self.hash.to_string()
    }

    /// Exact serialized size in bytes.
    pub fn size(&self) -> usize {
        4 + VarInt::from(self.inputs.len()).length()
            + self.inputs.iter().map(TxInput::size).sum::<usize>()
            + VarInt::from(self.outputs.len()).length()
            + self.outputs.iter().map(TxOutput::size).sum::<usize>()
            + 4
    }

    /// Upper-bound size of the signed transaction, for fee estimation.
    ///
    /// Inputs are counted at a fixed allowance regardless of their current
    /// unlocking script; `include_change` adds room for one change output.
    pub fn estimated_signed_size(&self, include_change: bool) -> usize {
        let mut size = 4 + 2;
        size += self.inputs.len() * (ESTIMATED_INPUT_SCRIPT + 4 + 32);
        size += 2;
        size += self
            .outputs
            .iter()
            .map(|o| 8 + 2 + o.locking_script.len())
            .sum::<usize>();
        size += 4;
        size += self.inputs.len() * ESTIMATED_INPUT_SCRIPT;
        if include_change {
            size += ESTIMATED_CHANGE_OUTPUT;
        }
        size
    }

    /// Sum of all output values.
    pub fn total_output_value(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }

    /// True for a single-input transaction spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        match self.inputs.as_slice() {
            [input] => input.prev_hash.is_empty() && input.prev_index == 0xFFFF_FFFF,
            _ => false,
        }
    }

    // -----------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------

    /// Replace the unlocking script of input `input_index`.
    ///
    /// The input address and the transaction hash are recomputed.
    ///
    /// # Returns
    /// The previous script, or `None` when the index is out of range.
    pub fn set_unlocking_script(&mut self, input_index: usize, script: Script) -> Option<Script> {
        let input = self.inputs.get_mut(input_index)?;
        input.address = address_from_unlocking_script(&script, &self.prefix);
        let previous = std::mem::replace(&mut input.unlocking_script, script);
        self.rehash();
        Some(previous)
    }

    /// Append an output and recompute the hash.
    pub fn push_output(&mut self, output: TxOutput) {
        self.outputs.push(output);
        self.rehash();
    }

    /// Take the inputs and outputs back out of the transaction.
    pub fn into_parts(self) -> (u32, Vec<TxInput>, Vec<TxOutput>, u32) {
        (self.version, self.inputs, self.outputs, self.lock_time)
    }

    fn rehash(&mut self) {
        self.hash = double_hash_h(&self.pack());
    }
}

impl Default for Tx {
    fn default() -> Self {
        Tx::new(1, Vec::new(), Vec::new(), 0)
    }
}

impl std::fmt::Display for Tx {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TxContext for Tx {
    fn unlocking_script(&self, input_idx: usize) -> Option<&Script> {
        self.inputs.get(input_idx).map(|i| &i.unlocking_script)
    }

    fn signature_hash(
        &self,
        input_idx: usize,
        sub_script: &Script,
        value: u64,
        sighash_type: u32,
    ) -> Result<[u8; 32], VerifyError> {
        sighash::signature_hash(self, input_idx, sub_script.to_bytes(), sighash_type, value)
            .map_err(|e| VerifyError::SighashFailed(e.to_string()))
    }
}

/// Read an element count and reject counts the remaining bytes cannot hold.
fn read_count(reader: &mut WireReader, min_element_size: usize) -> Result<usize, DecodeError> {
    let count = reader.read_varint()?.value();
    let fits = reader.remaining() as u64 / min_element_size as u64;
    if count > fits {
        return Err(DecodeError::MalformedVarInt(format!(
            "count {} cannot fit in {} remaining bytes",
            count,
            reader.remaining()
        )));
    }
    Ok(count as usize)
}
