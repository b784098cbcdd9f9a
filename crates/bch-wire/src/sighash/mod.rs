//! Signature hash computation for transaction signing.
//!
//! Bitcoin Cash signs a BIP-143 style digest with the FORKID bit set
//! for replay protection. The digest commits to the value being spent.
//!
//! See <https://github.com/bitcoincashorg/bitcoincash.org/blob/master/spec/replay-protected-sighash.md>

use bch_primitives::hash::sha256d;
use bch_primitives::util::{VarInt, WireWriter};

use crate::transaction::Tx;
use crate::SighashError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs (the default).
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs, allowing outputs to be modified.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Combined with another flag: only sign the current input.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Replay-protection flag required on every Bitcoin Cash signature.
pub const SIGHASH_FORKID: u32 = 0x40;

/// The standard Bitcoin Cash sighash type: ALL | FORKID.
pub const SIGHASH_ALL_FORKID: u32 = SIGHASH_ALL | SIGHASH_FORKID;

/// Mask applied to extract the base sighash type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

// -----------------------------------------------------------------------
// BIP-143 (FORKID) signature hash
// -----------------------------------------------------------------------

/// Compute the FORKID signature hash for input `input_index`.
///
/// # Arguments
/// * `tx`            - The transaction being signed.
/// * `input_index`   - Index of the input being signed.
/// * `script_code`   - The locking script of the output being spent.
/// * `sighash_type`  - The combined sighash flags.
/// * `value`         - The satoshi value of the output being spent.
///
/// # Returns
/// The 32-byte double-SHA256 digest that ECDSA signs.
pub fn signature_hash(
    tx: &Tx,
    input_index: usize,
    script_code: &[u8],
    sighash_type: u32,
    value: u64,
) -> Result<[u8; 32], SighashError> {
    let preimage = calc_preimage(tx, input_index, script_code, sighash_type, value)?;
    Ok(sha256d(&preimage))
}

/// The preimage bytes before double hashing.
///
/// Layout: version, hashPrevouts, hashSequence, outpoint, scriptCode
/// (varint-prefixed), value, nSequence, hashOutputs, lock time and the
/// sighash type as a 4-byte LE integer.
pub fn calc_preimage(
    tx: &Tx,
    input_index: usize,
    script_code: &[u8],
    sighash_type: u32,
    value: u64,
) -> Result<Vec<u8>, SighashError> {
    let input = tx
        .inputs()
        .get(input_index)
        .ok_or(SighashError::InputOutOfRange {
            index: input_index,
            count: tx.inputs().len(),
        })?;
    let base_type = sighash_type & SIGHASH_MASK;
    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;

    let hash_prevouts = if !anyone_can_pay {
        prevouts_hash(tx)
    } else {
        [0u8; 32]
    };

    let hash_sequence =
        if !anyone_can_pay && base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
            sequence_hash(tx)
        } else {
            [0u8; 32]
        };

    let hash_outputs = if base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
        outputs_hash(tx, None)
    } else if base_type == SIGHASH_SINGLE && input_index < tx.outputs().len() {
        outputs_hash(tx, Some(input_index))
    } else {
        [0u8; 32]
    };

    let mut writer = WireWriter::with_capacity(160 + script_code.len());
    writer.write_u32_le(tx.version());
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);

    // outpoint
    writer.write_hash(&input.prev_hash);
    writer.write_u32_le(input.prev_index);

    writer.write_varint(VarInt::from(script_code.len()));
    writer.write_bytes(script_code);

    writer.write_u64_le(value);
    writer.write_u32_le(input.sequence);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time());
    writer.write_u32_le(sighash_type);

    Ok(writer.into_bytes())
}

// -----------------------------------------------------------------------
// Internal helper functions
// -----------------------------------------------------------------------

fn prevouts_hash(tx: &Tx) -> [u8; 32] {
    let mut writer = WireWriter::with_capacity(tx.inputs().len() * 36);
    for input in tx.inputs() {
        writer.write_hash(&input.prev_hash);
        writer.write_u32_le(input.prev_index);
    }
    sha256d(writer.as_bytes())
}

fn sequence_hash(tx: &Tx) -> [u8; 32] {
    let mut writer = WireWriter::with_capacity(tx.inputs().len() * 4);
    for input in tx.inputs() {
        writer.write_u32_le(input.sequence);
    }
    sha256d(writer.as_bytes())
}

/// Hash of all outputs, or of the single output at `only` (SIGHASH_SINGLE).
fn outputs_hash(tx: &Tx, only: Option<usize>) -> [u8; 32] {
    let mut writer = WireWriter::new();
    match only {
        Some(n) => tx.outputs()[n].write_to(&mut writer),
        None => {
            for output in tx.outputs() {
                output.write_to(&mut writer);
            }
        }
    }
    sha256d(writer.as_bytes())
}
