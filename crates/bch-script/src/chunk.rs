//! Script chunk parsing and push encoding.
//!
//! A chunk is either a bare opcode or a data push with its payload. The
//! classifier and the signer both work on chunks rather than raw bytes.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes) this is the length.
    pub op: u8,
    /// The pushed bytes, for push operations.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// True for any push, including `OP_0` (an empty push).
    pub fn is_push(&self) -> bool {
        self.op <= OP_PUSHDATA4
    }

    /// ASM token: hex for data pushes, the opcode name otherwise.
    pub fn to_asm_string(&self) -> String {
        match &self.data {
            Some(data) if self.op > OP_0 && self.op <= OP_PUSHDATA4 => hex::encode(data),
            _ => opcode_to_string(self.op),
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// `OP_RETURN` outside a conditional block swallows the rest of the script
/// as its data, which is how null-data outputs carry their payload.
///
/// # Returns
/// The chunks, or `DataTooSmall` when a push runs past the end.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    let mut conditional_depth: i32 = 0;

    while pos < bytes.len() {
        let op = bytes[pos];
        let (header, length) = match op {
            OP_DATA_1..=OP_DATA_75 => (1, op as usize),
            OP_PUSHDATA1 => (2, read_len(bytes, pos + 1, 1)?),
            OP_PUSHDATA2 => (3, read_len(bytes, pos + 1, 2)?),
            OP_PUSHDATA4 => (5, read_len(bytes, pos + 1, 4)?),
            OP_RETURN if conditional_depth == 0 => {
                chunks.push(ScriptChunk {
                    op,
                    data: Some(bytes[pos..].to_vec()),
                });
                break;
            }
            _ => {
                match op {
                    OP_IF | OP_NOTIF | OP_VERIF | OP_VERNOTIF => conditional_depth += 1,
                    OP_ENDIF => conditional_depth -= 1,
                    _ => {}
                }
                chunks.push(ScriptChunk { op, data: None });
                pos += 1;
                continue;
            }
        };
        let start = pos + header;
        let end = start.checked_add(length).ok_or(ScriptError::DataTooSmall)?;
        if end > bytes.len() {
            return Err(ScriptError::DataTooSmall);
        }
        chunks.push(ScriptChunk {
            op,
            data: Some(bytes[start..end].to_vec()),
        });
        pos = end;
    }

    Ok(chunks)
}

/// Little-endian length field of `width` bytes at `at`.
fn read_len(bytes: &[u8], at: usize, width: usize) -> Result<usize, ScriptError> {
    let field = bytes.get(at..at + width).ok_or(ScriptError::DataTooSmall)?;
    Ok(field
        .iter()
        .rev()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize))
}

/// Minimal push prefix for a payload of `data_len` bytes.
///
/// # Returns
/// The prefix bytes, or `DataTooBig` beyond the 4-byte length range.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    match data_len {
        0..=75 => Ok(vec![data_len as u8]),
        76..=0xff => Ok(vec![OP_PUSHDATA1, data_len as u8]),
        0x100..=0xffff => {
            let mut buf = vec![OP_PUSHDATA2];
            buf.extend_from_slice(&(data_len as u16).to_le_bytes());
            Ok(buf)
        }
        _ if data_len as u64 <= u32::MAX as u64 => {
            let mut buf = vec![OP_PUSHDATA4];
            buf.extend_from_slice(&(data_len as u32).to_le_bytes());
            Ok(buf)
        }
        _ => Err(ScriptError::DataTooBig),
    }
}

/// Concatenate several pushes, each with its own minimal prefix.
pub fn encode_push_datas(parts: &[&[u8]]) -> Result<Vec<u8>, ScriptError> {
    let mut result = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let prefix = push_data_prefix(part.len()).map_err(|_| ScriptError::PartTooBig(i))?;
        result.extend_from_slice(&prefix);
        result.extend_from_slice(part);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_p2pkh() {
        let bytes = hex::decode("76a914e2a623699e81b291c0327f408fea765d534baa2a88ac").unwrap();
        let chunks = decode_script(&bytes).unwrap();
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0].op, OP_DUP);
        assert_eq!(chunks[2].data.as_ref().unwrap().len(), 20);
        assert_eq!(chunks[4].op, OP_CHECKSIG);
    }

    #[test]
    fn test_decode_pushdata_variants() {
        let mut bytes = vec![OP_PUSHDATA1, 3, 1, 2, 3, OP_PUSHDATA2, 2, 0, 9, 9];
        bytes.extend_from_slice(&[OP_PUSHDATA4, 1, 0, 0, 0, 7]);
        let chunks = decode_script(&bytes).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].data.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(chunks[1].data.as_deref(), Some(&[9u8, 9][..]));
        assert_eq!(chunks[2].data.as_deref(), Some(&[7u8][..]));
    }

    #[test]
    fn test_decode_truncated() {
        assert!(decode_script(&[0x05, 1, 2]).is_err());
        assert!(decode_script(&[OP_PUSHDATA1]).is_err());
        assert!(decode_script(&[OP_PUSHDATA2, 0xff]).is_err());
        assert!(decode_script(&[OP_PUSHDATA4, 0xff, 0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn test_op_return_swallows_tail() {
        let chunks = decode_script(&[OP_RETURN, 0x04, 0xde, 0xad]).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_op_return_inside_if_is_plain() {
        let chunks = decode_script(&[OP_IF, OP_RETURN, OP_ENDIF]).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks[1].data.is_none());
    }

    #[test]
    fn test_push_data_prefix_boundaries() {
        assert_eq!(push_data_prefix(0).unwrap(), vec![0x00]);
        assert_eq!(push_data_prefix(75).unwrap(), vec![75]);
        assert_eq!(push_data_prefix(76).unwrap(), vec![OP_PUSHDATA1, 76]);
        assert_eq!(push_data_prefix(256).unwrap(), vec![OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(
            push_data_prefix(0x1_0000).unwrap(),
            vec![OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn test_encode_push_datas_roundtrip() {
        let a = [0x30u8; 72];
        let b = [0x02u8; 33];
        let bytes = encode_push_datas(&[&a, &b]).unwrap();
        let chunks = decode_script(&bytes).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data.as_deref(), Some(&a[..]));
        assert_eq!(chunks[1].data.as_deref(), Some(&b[..]));
    }
}
