//! Message framing and the closed set of supported messages.
//!
//! Every peer-to-peer message travels in a 24-byte envelope:
//!
//! | Field    | Size                                   |
//! |----------|----------------------------------------|
//! | magic    | 4 bytes, `E3 E1 F3 E8` on mainnet      |
//! | command  | 12 bytes ASCII, NUL padded             |
//! | length   | 4 bytes (LE)                           |
//! | checksum | first 4 bytes of sha256d(payload)      |
//!
//! followed by the payload. Commands this crate does not model decode to
//! [`Message::Unknown`] so callers can ignore them.

use bch_primitives::hash::sha256d;
use bch_primitives::util::{WireReader, WireWriter};

use crate::block::BlockMsg;
use crate::getblocks::GetBlocksMsg;
use crate::headers::HeadersMsg;
use crate::transaction::Tx;
use crate::DecodeError;

/// Network magic for Bitcoin Cash mainnet ("cash" with the high bits set).
pub const MAGIC: [u8; 4] = [0xE3, 0xE1, 0xF3, 0xE8];

/// Checksum written for an empty payload: sha256d("")[..4].
pub const EMPTY_PAYLOAD_CHECKSUM: [u8; 4] = [0x5D, 0xF6, 0xE0, 0xE2];

pub const PROTOCOL_VERSION: u32 = 70015;

/// User agent announced in `version` messages.
pub const USER_AGENT: &str = "/bunnyhedger:0.1.0/";

/// Fixed width of the command field.
pub const COMMAND_SIZE: usize = 12;

/// Size of the envelope preceding the payload.
pub const HEADER_SIZE: usize = 4 + COMMAND_SIZE + 4 + 4;

/// Node network service bit.
pub const SERVICE_NODE_NETWORK: u64 = 0x01;

pub const CMD_VERSION: &str = "version";
pub const CMD_VERACK: &str = "verack";
pub const CMD_PING: &str = "ping";
pub const CMD_PONG: &str = "pong";
pub const CMD_GETBLOCKS: &str = "getblocks";
pub const CMD_GETHEADERS: &str = "getheaders";
pub const CMD_HEADERS: &str = "headers";
pub const CMD_BLOCK: &str = "block";
pub const CMD_TX: &str = "tx";

/// Wrap `payload` in a frame for `command`.
///
/// # Panics
/// If `command` is longer than 12 bytes. Command strings are compile-time
/// constants, so this is a programming error.
pub fn frame(command: &str, payload: &[u8]) -> Vec<u8> {
    assert!(
        command.len() <= COMMAND_SIZE,
        "{} is too long for a command string",
        command
    );

    let mut writer = WireWriter::with_capacity(HEADER_SIZE + payload.len());
    writer.write_bytes(&MAGIC);

    let mut padded = [0u8; COMMAND_SIZE];
    padded[..command.len()].copy_from_slice(command.as_bytes());
    writer.write_bytes(&padded);

    writer.write_u32_le(payload.len() as u32);
    writer.write_bytes(&checksum(payload));
    writer.write_bytes(payload);
    writer.into_bytes()
}

/// Frame checksum of `payload`.
pub fn checksum(payload: &[u8]) -> [u8; 4] {
    if payload.is_empty() {
        return EMPTY_PAYLOAD_CHECKSUM;
    }
    let digest = sha256d(payload);
    [digest[0], digest[1], digest[2], digest[3]]
}

// -----------------------------------------------------------------------
// version
// -----------------------------------------------------------------------

/// A network address as carried inside `version`.
///
/// The port is big-endian on the wire, unlike every other integer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetAddress {
    pub services: u64,
    /// IPv6 or IPv4-mapped IPv6 address.
    pub ip: [u8; 16],
    pub port: u16,
}

impl NetAddress {
    fn write_to(&self, writer: &mut WireWriter) {
        writer.write_u64_le(self.services);
        writer.write_bytes(&self.ip);
        writer.write_u16_be(self.port);
    }

    fn decode(reader: &mut WireReader) -> Result<Self, DecodeError> {
        Ok(NetAddress {
            services: reader.read_u64_le()?,
            ip: reader.read_array()?,
            port: reader.read_u16_be()?,
        })
    }
}

/// The `version` handshake payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionMsg {
    pub protocol_version: u32,
    pub services: u64,
    pub timestamp: i64,
    pub addr_recv: NetAddress,
    pub addr_from: NetAddress,
    pub nonce: u64,
    pub user_agent: String,
    pub start_height: i32,
    pub relay: bool,
}

impl VersionMsg {
    pub fn new(timestamp: i64, nonce: u64, start_height: i32) -> Self {
        VersionMsg {
            protocol_version: PROTOCOL_VERSION,
            services: SERVICE_NODE_NETWORK,
            timestamp,
            addr_recv: NetAddress::default(),
            addr_from: NetAddress::default(),
            nonce,
            user_agent: USER_AGENT.to_string(),
            start_height,
            relay: false,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(86 + self.user_agent.len());
        writer.write_u32_le(self.protocol_version);
        writer.write_u64_le(self.services);
        writer.write_i64_le(self.timestamp);
        self.addr_recv.write_to(&mut writer);
        self.addr_from.write_to(&mut writer);
        writer.write_u64_le(self.nonce);
        writer.write_var_string(&self.user_agent);
        writer.write_i32_le(self.start_height);
        writer.write_u8(u8::from(self.relay));
        writer.into_bytes()
    }

    /// Decode a `version` payload. Peers older than BIP37 omit the relay
    /// byte; it then defaults to `true`.
    pub fn decode(reader: &mut WireReader) -> Result<Self, DecodeError> {
        let protocol_version = reader.read_u32_le()?;
        let services = reader.read_u64_le()?;
        let timestamp = reader.read_i64_le()?;
        let addr_recv = NetAddress::decode(reader)?;
        let addr_from = NetAddress::decode(reader)?;
        let nonce = reader.read_u64_le()?;
        let user_agent = reader.read_var_string()?;
        let start_height = reader.read_i32_le()?;
        let relay = if reader.is_empty() {
            true
        } else {
            reader.read_u8()? != 0
        };
        Ok(VersionMsg {
            protocol_version,
            services,
            timestamp,
            addr_recv,
            addr_from,
            nonce,
            user_agent,
            start_height,
            relay,
        })
    }
}

// -----------------------------------------------------------------------
// Message
// -----------------------------------------------------------------------

/// Every message this crate frames or parses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Version(VersionMsg),
    VerAck,
    Ping(u64),
    Pong(u64),
    GetBlocks(GetBlocksMsg),
    GetHeaders(GetBlocksMsg),
    Headers(HeadersMsg),
    Block(BlockMsg),
    Tx(Tx),
    /// Any command without a dedicated variant, kept with its raw payload.
    Unknown { command: String, payload: Vec<u8> },
}

impl Message {
    pub fn command(&self) -> &str {
        match self {
            Message::Version(_) => CMD_VERSION,
            Message::VerAck => CMD_VERACK,
            Message::Ping(_) => CMD_PING,
            Message::Pong(_) => CMD_PONG,
            Message::GetBlocks(_) => CMD_GETBLOCKS,
            Message::GetHeaders(_) => CMD_GETHEADERS,
            Message::Headers(_) => CMD_HEADERS,
            Message::Block(_) => CMD_BLOCK,
            Message::Tx(_) => CMD_TX,
            Message::Unknown { command, .. } => command.as_str(),
        }
    }

    /// Serialize the payload without the envelope.
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Message::Version(msg) => msg.pack(),
            Message::VerAck => Vec::new(),
            Message::Ping(nonce) | Message::Pong(nonce) => nonce.to_le_bytes().to_vec(),
            Message::GetBlocks(msg) | Message::GetHeaders(msg) => msg.pack(),
            Message::Headers(msg) => msg.pack(),
            Message::Block(msg) => msg.pack(),
            Message::Tx(tx) => tx.pack(),
            Message::Unknown { payload, .. } => payload.clone(),
        }
    }

    /// Serialize as a complete frame.
    pub fn to_frame(&self) -> Vec<u8> {
        frame(self.command(), &self.pack())
    }

    /// Parse a payload for `command`.
    ///
    /// The payload must be consumed exactly; trailing bytes are a
    /// `LengthMismatch`.
    pub fn decode_payload(command: &str, payload: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(payload);
        let msg = match command {
            CMD_VERSION => Message::Version(VersionMsg::decode(&mut reader)?),
            CMD_VERACK => Message::VerAck,
            CMD_PING => Message::Ping(reader.read_u64_le()?),
            CMD_PONG => Message::Pong(reader.read_u64_le()?),
            CMD_GETBLOCKS => Message::GetBlocks(GetBlocksMsg::decode(&mut reader)?),
            CMD_GETHEADERS => Message::GetHeaders(GetBlocksMsg::decode(&mut reader)?),
            CMD_HEADERS => Message::Headers(HeadersMsg::decode(&mut reader)?),
            CMD_BLOCK => Message::Block(BlockMsg::decode(&mut reader)?),
            CMD_TX => Message::Tx(Tx::decode(&mut reader)?),
            _ => {
                log::debug!("keeping unrecognized command {:?} as raw payload", command);
                return Ok(Message::Unknown {
                    command: command.to_string(),
                    payload: payload.to_vec(),
                });
            }
        };
        if !reader.is_empty() {
            return Err(DecodeError::LengthMismatch {
                declared: payload.len(),
                actual: payload.len() - reader.remaining(),
            });
        }
        Ok(msg)
    }

    /// Parse one complete frame.
    ///
    /// Checks magic, declared length and checksum before dispatching on
    /// the command.
    ///
    /// # Returns
    /// The message and the number of bytes the frame occupied, so several
    /// frames can be read back to back from one buffer.
    pub fn from_frame(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut reader = WireReader::new(bytes);

        let magic: [u8; 4] = reader.read_array()?;
        if magic != MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }

        let raw_command: [u8; COMMAND_SIZE] = reader.read_array()?;
        let end = raw_command
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(COMMAND_SIZE);
        let command = String::from_utf8_lossy(&raw_command[..end]).into_owned();

        let length = reader.read_u32_le()? as usize;
        let expected: [u8; 4] = reader.read_array()?;
        if length > reader.remaining() {
            return Err(DecodeError::LengthMismatch {
                declared: length,
                actual: reader.remaining(),
            });
        }
        let payload = reader.read_bytes(length)?;

        let actual = checksum(payload);
        if actual != expected {
            return Err(DecodeError::BadChecksum { expected, actual });
        }

        let msg = Self::decode_payload(&command, payload)?;
        Ok((msg, HEADER_SIZE + length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_frame() {
        let framed = frame(CMD_VERACK, &[]);
        assert_eq!(framed.len(), HEADER_SIZE);
        assert_eq!(&framed[..4], &MAGIC);
        assert_eq!(&framed[4..10], b"verack");
        assert_eq!(&framed[10..16], &[0u8; 6]);
        assert_eq!(&framed[16..20], &[0u8; 4]);
        assert_eq!(&framed[20..24], &EMPTY_PAYLOAD_CHECKSUM);
    }

    #[test]
    fn test_empty_checksum_matches_digest() {
        assert_eq!(EMPTY_PAYLOAD_CHECKSUM, sha256d(&[])[..4]);
    }

    #[test]
    fn test_payload_checksum() {
        let payload = 0x1122_3344_5566_7788u64.to_le_bytes();
        let framed = frame(CMD_PING, &payload);
        assert_eq!(&framed[16..20], &8u32.to_le_bytes());
        assert_eq!(&framed[20..24], &sha256d(&payload)[..4]);
        assert_eq!(&framed[24..], &payload);
    }

    #[test]
    #[should_panic(expected = "too long")]
    fn test_long_command_panics() {
        frame("thirteenchars", &[]);
    }

    #[test]
    fn test_ping_pong_frames() {
        let (msg, used) = Message::from_frame(&Message::Ping(42).to_frame()).unwrap();
        assert_eq!(msg, Message::Ping(42));
        assert_eq!(used, HEADER_SIZE + 8);

        let (msg, _) = Message::from_frame(&Message::Pong(7).to_frame()).unwrap();
        assert_eq!(msg, Message::Pong(7));
    }

    #[test]
    fn test_unknown_command_kept() {
        let framed = frame("sendcmpct", &[0x00, 0x01]);
        let (msg, _) = Message::from_frame(&framed).unwrap();
        assert_eq!(
            msg,
            Message::Unknown {
                command: "sendcmpct".to_string(),
                payload: vec![0x00, 0x01],
            }
        );
        assert_eq!(msg.to_frame(), framed);
    }

    #[test]
    fn test_bad_magic() {
        let mut framed = Message::VerAck.to_frame();
        framed[0] = 0xF9;
        assert!(matches!(Message::from_frame(&framed), Err(DecodeError::BadMagic(_))));
    }

    #[test]
    fn test_bad_checksum() {
        let mut framed = Message::Ping(1).to_frame();
        framed[24] ^= 0xFF;
        assert!(matches!(
            Message::from_frame(&framed),
            Err(DecodeError::BadChecksum { .. })
        ));
    }

    #[test]
    fn test_declared_length_too_long() {
        let mut framed = Message::Ping(1).to_frame();
        framed[16] = 9;
        assert!(matches!(
            Message::from_frame(&framed),
            Err(DecodeError::LengthMismatch { declared: 9, actual: 8 })
        ));
    }

    #[test]
    fn test_version_roundtrip() {
        let mut msg = VersionMsg::new(1_700_000_000, 0xdead_beef, 800_000);
        msg.addr_recv.port = 8333;
        let packed = msg.pack();
        // port is big-endian: 8333 = 0x208d
        assert_eq!(&packed[44..46], &[0x20, 0x8d]);
        let (decoded, _) = Message::from_frame(&Message::Version(msg.clone()).to_frame()).unwrap();
        assert_eq!(decoded, Message::Version(msg));
    }

    #[test]
    fn test_version_without_relay_byte() {
        let msg = VersionMsg::new(0, 1, 0);
        let packed = msg.pack();
        let decoded = VersionMsg::decode(&mut WireReader::new(&packed[..packed.len() - 1])).unwrap();
        assert!(decoded.relay);
    }

    #[test]
    fn test_trailing_payload_bytes_rejected() {
        let result = Message::decode_payload(CMD_PING, &[0u8; 9]);
        assert!(matches!(result, Err(DecodeError::LengthMismatch { .. })));
    }
}
