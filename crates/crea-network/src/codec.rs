//! Wire-protocol frame codec.
//!
//! Every message travels in a frame laid out little-endian:
//!
//! ```text
//! +----------+--------------+----------+----------+
//! |  Magic   |   Command    |  Length  | Checksum |
//! | 4 bytes  |   12 bytes   | 4 bytes  | 4 bytes  |
//! +----------+--------------+----------+----------+
//! |                 Payload                       |
//! |              (Length bytes)                   |
//! +-----------------------------------------------+
//! ```
//!
//! - Magic: network identifier (mainnet/testnet/regtest)
//! - Command: ASCII, NUL-padded, NUL-terminated within the field
//! - Length: payload byte count, at most [`MAX_MESSAGE`](crate::MAX_MESSAGE)
//! - Checksum: first 4 bytes of SHA-256d(payload), little-endian
//! - Payload: command-specific data

use crate::{Message, NetworkError, NetworkResult, MAX_MESSAGE};
use bytes::{BufMut, BytesMut};
use crea_consensus::{checksum, Network};
use tokio_util::codec::{Decoder, Encoder};

/// Frame header size: magic (4) + command (12) + length (4) + checksum (4).
pub const HEADER_SIZE: usize = 24;

/// Size of the NUL-padded command field.
pub const COMMAND_SIZE: usize = 12;

/// A parsed frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Command string, NUL terminator stripped.
    pub cmd: String,
    /// Declared payload length.
    pub size: u32,
    /// Expected payload checksum.
    pub checksum: u32,
}

impl FrameHeader {
    /// Parse a header from exactly [`HEADER_SIZE`] bytes, validating the
    /// magic tag, the command terminator, and the declared length.
    pub fn parse(data: &[u8], magic: u32) -> NetworkResult<Self> {
        debug_assert_eq!(data.len(), HEADER_SIZE);

        let got = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        if got != magic {
            return Err(NetworkError::InvalidMagic {
                got,
                expected: magic,
            });
        }

        let field = &data[4..4 + COMMAND_SIZE];
        let nul = field
            .iter()
            .position(|&b| b == 0)
            .ok_or(NetworkError::UnterminatedCommand)?;
        let cmd = String::from_utf8_lossy(&field[..nul]).into_owned();

        let size = u32::from_le_bytes([data[16], data[17], data[18], data[19]]);
        if size as usize > MAX_MESSAGE {
            return Err(NetworkError::OversizePacket {
                size: size as usize,
                max: MAX_MESSAGE,
            });
        }

        let checksum = u32::from_le_bytes([data[20], data[21], data[22], data[23]]);

        Ok(Self {
            cmd,
            size,
            checksum,
        })
    }
}

/// Codec for use with `tokio_util::codec::Framed`.
///
/// Decoding here is strict: any framing error tears the stream down. For the
/// per-peer error-tolerant machine, see [`Parser`](crate::Parser).
pub struct FrameCodec {
    /// Network magic.
    magic: u32,
    /// Header of a frame whose payload has not fully arrived.
    header: Option<FrameHeader>,
}

impl FrameCodec {
    /// Create a codec bound to one network's magic.
    pub fn new(network: &Network) -> Self {
        Self {
            magic: network.magic,
            header: None,
        }
    }

    /// Assemble a complete frame for a message.
    pub fn build_frame(magic: u32, msg: &Message) -> NetworkResult<BytesMut> {
        let cmd = msg.command();
        if cmd.len() >= COMMAND_SIZE || !cmd.is_ascii() {
            return Err(NetworkError::InvalidCommand(cmd.to_string()));
        }

        let payload = msg.to_payload();
        if payload.len() > MAX_MESSAGE {
            return Err(NetworkError::OversizePacket {
                size: payload.len(),
                max: MAX_MESSAGE,
            });
        }

        let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        frame.put_u32_le(magic);

        let mut field = [0u8; COMMAND_SIZE];
        field[..cmd.len()].copy_from_slice(cmd.as_bytes());
        frame.put_slice(&field);

        frame.put_u32_le(payload.len() as u32);
        frame.put_u32_le(checksum(&payload));
        frame.put_slice(&payload);

        Ok(frame)
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = NetworkError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let frame = Self::build_frame(self.magic, &item)?;
        dst.reserve(frame.len());
        dst.put_slice(&frame);
        Ok(())
    }
}

impl Decoder for FrameCodec {
    type Item = Message;
    type Error = NetworkError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let header = match self.header.take() {
            Some(header) => header,
            None => {
                if src.len() < HEADER_SIZE {
                    return Ok(None);
                }
                let bytes = src.split_to(HEADER_SIZE);
                FrameHeader::parse(&bytes, self.magic)?
            }
        };

        let size = header.size as usize;
        if src.len() < size {
            src.reserve(size - src.len());
            self.header = Some(header);
            return Ok(None);
        }

        let payload = src.split_to(size).freeze();

        let got = checksum(&payload);
        if got != header.checksum {
            return Err(NetworkError::InvalidChecksum {
                got,
                expected: header.checksum,
            });
        }

        Message::from_raw(&header.cmd, payload).map(Some)
    }
}
