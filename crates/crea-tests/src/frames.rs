//! Frame-building helpers shared by parser tests.

use bytes::Bytes;
use crea_consensus::{checksum, Network};
use crea_network::{FrameCodec, Message, ParserEvent, COMMAND_SIZE, HEADER_SIZE};

/// Build a complete, valid frame for a message on a network.
pub fn build_frame(network: &Network, msg: &Message) -> Vec<u8> {
    FrameCodec::build_frame(network.magic, msg)
        .expect("valid message frames")
        .to_vec()
}

/// Build a frame from raw parts, without going through a message codec.
///
/// The checksum is computed over the payload, so the frame is well-formed
/// unless the caller corrupts it afterwards.
pub fn build_raw_frame(magic: u32, cmd: &str, payload: &[u8]) -> Vec<u8> {
    assert!(cmd.len() < COMMAND_SIZE, "command must leave room for NUL");

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&magic.to_le_bytes());

    let mut field = [0u8; COMMAND_SIZE];
    field[..cmd.len()].copy_from_slice(cmd.as_bytes());
    frame.extend_from_slice(&field);

    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&checksum(payload).to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Frame an unknown-command message with an arbitrary payload.
pub fn unknown_message(cmd: &str, payload: &[u8]) -> Message {
    Message::Unknown {
        cmd: cmd.to_string(),
        payload: Bytes::copy_from_slice(payload),
    }
}

/// Flip one checksum byte of a frame in place.
pub fn corrupt_checksum(frame: &mut [u8]) {
    frame[20] ^= 0xff;
}

/// Overwrite a frame's declared payload length in place.
pub fn set_declared_size(frame: &mut [u8], size: u32) {
    frame[16..20].copy_from_slice(&size.to_le_bytes());
}

/// Render events to comparable tags, in order.
///
/// Packet events carry their command; error events their debug rendering.
/// Two event sequences are equivalent iff their tags match.
pub fn event_tags(events: &[ParserEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            ParserEvent::Packet(msg) => format!("packet:{:?}", msg),
            ParserEvent::Error(e) => format!("error:{:?}", e),
        })
        .collect()
}
