//! Per-peer stream parser.
//!
//! The parser is an incremental framing machine fed raw transport bytes. It
//! alternates between two states: waiting for a 24-byte header, and waiting
//! for the payload the header declared. Each completed frame is checksummed
//! and decoded; every failure is reported as an event and the machine resets
//! to waiting for a header, so one misbehaving frame never poisons the
//! stream position of a later well-formed one.
//!
//! `feed` is synchronous and never blocks, which keeps the parser usable
//! from any execution context. One parser per peer connection; it owns no
//! shared state.
//!
//! Two deliberate limits: on a magic mismatch the 24 consumed header bytes
//! are discarded without scanning the stream for the next magic tag, and an
//! oversized frame's declared payload is not drained. Both assume the
//! transport disconnects peers that trip them repeatedly.

use crate::codec::{FrameHeader, HEADER_SIZE};
use crate::{Message, NetworkError};
use bytes::BytesMut;
use self::ParserEvent::{Error, Packet};
use crea_consensus::{checksum, Network};
use tracing::trace;

/// Outcome of one framing step.
#[derive(Debug)]
pub enum ParserEvent {
    /// A validated, decoded message.
    Packet(Message),
    /// A recoverable framing or decode failure.
    Error(NetworkError),
}

/// Incremental frame parser bound to one network's magic.
pub struct Parser {
    /// Network whose magic tag frames must carry.
    network: Network,
    /// Received, not yet consumed bytes.
    pending: BytesMut,
    /// Header of the frame currently being received, if any.
    header: Option<FrameHeader>,
}

impl Parser {
    /// Create a parser for one peer connection.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            pending: BytesMut::new(),
            header: None,
        }
    }

    /// Bytes required before the next step can run.
    fn waiting(&self) -> usize {
        match &self.header {
            Some(header) => header.size as usize,
            None => HEADER_SIZE,
        }
    }

    /// Append transport bytes and run every step they complete.
    ///
    /// Returns the packets and errors produced, in framing order. The same
    /// byte sequence yields the same events regardless of how it is split
    /// across `feed` calls.
    pub fn feed(&mut self, data: &[u8]) -> Vec<ParserEvent> {
        if !data.is_empty() {
            self.pending.extend_from_slice(data);
        }

        let mut events = Vec::new();
        while self.pending.len() >= self.waiting() {
            match self.header.take() {
                None => {
                    let bytes = self.pending.split_to(HEADER_SIZE);
                    match FrameHeader::parse(&bytes, self.network.magic) {
                        Ok(header) => self.header = Some(header),
                        Err(e) => events.push(Error(e)),
                    }
                }
                Some(header) => {
                    let payload = self.pending.split_to(header.size as usize).freeze();

                    let got = checksum(&payload);
                    if got != header.checksum {
                        events.push(Error(NetworkError::InvalidChecksum {
                            got,
                            expected: header.checksum,
                        }));
                        continue;
                    }

                    match Message::from_raw(&header.cmd, payload) {
                        Ok(msg) => {
                            trace!(cmd = %header.cmd, size = header.size, "framed packet");
                            events.push(Packet(msg));
                        }
                        Err(e) => events.push(Error(e)),
                    }
                }
            }
        }

        events
    }

    /// Unconsumed byte count, for transport flow-control accounting.
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FrameCodec;
    use super::ParserEvent::{Error, Packet};

    fn frame(network: &Network, msg: &Message) -> Vec<u8> {
        FrameCodec::build_frame(network.magic, msg).unwrap().to_vec()
    }

    fn packets(events: &[ParserEvent]) -> Vec<&Message> {
        events
            .iter()
            .filter_map(|e| match e {
                Packet(msg) => Some(msg),
                Error(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_single_frame() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        let events = parser.feed(&frame(&network, &Message::Ping(9)));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Packet(Message::Ping(9))));
        assert_eq!(parser.pending_bytes(), 0);
    }

    #[test]
    fn test_empty_feed_is_noop() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network);
        assert!(parser.feed(&[]).is_empty());
    }

    #[test]
    fn test_byte_at_a_time() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        let bytes = frame(&network, &Message::Ping(0xabcd));
        let mut events = Vec::new();
        for &b in &bytes {
            events.extend(parser.feed(&[b]));
        }

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Packet(Message::Ping(0xabcd))));
    }

    #[test]
    fn test_multiple_frames_one_feed() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        let mut bytes = frame(&network, &Message::Ping(1));
        bytes.extend(frame(&network, &Message::Verack));
        bytes.extend(frame(&network, &Message::Pong(2)));

        let events = parser.feed(&bytes);
        let got = packets(&events);
        assert_eq!(
            got,
            vec![&Message::Ping(1), &Message::Verack, &Message::Pong(2)]
        );
    }

    #[test]
    fn test_zero_length_payload() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        // Header only; the payload step must fire on zero available bytes.
        let events = parser.feed(&frame(&network, &Message::Verack));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Packet(Message::Verack)));
    }

    #[test]
    fn test_invalid_magic_recovers() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        let mut bytes = frame(&Network::testnet(), &Message::Ping(1));
        bytes.extend(frame(&network, &Message::Ping(2)));

        let events = parser.feed(&bytes);
        assert!(matches!(&events[0], Error(NetworkError::InvalidMagic { .. })));
        // The foreign frame's 8-byte payload is misread as header bytes, so
        // recovery is only guaranteed once the stream realigns; here the
        // payload ends up consumed as part of the next header window.
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_invalid_magic_then_clean_stream() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        // A lone foreign header (no payload) costs exactly one error.
        let events = parser.feed(&frame(&Network::testnet(), &Message::Verack));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Error(NetworkError::InvalidMagic { .. })));

        let events = parser.feed(&frame(&network, &Message::Ping(3)));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Packet(Message::Ping(3))));
    }

    #[test]
    fn test_bad_checksum_emits_error_only() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        let mut bytes = frame(&network, &Message::Ping(5));
        bytes[20] ^= 0x01;

        let events = parser.feed(&bytes);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Error(NetworkError::InvalidChecksum { .. })));

        // Still operable.
        let events = parser.feed(&frame(&network, &Message::Ping(6)));
        assert!(matches!(&events[0], Packet(Message::Ping(6))));
    }

    #[test]
    fn test_unterminated_command() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        let mut bytes = frame(&network, &Message::Verack);
        bytes[4..16].copy_from_slice(b"abcdefghijkl");

        let events = parser.feed(&bytes);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Error(NetworkError::UnterminatedCommand)));
    }

    #[test]
    fn test_oversize_header() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        let mut header = frame(&network, &Message::Verack);
        let size = (crate::MAX_MESSAGE as u32 + 1).to_le_bytes();
        header[16..20].copy_from_slice(&size);

        let events = parser.feed(&header);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Error(NetworkError::OversizePacket { .. })));

        // Operable for the next frame as long as the oversized payload
        // bytes are never delivered.
        let events = parser.feed(&frame(&network, &Message::Ping(8)));
        assert!(matches!(&events[0], Packet(Message::Ping(8))));
    }

    #[test]
    fn test_decode_error_recovers() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        // A ping with a 3-byte payload frames fine but fails its codec.
        let bad = Message::Unknown {
            cmd: "ping".to_string(),
            payload: bytes::Bytes::from_static(&[1, 2, 3]),
        };
        let mut bytes = frame(&network, &bad);
        bytes.extend(frame(&network, &Message::Ping(11)));

        let events = parser.feed(&bytes);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Error(NetworkError::Decode { .. })));
        assert!(matches!(&events[1], Packet(Message::Ping(11))));
    }

    #[test]
    fn test_at_rest_below_waiting() {
        let network = Network::mainnet();
        let mut parser = Parser::new(network.clone());

        let bytes = frame(&network, &Message::Ping(1));
        parser.feed(&bytes[..HEADER_SIZE + 4]);

        // Header consumed, 4 of 8 payload bytes pending.
        assert_eq!(parser.pending_bytes(), 4);
    }
}
