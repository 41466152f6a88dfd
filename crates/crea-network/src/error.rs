//! Network error types.

use thiserror::Error;

/// Network errors.
///
/// Framing errors (`InvalidMagic`, `UnterminatedCommand`, `OversizePacket`,
/// `InvalidChecksum`, `Decode`) are recoverable: the parser reports them and
/// resumes waiting for the next header. Transport errors are surfaced by the
/// connection layer.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Frame magic did not match the network.
    #[error("invalid network magic: got {got:#010x}, expected {expected:#010x}")]
    InvalidMagic { got: u32, expected: u32 },

    /// No NUL terminator inside the 12-byte command field.
    #[error("unterminated command in frame header")]
    UnterminatedCommand,

    /// Declared payload length exceeds the protocol maximum.
    #[error("packet too large: {size} bytes, max {max} bytes")]
    OversizePacket { size: usize, max: usize },

    /// Payload checksum mismatch.
    #[error("invalid payload checksum: got {got:#010x}, expected {expected:#010x}")]
    InvalidChecksum { got: u32, expected: u32 },

    /// Payload failed to decode for its command.
    #[error("invalid {cmd} payload: {reason}")]
    Decode { cmd: String, reason: String },

    /// Command string unusable for an outbound frame.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Connection closed by the remote peer.
    #[error("connection closed")]
    ConnectionClosed,

    /// Operation timed out.
    #[error("timeout: {0}")]
    Timeout(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
