//! Connection handling.
//!
//! A [`Connection`] owns the TCP stream for one peer together with that
//! peer's [`Parser`]. Outbound messages are framed with [`FrameCodec`];
//! inbound bytes are pushed through the parser, whose recoverable errors are
//! logged and skipped. An oversized frame cannot be reframed past (its
//! payload is still in flight with nothing to consume it), so it tears the
//! connection down.

use crate::codec::FrameCodec;
use crate::{Message, NetworkError, NetworkResult, Parser, ParserEvent};
use bytes::BytesMut;
use crea_consensus::Network;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Encoder;
use tracing::{debug, warn};

/// Transport read buffer size.
const READ_CHUNK: usize = 64 * 1024;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout.
    pub read_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
        }
    }
}

/// A P2P connection to one peer.
pub struct Connection {
    /// Remote address.
    pub addr: SocketAddr,
    /// TCP stream.
    stream: TcpStream,
    /// Outbound frame encoder.
    codec: FrameCodec,
    /// Inbound frame parser; lives exactly as long as the connection.
    parser: Parser,
    /// Events framed but not yet handed to the caller.
    events: VecDeque<ParserEvent>,
    /// Configuration.
    config: ConnectionConfig,
}

impl Connection {
    /// Wrap an accepted socket.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        network: Network,
        config: ConnectionConfig,
    ) -> Self {
        Self {
            addr,
            stream,
            codec: FrameCodec::new(&network),
            parser: Parser::new(network),
            events: VecDeque::new(),
            config,
        }
    }

    /// Connect to a remote peer.
    pub async fn connect(
        addr: SocketAddr,
        network: Network,
        config: ConnectionConfig,
    ) -> NetworkResult<Self> {
        let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| NetworkError::Timeout("connect".to_string()))?
            .map_err(NetworkError::Io)?;

        debug!(peer = %addr, "connected");
        Ok(Self::new(stream, addr, network, config))
    }

    /// Frame and send a message.
    pub async fn send(&mut self, message: Message) -> NetworkResult<()> {
        let cmd = message.command().to_string();
        let mut frame = BytesMut::new();
        self.codec.encode(message, &mut frame)?;

        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;

        debug!(peer = %self.addr, cmd = %cmd, len = frame.len(), "sent message");
        Ok(())
    }

    /// Receive the next well-formed message.
    ///
    /// Recoverable framing errors are logged and skipped; the peer stays
    /// connected and the transport decides separately whether its error rate
    /// warrants a disconnect. An oversized frame is fatal here.
    pub async fn next_message(&mut self) -> NetworkResult<Message> {
        loop {
            while let Some(event) = self.events.pop_front() {
                match event {
                    ParserEvent::Packet(msg) => {
                        debug!(peer = %self.addr, cmd = %msg.command(), "received message");
                        return Ok(msg);
                    }
                    ParserEvent::Error(e @ NetworkError::OversizePacket { .. }) => {
                        return Err(e);
                    }
                    ParserEvent::Error(e) => {
                        warn!(peer = %self.addr, error = %e, "discarded malformed frame");
                    }
                }
            }

            let mut buf = [0u8; READ_CHUNK];
            let n = tokio::time::timeout(self.config.read_timeout, self.stream.read(&mut buf))
                .await
                .map_err(|_| NetworkError::Timeout("read".to_string()))??;

            if n == 0 {
                return Err(NetworkError::ConnectionClosed);
            }

            self.events.extend(self.parser.feed(&buf[..n]));
        }
    }

    /// Close the connection.
    pub async fn close(mut self) -> NetworkResult<()> {
        self.stream.shutdown().await?;
        debug!(peer = %self.addr, "connection closed");
        Ok(())
    }
}
