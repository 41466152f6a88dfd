//! P2P protocol messages.
//!
//! Payload codecs for the commands a peer exchanges during handshake and
//! relay. Commands without a codec pass through as [`Message::Unknown`] so
//! the framing layer stays oblivious to protocol growth.

use crate::{NetworkError, NetworkResult};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Maximum entries in an `addr` message.
pub const MAX_ADDR: usize = 1_000;

/// Maximum entries in an `inv` or `getdata` message.
pub const MAX_INV: usize = 50_000;

/// Maximum user agent length in a `version` message.
const MAX_USER_AGENT: usize = 256;

/// Read a Bitcoin-style variable-length integer (CompactSize).
fn read_var_int(buf: &mut Bytes) -> Result<u64, String> {
    if buf.remaining() < 1 {
        return Err("truncated var-int".to_string());
    }
    match buf.get_u8() {
        0xff => {
            if buf.remaining() < 8 {
                return Err("truncated var-int".to_string());
            }
            Ok(buf.get_u64_le())
        }
        0xfe => {
            if buf.remaining() < 4 {
                return Err("truncated var-int".to_string());
            }
            Ok(buf.get_u32_le() as u64)
        }
        0xfd => {
            if buf.remaining() < 2 {
                return Err("truncated var-int".to_string());
            }
            Ok(buf.get_u16_le() as u64)
        }
        value => Ok(value as u64),
    }
}

/// Write a variable-length integer (CompactSize).
fn write_var_int(buf: &mut BytesMut, value: u64) {
    if value < 0xfd {
        buf.put_u8(value as u8);
    } else if value <= 0xffff {
        buf.put_u8(0xfd);
        buf.put_u16_le(value as u16);
    } else if value <= 0xffff_ffff {
        buf.put_u8(0xfe);
        buf.put_u32_le(value as u32);
    } else {
        buf.put_u8(0xff);
        buf.put_u64_le(value);
    }
}

fn need(buf: &Bytes, bytes: usize, what: &str) -> Result<(), String> {
    if buf.remaining() < bytes {
        Err(format!("truncated {}", what))
    } else {
        Ok(())
    }
}

/// A network address as carried in `addr` and `version` payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetAddress {
    /// Last-seen timestamp. Zero in `version` payloads, which omit it.
    pub time: u32,
    /// Advertised service bits.
    pub services: u64,
    /// Peer address. IPv4 travels as an IPv4-mapped IPv6 address.
    pub ip: IpAddr,
    /// Peer port, big-endian on the wire.
    pub port: u16,
}

impl NetAddress {
    /// Create an address with no metadata.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self {
            time: 0,
            services: 0,
            ip,
            port,
        }
    }

    fn read(buf: &mut Bytes, with_time: bool) -> Result<Self, String> {
        let time = if with_time {
            need(buf, 4, "address time")?;
            buf.get_u32_le()
        } else {
            0
        };

        need(buf, 8 + 16 + 2, "address")?;
        let services = buf.get_u64_le();

        let mut octets = [0u8; 16];
        buf.copy_to_slice(&mut octets);
        let v6 = Ipv6Addr::from(octets);
        let ip = match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        };

        let port = buf.get_u16();

        Ok(Self {
            time,
            services,
            ip,
            port,
        })
    }

    fn write(&self, buf: &mut BytesMut, with_time: bool) {
        if with_time {
            buf.put_u32_le(self.time);
        }
        buf.put_u64_le(self.services);
        let octets = match self.ip {
            IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
            IpAddr::V6(v6) => v6.octets(),
        };
        buf.put_slice(&octets);
        buf.put_u16(self.port);
    }
}

impl Default for NetAddress {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
    }
}

/// `version` message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMessage {
    /// Protocol version.
    pub version: u32,
    /// Service bits of the sender.
    pub services: u64,
    /// Sender's unix time.
    pub timestamp: i64,
    /// Address of the receiving peer as seen by the sender.
    pub remote: NetAddress,
    /// Address of the sender.
    pub local: NetAddress,
    /// Connection nonce for self-connection detection.
    pub nonce: u64,
    /// User agent string.
    pub agent: String,
    /// Best block height of the sender.
    pub height: u32,
    /// Whether the sender asks not to be relayed transactions.
    pub no_relay: bool,
}

impl VersionMessage {
    fn read(buf: &mut Bytes) -> Result<Self, String> {
        need(buf, 4 + 8 + 8, "version fields")?;
        let version = buf.get_u32_le();
        let services = buf.get_u64_le();
        let timestamp = buf.get_i64_le();

        let remote = NetAddress::read(buf, false)?;
        let local = NetAddress::read(buf, false)?;

        need(buf, 8, "version nonce")?;
        let nonce = buf.get_u64_le();

        let agent_len = read_var_int(buf)? as usize;
        if agent_len > MAX_USER_AGENT {
            return Err(format!("user agent too long: {} bytes", agent_len));
        }
        need(buf, agent_len, "user agent")?;
        let agent = String::from_utf8_lossy(&buf.copy_to_bytes(agent_len)).into_owned();

        need(buf, 4, "version height")?;
        let height = buf.get_u32_le();

        // The relay flag is absent in old protocol versions.
        let no_relay = buf.remaining() >= 1 && buf.get_u8() == 0;

        Ok(Self {
            version,
            services,
            timestamp,
            remote,
            local,
            nonce,
            agent,
            height,
            no_relay,
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.version);
        buf.put_u64_le(self.services);
        buf.put_i64_le(self.timestamp);
        self.remote.write(buf, false);
        self.local.write(buf, false);
        buf.put_u64_le(self.nonce);
        write_var_int(buf, self.agent.len() as u64);
        buf.put_slice(self.agent.as_bytes());
        buf.put_u32_le(self.height);
        buf.put_u8(if self.no_relay { 0 } else { 1 });
    }
}

/// Inventory item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvType {
    /// Transaction.
    Tx,
    /// Block.
    Block,
    /// Filtered (merkle) block.
    FilteredBlock,
    /// Unrecognized type, preserved for forward compatibility.
    Other(u32),
}

impl InvType {
    /// Decode from the wire representation.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => InvType::Tx,
            2 => InvType::Block,
            3 => InvType::FilteredBlock,
            other => InvType::Other(other),
        }
    }

    /// Encode to the wire representation.
    pub fn to_raw(self) -> u32 {
        match self {
            InvType::Tx => 1,
            InvType::Block => 2,
            InvType::FilteredBlock => 3,
            InvType::Other(other) => other,
        }
    }
}

/// An `inv` / `getdata` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvItem {
    /// What the hash identifies.
    pub kind: InvType,
    /// Object hash.
    pub hash: [u8; 32],
}

fn read_inv_items(buf: &mut Bytes) -> Result<Vec<InvItem>, String> {
    let count = read_var_int(buf)? as usize;
    if count > MAX_INV {
        return Err(format!("too many inventory items: {}", count));
    }

    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        need(buf, 4 + 32, "inventory item")?;
        let kind = InvType::from_raw(buf.get_u32_le());
        let mut hash = [0u8; 32];
        buf.copy_to_slice(&mut hash);
        items.push(InvItem { kind, hash });
    }
    Ok(items)
}

fn write_inv_items(buf: &mut BytesMut, items: &[InvItem]) {
    write_var_int(buf, items.len() as u64);
    for item in items {
        buf.put_u32_le(item.kind.to_raw());
        buf.put_slice(&item.hash);
    }
}

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Handshake announcement.
    Version(VersionMessage),
    /// Handshake acknowledgment.
    Verack,
    /// Keepalive probe.
    Ping(u64),
    /// Keepalive response.
    Pong(u64),
    /// Request for known peer addresses.
    GetAddr,
    /// Known peer addresses.
    Addr(Vec<NetAddress>),
    /// Inventory announcement.
    Inv(Vec<InvItem>),
    /// Inventory request.
    GetData(Vec<InvItem>),
    /// Command with no codec; payload passed through verbatim.
    Unknown { cmd: String, payload: Bytes },
}

impl Message {
    /// Wire command string.
    pub fn command(&self) -> &str {
        match self {
            Message::Version(_) => "version",
            Message::Verack => "verack",
            Message::Ping(_) => "ping",
            Message::Pong(_) => "pong",
            Message::GetAddr => "getaddr",
            Message::Addr(_) => "addr",
            Message::Inv(_) => "inv",
            Message::GetData(_) => "getdata",
            Message::Unknown { cmd, .. } => cmd,
        }
    }

    /// Decode a message from a validated frame payload.
    ///
    /// Unrecognized commands never fail; they are preserved as
    /// [`Message::Unknown`] so callers can decide what to drop.
    pub fn from_raw(cmd: &str, payload: Bytes) -> NetworkResult<Self> {
        let decode_err = |reason: String| NetworkError::Decode {
            cmd: cmd.to_string(),
            reason,
        };

        let mut buf = payload.clone();
        match cmd {
            "version" => VersionMessage::read(&mut buf)
                .map(Message::Version)
                .map_err(decode_err),
            "verack" => Ok(Message::Verack),
            "ping" => {
                if buf.remaining() != 8 {
                    return Err(decode_err(format!("expected 8 bytes, got {}", buf.remaining())));
                }
                Ok(Message::Ping(buf.get_u64_le()))
            }
            "pong" => {
                if buf.remaining() != 8 {
                    return Err(decode_err(format!("expected 8 bytes, got {}", buf.remaining())));
                }
                Ok(Message::Pong(buf.get_u64_le()))
            }
            "getaddr" => Ok(Message::GetAddr),
            "addr" => {
                let count = read_var_int(&mut buf).map_err(decode_err)? as usize;
                if count > MAX_ADDR {
                    return Err(decode_err(format!("too many addresses: {}", count)));
                }
                let mut addrs = Vec::with_capacity(count);
                for _ in 0..count {
                    addrs.push(NetAddress::read(&mut buf, true).map_err(decode_err)?);
                }
                Ok(Message::Addr(addrs))
            }
            "inv" => read_inv_items(&mut buf).map(Message::Inv).map_err(decode_err),
            "getdata" => read_inv_items(&mut buf)
                .map(Message::GetData)
                .map_err(decode_err),
            _ => Ok(Message::Unknown {
                cmd: cmd.to_string(),
                payload,
            }),
        }
    }

    /// Encode this message's frame payload.
    pub fn to_payload(&self) -> Bytes {
        let mut buf = BytesMut::new();
        match self {
            Message::Version(version) => version.write(&mut buf),
            Message::Verack | Message::GetAddr => {}
            Message::Ping(nonce) | Message::Pong(nonce) => buf.put_u64_le(*nonce),
            Message::Addr(addrs) => {
                write_var_int(&mut buf, addrs.len() as u64);
                for addr in addrs {
                    addr.write(&mut buf, true);
                }
            }
            Message::Inv(items) | Message::GetData(items) => write_inv_items(&mut buf, items),
            Message::Unknown { payload, .. } => return payload.clone(),
        }
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(msg: Message) -> Message {
        let payload = msg.to_payload();
        Message::from_raw(msg.command(), payload).unwrap()
    }

    #[test]
    fn test_ping_roundtrip() {
        assert_eq!(roundtrip(Message::Ping(0x0102_0304_0506_0708)), Message::Ping(0x0102_0304_0506_0708));
        assert_eq!(roundtrip(Message::Pong(42)), Message::Pong(42));
    }

    #[test]
    fn test_ping_rejects_short_payload() {
        let err = Message::from_raw("ping", Bytes::from_static(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, NetworkError::Decode { cmd, .. } if cmd == "ping"));
    }

    #[test]
    fn test_empty_commands() {
        assert_eq!(roundtrip(Message::Verack), Message::Verack);
        assert_eq!(roundtrip(Message::GetAddr), Message::GetAddr);
        assert!(Message::Verack.to_payload().is_empty());
    }

    #[test]
    fn test_version_roundtrip() {
        let msg = Message::Version(VersionMessage {
            version: crate::PROTOCOL_VERSION,
            services: crate::SERVICES_NETWORK,
            timestamp: 1_500_000_000,
            remote: NetAddress::new("203.0.113.7".parse().unwrap(), 10946),
            local: NetAddress::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 10946),
            nonce: 0xfeed_f00d,
            agent: crate::USER_AGENT.to_string(),
            height: 123_456,
            no_relay: false,
        });
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_version_rejects_long_agent() {
        let msg = Message::Version(VersionMessage {
            version: 1,
            services: 0,
            timestamp: 0,
            remote: NetAddress::default(),
            local: NetAddress::default(),
            nonce: 0,
            agent: "x".repeat(MAX_USER_AGENT + 1),
            height: 0,
            no_relay: false,
        });
        let payload = msg.to_payload();
        let err = Message::from_raw("version", payload).unwrap_err();
        assert!(matches!(err, NetworkError::Decode { .. }));
    }

    #[test]
    fn test_addr_roundtrip() {
        let addrs = vec![
            NetAddress {
                time: 1_600_000_000,
                services: 1,
                ip: "198.51.100.4".parse().unwrap(),
                port: 10946,
            },
            NetAddress {
                time: 1_600_000_300,
                services: 0,
                ip: "2001:db8::1".parse().unwrap(),
                port: 20946,
            },
        ];
        assert_eq!(roundtrip(Message::Addr(addrs.clone())), Message::Addr(addrs));
    }

    #[test]
    fn test_addr_rejects_excess_count() {
        let mut buf = BytesMut::new();
        write_var_int(&mut buf, (MAX_ADDR + 1) as u64);
        let err = Message::from_raw("addr", buf.freeze()).unwrap_err();
        assert!(matches!(err, NetworkError::Decode { .. }));
    }

    #[test]
    fn test_inv_roundtrip() {
        let items = vec![
            InvItem {
                kind: InvType::Block,
                hash: [0xab; 32],
            },
            InvItem {
                kind: InvType::Tx,
                hash: [0x01; 32],
            },
            InvItem {
                kind: InvType::Other(77),
                hash: [0xee; 32],
            },
        ];
        assert_eq!(roundtrip(Message::Inv(items.clone())), Message::Inv(items.clone()));
        assert_eq!(roundtrip(Message::GetData(items.clone())), Message::GetData(items));
    }

    #[test]
    fn test_inv_rejects_truncated_item() {
        let mut buf = BytesMut::new();
        write_var_int(&mut buf, 1);
        buf.put_u32_le(2);
        buf.put_slice(&[0u8; 16]); // half a hash
        let err = Message::from_raw("inv", buf.freeze()).unwrap_err();
        assert!(matches!(err, NetworkError::Decode { .. }));
    }

    #[test]
    fn test_unknown_passthrough() {
        let payload = Bytes::from_static(b"opaque");
        let msg = Message::from_raw("mempool", payload.clone()).unwrap();
        assert_eq!(
            msg,
            Message::Unknown {
                cmd: "mempool".to_string(),
                payload,
            }
        );
        assert_eq!(msg.command(), "mempool");
    }

    #[test]
    fn test_var_int_widths() {
        for value in [0u64, 0xfc, 0xfd, 0xffff, 0x10000, 0xffff_ffff, 0x1_0000_0000] {
            let mut buf = BytesMut::new();
            write_var_int(&mut buf, value);
            let mut bytes = buf.freeze();
            assert_eq!(read_var_int(&mut bytes).unwrap(), value);
            assert!(bytes.is_empty());
        }
    }

    #[test]
    fn test_ipv4_mapped_roundtrip() {
        let addr = NetAddress::new("192.0.2.9".parse().unwrap(), 8333);
        let mut buf = BytesMut::new();
        addr.write(&mut buf, false);
        assert_eq!(buf.len(), 8 + 16 + 2);

        let mut bytes = buf.freeze();
        let back = NetAddress::read(&mut bytes, false).unwrap();
        assert_eq!(back.ip, addr.ip);
        assert_eq!(back.port, addr.port);
    }
}
