use bytes::{Buf, Bytes, BytesMut};

pub use crate::types::{ConnectFlags, PacketType, QoS, ReasonCode};

use crate::error::DecodeError;
use crate::utils::decode_variable_length_cursor;
use crate::v5::encode::{self, EncodePacket};

mod connack;
mod connect;
mod disconnect;

pub use connack::*;
pub use connect::*;
pub use disconnect::*;

#[derive(Debug, PartialEq, Eq, Clone)]
/// MQTT Control Packets
pub enum Packet {
    /// Client request to connect to Server
    Connect(Box<Connect>),
    /// Connect acknowledgment
    ConnectAck(Box<ConnectAck>),
    /// Disconnection is advertised
    Disconnect(Disconnect),
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnectAck(_) => PacketType::ConnectAck,
            Packet::Disconnect(_) => PacketType::Disconnect,
        }
    }

    /// Size of the packet body, fixed header excluded.
    pub fn encoded_size(&self) -> usize {
        EncodePacket::encoded_size(self)
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode::write_packet(self, buf)
    }

    pub fn to_bytes(&self) -> Bytes {
        encode::packet_to_bytes(self)
    }
}

impl From<Connect> for Packet {
    fn from(pkt: Connect) -> Self {
        Self::Connect(Box::new(pkt))
    }
}

impl From<Box<Connect>> for Packet {
    fn from(pkt: Box<Connect>) -> Self {
        Self::Connect(pkt)
    }
}

impl From<ConnectAck> for Packet {
    fn from(pkt: ConnectAck) -> Self {
        Self::ConnectAck(Box::new(pkt))
    }
}

impl From<Box<ConnectAck>> for Packet {
    fn from(pkt: Box<ConnectAck>) -> Self {
        Self::ConnectAck(pkt)
    }
}

impl From<Disconnect> for Packet {
    fn from(pkt: Disconnect) -> Self {
        Self::Disconnect(pkt)
    }
}

/// Consumes the fixed header of a packet of type `expected`.
///
/// On success `src` holds exactly the packet body.
pub(crate) fn decode_fixed_header(src: &mut Bytes, expected: PacketType) -> Result<(), DecodeError> {
    ensure!(src.has_remaining(), DecodeError::EmptyBuffer);
    let actual = src.get_u8() >> 4;
    ensure!(actual == u8::from(expected), DecodeError::WrongPacketType { expected, actual });
    decode_remaining_length(src)
}

/// Reads the remaining length and checks it against what is left in `src`.
pub(crate) fn decode_remaining_length(src: &mut Bytes) -> Result<(), DecodeError> {
    let declared = decode_variable_length_cursor(src)?;
    let actual = src.remaining();
    ensure!(declared as usize == actual, DecodeError::LengthMismatch { declared, actual });
    Ok(())
}

/// Every declared body field has been read; nothing may be left over.
pub(crate) fn ensure_consumed(src: &Bytes) -> Result<(), DecodeError> {
    ensure!(src.is_empty(), DecodeError::TrailingBytes(src.len()));
    Ok(())
}
