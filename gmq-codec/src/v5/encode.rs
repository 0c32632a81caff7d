use bytes::{BufMut, Bytes, BytesMut};

use super::packet::*;
use super::property::{encode_properties, encoded_properties_size};
use crate::types::PacketType;
use crate::utils::{var_int_len, write_variable_length, Encode};

/// Body encoding shared by every control packet.
pub(crate) trait EncodePacket {
    fn packet_type(&self) -> PacketType;

    /// Size of the body alone.
    fn encoded_size(&self) -> usize;

    fn encode_body(&self, buf: &mut BytesMut);
}

/// Writes the fixed header followed by the body.
pub(crate) fn write_packet<P: EncodePacket + ?Sized>(pkt: &P, buf: &mut BytesMut) {
    let size = pkt.encoded_size();
    buf.reserve(1 + var_int_len(size) + size);
    buf.put_u8(pkt.packet_type().first_byte());
    write_variable_length(size as u32, buf);
    pkt.encode_body(buf);
}

pub(crate) fn packet_to_bytes<P: EncodePacket + ?Sized>(pkt: &P) -> Bytes {
    let mut buf = BytesMut::new();
    write_packet(pkt, &mut buf);
    buf.freeze()
}

impl EncodePacket for Packet {
    fn packet_type(&self) -> PacketType {
        Packet::packet_type(self)
    }

    fn encoded_size(&self) -> usize {
        match self {
            Packet::Connect(connect) => EncodePacket::encoded_size(&**connect),
            Packet::ConnectAck(ack) => EncodePacket::encoded_size(&**ack),
            Packet::Disconnect(disconnect) => EncodePacket::encoded_size(disconnect),
        }
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        match self {
            Packet::Connect(connect) => connect.encode_body(buf),
            Packet::ConnectAck(ack) => ack.encode_body(buf),
            Packet::Disconnect(disconnect) => disconnect.encode_body(buf),
        }
    }
}

impl EncodePacket for Connect {
    fn packet_type(&self) -> PacketType {
        PacketType::Connect
    }

    fn encoded_size(&self) -> usize {
        // protocol name + version + flags + keep alive
        let mut size = self.protocol_name.encoded_size() + 1 + 1 + 2;
        size += encoded_properties_size(&self.properties);
        size += self.client_id.encoded_size();
        if self.has_will() {
            size += encoded_properties_size(&self.will_properties)
                + self.will_topic.encoded_size()
                + self.will_payload.encoded_size();
        }
        if self.has_username() {
            size += self.username.encoded_size();
        }
        if self.has_password() {
            size += self.password.encoded_size();
        }
        size
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        self.protocol_name.encode(buf);
        buf.put_u8(self.protocol_version);
        buf.put_u8(self.flags().bits());
        self.keep_alive.encode(buf);
        encode_properties(&self.properties, buf);

        self.client_id.encode(buf);
        if self.has_will() {
            encode_properties(&self.will_properties, buf);
            self.will_topic.encode(buf);
            self.will_payload.encode(buf);
        }
        if self.has_username() {
            self.username.encode(buf);
        }
        if self.has_password() {
            self.password.encode(buf);
        }
    }
}

impl EncodePacket for ConnectAck {
    fn packet_type(&self) -> PacketType {
        PacketType::ConnectAck
    }

    fn encoded_size(&self) -> usize {
        2 + encoded_properties_size(&self.properties) // 2 = session present + reason code
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        self.session_present.encode(buf);
        buf.put_u8(self.reason_code.into());
        encode_properties(&self.properties, buf);
    }
}

impl EncodePacket for Disconnect {
    fn packet_type(&self) -> PacketType {
        PacketType::Disconnect
    }

    fn encoded_size(&self) -> usize {
        1 + encoded_properties_size(&self.properties)
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.reason_code.into());
        encode_properties(&self.properties, buf);
    }
}
