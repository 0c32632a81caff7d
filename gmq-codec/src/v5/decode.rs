use bytes::{Buf, Bytes};

use super::packet::*;
use super::packet::{decode_remaining_length, ensure_consumed};
use super::property::UnknownPropertyPolicy;
use crate::error::DecodeError;

/// Decodes a packet body whose fixed header has already been read.
///
/// `src` must hold exactly the remaining length announced by the header.
pub fn decode_packet(
    mut src: Bytes,
    first_byte: u8,
    policy: UnknownPropertyPolicy,
) -> Result<Packet, DecodeError> {
    let packet_type = first_byte >> 4;
    let packet = match PacketType::try_from(packet_type) {
        Ok(PacketType::Connect) => Packet::Connect(Box::new(Connect::decode(&mut src, policy)?)),
        Ok(PacketType::ConnectAck) => Packet::ConnectAck(Box::new(ConnectAck::decode(&mut src, policy)?)),
        Ok(PacketType::Disconnect) => Packet::Disconnect(Disconnect::decode(&mut src, policy)?),
        _ => return Err(DecodeError::UnsupportedPacketType(packet_type)),
    };
    ensure_consumed(&src)?;
    Ok(packet)
}

impl Packet {
    /// Decodes a complete packet, fixed header included.
    pub fn from_bytes(src: Bytes) -> Result<Self, DecodeError> {
        Self::from_bytes_with(src, UnknownPropertyPolicy::default())
    }

    pub fn from_bytes_with(mut src: Bytes, policy: UnknownPropertyPolicy) -> Result<Self, DecodeError> {
        ensure!(src.has_remaining(), DecodeError::EmptyBuffer);
        let first_byte = src.get_u8();
        decode_remaining_length(&mut src)?;
        decode_packet(src, first_byte, policy)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use bytestring::ByteString;

    use super::*;
    use crate::utils::decode_variable_length;
    use crate::v5::{Properties, Property};

    fn assert_decode_packet<B: AsRef<[u8]>>(bytes: B, res: Packet) {
        let bytes = bytes.as_ref();
        let fixed = bytes[0];
        let (_len, consumed) = decode_variable_length(&bytes[1..]).unwrap().unwrap();
        let cur = Bytes::copy_from_slice(&bytes[consumed + 1..]);
        let decoded = decode_packet(cur, fixed, UnknownPropertyPolicy::Discard).unwrap();
        assert_eq!(decoded, res);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_decode_connect_packets() {
        assert_eq!(
            Connect::decode(
                &mut Bytes::from_static(b"\x00\x04MQTT\x05\xC0\x00\x3C\x00\x00\x0512345\x00\x04user\x00\x04pass"),
                UnknownPropertyPolicy::Discard
            )
            .unwrap(),
            Connect {
                keep_alive: 60,
                client_id: ByteString::from_static("12345"),
                username: ByteString::from_static("user"),
                password: Bytes::from_static(b"pass"),
                ..Connect::default()
            }
        );

        assert_decode_packet(
            b"\x10\x15\x00\x04MQTT\x05\x02\x00\x3C\x03\x21\x00\x14\x00\x0512345",
            Packet::Connect(Box::new(Connect {
                clean_start: true,
                keep_alive: 60,
                properties: vec![Property::receive_max(20)],
                client_id: ByteString::from_static("12345"),
                ..Connect::default()
            })),
        );
    }

    #[test]
    fn test_decode_connack_packets() {
        assert_decode_packet(
            b"\x20\x03\x01\x86\x00",
            Packet::ConnectAck(Box::new(ConnectAck {
                session_present: true,
                reason_code: ReasonCode::BAD_USERNAME_OR_PASSWORD,
                properties: Properties::new(),
            })),
        );
    }

    #[test]
    fn test_decode_disconnect_packets() {
        assert_decode_packet(b"\xe0\x02\x00\x00", Packet::Disconnect(Disconnect::default()));
        assert_decode_packet(
            b"\xe0\x05\x8b\x03\x1f\x00\x00",
            Packet::Disconnect(Disconnect {
                reason_code: ReasonCode(0x8b),
                properties: vec![Property::reason_string("")],
            }),
        );
    }

    #[test]
    fn test_unsupported_packet_types() {
        for first_byte in [0x00u8, 0x30, 0xc0, 0xd0, 0xf0] {
            let res = decode_packet(Bytes::new(), first_byte, UnknownPropertyPolicy::Discard);
            assert!(
                matches!(res, Err(DecodeError::UnsupportedPacketType(t)) if t == first_byte >> 4),
                "{first_byte:#x}"
            );
        }
    }

    #[test]
    fn test_body_trailing_bytes() {
        let res = decode_packet(Bytes::from_static(b"\x00\x00\x01"), 0xe0, UnknownPropertyPolicy::Discard);
        assert!(matches!(res, Err(DecodeError::TrailingBytes(1))));
    }

    #[test]
    fn test_packet_from_bytes() {
        let pkt = Packet::from(Connect::default().client_id("any"));
        assert_eq!(Packet::from_bytes(pkt.to_bytes()).unwrap(), pkt);

        assert!(matches!(Packet::from_bytes(Bytes::new()), Err(DecodeError::EmptyBuffer)));
        assert!(matches!(
            Packet::from_bytes(Bytes::from_static(b"\xe0\x03\x00\x00")),
            Err(DecodeError::LengthMismatch { declared: 3, actual: 2 })
        ));

        let mut buf = BytesMut::new();
        Disconnect::new(ReasonCode::SERVER_BUSY).encode(&mut buf);
        assert_eq!(Packet::from_bytes(buf.freeze()).unwrap().packet_type(), PacketType::Disconnect);
    }
}
