use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::{decode_fixed_header, ensure_consumed};
use crate::error::DecodeError;
use crate::types::{PacketType, ReasonCode};
use crate::utils::Decode;
use crate::v5::encode::{self, EncodePacket};
use crate::v5::property::{decode_properties, Properties, UnknownPropertyPolicy};

/// Connect acknowledgment
#[derive(Debug, PartialEq, Eq, Clone, Default, Deserialize, Serialize)]
pub struct ConnectAck {
    /// enables a Client to establish whether the Client and Server have a consistent view
    /// about whether there is already stored Session state.
    pub session_present: bool,
    pub reason_code: ReasonCode,
    pub properties: Properties,
}

impl ConnectAck {
    pub fn new(reason_code: ReasonCode) -> Self {
        ConnectAck { reason_code, ..Default::default() }
    }

    pub fn from_bytes(src: Bytes) -> Result<Self, DecodeError> {
        Self::from_bytes_with(src, UnknownPropertyPolicy::default())
    }

    pub fn from_bytes_with(mut src: Bytes, policy: UnknownPropertyPolicy) -> Result<Self, DecodeError> {
        decode_fixed_header(&mut src, PacketType::ConnectAck)?;
        let pkt = Self::decode(&mut src, policy)?;
        ensure_consumed(&src)?;
        Ok(pkt)
    }

    pub(crate) fn decode(src: &mut Bytes, policy: UnknownPropertyPolicy) -> Result<Self, DecodeError> {
        let session_present = bool::decode(src)?;
        let reason_code = ReasonCode(u8::decode(src)?);
        let properties = decode_properties(src, policy)?;
        Ok(ConnectAck { session_present, reason_code, properties })
    }

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
