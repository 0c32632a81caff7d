use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::{decode_fixed_header, ensure_consumed};
use crate::error::DecodeError;
use crate::types::{PacketType, ReasonCode};
use crate::utils::Decode;
use crate::v5::encode::{self, EncodePacket};
use crate::v5::property::{decode_properties, Properties, UnknownPropertyPolicy};

/// Represents DISCONNECT packet
#[derive(Debug, PartialEq, Eq, Clone, Default, Deserialize, Serialize)]
pub struct Disconnect {
    /// Disconnect Reason Code
    pub reason_code: ReasonCode,
    pub properties: Properties,
}

impl Disconnect {
    /// Create new instance of `Disconnect` with specified code
    pub fn new(reason_code: ReasonCode) -> Self {
        Self { reason_code, properties: Properties::new() }
    }

    pub fn from_bytes(src: Bytes) -> Result<Self, DecodeError> {
        Self::from_bytes_with(src, UnknownPropertyPolicy::default())
    }

    pub fn from_bytes_with(mut src: Bytes, policy: UnknownPropertyPolicy) -> Result<Self, DecodeError> {
        decode_fixed_header(&mut src, PacketType::Disconnect)?;
        let pkt = Self::decode(&mut src, policy)?;
        ensure_consumed(&src)?;
        Ok(pkt)
    }

    pub(crate) fn decode(src: &mut Bytes, policy: UnknownPropertyPolicy) -> Result<Self, DecodeError> {
        let reason_code = ReasonCode(u8::decode(src)?);
        let properties = decode_properties(src, policy)?;
        Ok(Self { reason_code, properties })
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
