use bytes::{Bytes, BytesMut};
use bytestring::ByteString;
use serde::{Deserialize, Serialize};

use super::{decode_fixed_header, ensure_consumed};
use crate::error::DecodeError;
use crate::types::{ConnectFlags, PacketType, QoS, MQTT, MQTT_LEVEL_5, WILL_QOS_SHIFT};
use crate::utils::Decode;
use crate::v5::encode::{self, EncodePacket};
use crate::v5::property::{decode_properties, Properties, UnknownPropertyPolicy};

#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
/// Connect packet content
///
/// The username, password and will flags are not stored: on the wire they are
/// derived from the fields they announce, see [`Connect::flags`].
pub struct Connect {
    /// protocol name, "MQTT" for every known version
    pub protocol_name: ByteString,
    pub protocol_version: u8,
    /// the Will Message is to be Retained when it is published.
    pub will_retain: bool,
    /// the QoS level to be used when publishing the Will Message.
    pub will_qos: QoS,
    /// the handling of the Session state.
    pub clean_start: bool,
    /// a time interval measured in seconds.
    pub keep_alive: u16,
    pub properties: Properties,

    /// identifies the Client to the Server.
    pub client_id: ByteString,
    pub will_properties: Properties,
    pub will_topic: ByteString,
    pub will_payload: Bytes,
    /// username can be used by the Server for authentication and authorization.
    pub username: ByteString,
    /// password can be used by the Server for authentication and authorization.
    pub password: Bytes,
}

impl Connect {
    /// Set client_id value
    pub fn client_id<T>(mut self, client_id: T) -> Self
    where
        ByteString: From<T>,
    {
        self.client_id = client_id.into();
        self
    }

    /// Set username and password
    pub fn credentials<U, P>(mut self, username: U, password: P) -> Self
    where
        ByteString: From<U>,
        P: Into<Bytes>,
    {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set the will message.
    ///
    /// Nothing is sent unless `properties`, `topic` and `payload` are all non-empty.
    pub fn last_will<T, P>(mut self, properties: Properties, topic: T, payload: P) -> Self
    where
        ByteString: From<T>,
        P: Into<Bytes>,
    {
        self.will_properties = properties;
        self.will_topic = topic.into();
        self.will_payload = payload.into();
        self
    }

    #[inline]
    pub fn has_username(&self) -> bool {
        !self.username.is_empty()
    }

    #[inline]
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }

    #[inline]
    pub fn has_will(&self) -> bool {
        !self.will_properties.is_empty() && !self.will_topic.is_empty() && !self.will_payload.is_empty()
    }

    /// Flags byte as it goes on the wire.
    pub fn flags(&self) -> ConnectFlags {
        let mut flags = ConnectFlags::from_bits_truncate(u8::from(self.will_qos) << WILL_QOS_SHIFT);
        flags.set(ConnectFlags::USERNAME, self.has_username());
        flags.set(ConnectFlags::PASSWORD, self.has_password());
        flags.set(ConnectFlags::WILL_RETAIN, self.will_retain);
        flags.set(ConnectFlags::WILL, self.has_will());
        flags.set(ConnectFlags::CLEAN_START, self.clean_start);
        flags
    }

    /// Decodes a whole CONNECT packet, fixed header included.
    pub fn from_bytes(src: Bytes) -> Result<Self, DecodeError> {
        Self::from_bytes_with(src, UnknownPropertyPolicy::default())
    }

    pub fn from_bytes_with(mut src: Bytes, policy: UnknownPropertyPolicy) -> Result<Self, DecodeError> {
        decode_fixed_header(&mut src, PacketType::Connect)?;
        let pkt = Self::decode(&mut src, policy)?;
        ensure_consumed(&src)?;
        Ok(pkt)
    }

    pub(crate) fn decode(src: &mut Bytes, policy: UnknownPropertyPolicy) -> Result<Self, DecodeError> {
        let protocol_name = ByteString::decode(src)?;
        let protocol_version = u8::decode(src)?;

        // reserved bit is not checked
        let flags = ConnectFlags::from_bits_truncate(u8::decode(src)?);
        let will_qos = QoS::try_from((flags & ConnectFlags::WILL_QOS).bits() >> WILL_QOS_SHIFT)?;
        let keep_alive = u16::decode(src)?;
        let properties = decode_properties(src, policy)?;

        let client_id = ByteString::decode(src)?;

        let (will_properties, will_topic, will_payload) = if flags.contains(ConnectFlags::WILL) {
            (decode_properties(src, policy)?, ByteString::decode(src)?, Bytes::decode(src)?)
        } else {
            (Properties::new(), ByteString::default(), Bytes::new())
        };

        let username =
            if flags.contains(ConnectFlags::USERNAME) { ByteString::decode(src)? } else { ByteString::default() };
        let password = if flags.contains(ConnectFlags::PASSWORD) { Bytes::decode(src)? } else { Bytes::new() };

        Ok(Connect {
            protocol_name,
            protocol_version,
            will_retain: flags.contains(ConnectFlags::WILL_RETAIN),
            will_qos,
            clean_start: flags.contains(ConnectFlags::CLEAN_START),
            keep_alive,
            properties,
            client_id,
            will_properties,
            will_topic,
            will_payload,
            username,
            password,
        })
    }

    /// Size of the packet body, fixed header excluded.
    pub fn encoded_size(&self) -> usize {
        EncodePacket::encoded_size(self)
    }

    /// Appends the whole packet, fixed header included.
    pub fn encode(&self, buf: &mut BytesMut) {
        encode::write_packet(self, buf)
    }

    pub fn to_bytes(&self) -> Bytes {
        encode::packet_to_bytes(self)
    }
}

impl Default for Connect {
    fn default() -> Connect {
        Connect {
            protocol_name: ByteString::from_static(MQTT),
            protocol_version: MQTT_LEVEL_5,
            will_retain: false,
            will_qos: QoS::AtMostOnce,
            clean_start: false,
            keep_alive: 0,
            properties: Properties::new(),
            client_id: ByteString::default(),
            will_properties: Properties::new(),
            will_topic: ByteString::default(),
            will_payload: Bytes::new(),
            username: ByteString::default(),
            password: Bytes::new(),
        }
    }
}
