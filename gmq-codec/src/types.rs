use serde::{Deserialize, Serialize};

pub const MQTT: &str = "MQTT";
pub const MQTT_LEVEL_5: u8 = 5;
pub(crate) const WILL_QOS_SHIFT: u8 = 3;

/// Max possible packet size
pub(crate) const MAX_PACKET_SIZE: u32 = 0xF_FF_FF_FF;

prim_enum! {
    /// Quality of Service
    #[derive(serde::Serialize, serde::Deserialize, PartialOrd, Ord, Hash)]
    pub enum QoS {
        /// At most once delivery
        ///
        /// The message is delivered according to the capabilities of the underlying network.
        /// No response is sent by the receiver and no retry is performed by the sender.
        AtMostOnce = 0,
        /// At least once delivery
        AtLeastOnce = 1,
        /// Exactly once delivery
        ExactlyOnce = 2
    }
}

impl Default for QoS {
    fn default() -> Self {
        QoS::AtMostOnce
    }
}

prim_enum! {
    /// Control packet type, the upper nibble of the fixed header byte
    #[derive(serde::Serialize, serde::Deserialize, Hash)]
    pub enum PacketType {
        Connect = 1,
        ConnectAck = 2,
        Publish = 3,
        PublishAck = 4,
        PublishReceived = 5,
        PublishRelease = 6,
        PublishComplete = 7,
        Subscribe = 8,
        SubscribeAck = 9,
        Unsubscribe = 10,
        UnsubscribeAck = 11,
        PingRequest = 12,
        PingResponse = 13,
        Disconnect = 14,
        Auth = 15
    }
}

impl PacketType {
    /// Fixed header byte with the lower nibble cleared.
    #[inline]
    pub fn first_byte(self) -> u8 {
        u8::from(self) << 4
    }
}

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ConnectFlags: u8 {
        const USERNAME    = 0b1000_0000;
        const PASSWORD    = 0b0100_0000;
        const WILL_RETAIN = 0b0010_0000;
        const WILL_QOS    = 0b0001_1000;
        const WILL        = 0b0000_0100;
        const CLEAN_START = 0b0000_0010;
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct FixedHeader {
    /// Fixed Header byte
    pub(crate) first_byte: u8,
    /// the number of bytes remaining within the current packet,
    /// including data in the variable header and the payload.
    pub(crate) remaining_length: u32,
}

/// Single byte outcome carried by CONNACK and DISCONNECT.
///
/// The codec never interprets it, so values without a named constant pass
/// through unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ReasonCode(pub u8);

impl ReasonCode {
    pub const SUCCESS: ReasonCode = ReasonCode(0);
    pub const UNSPECIFIED_ERROR: ReasonCode = ReasonCode(128);
    pub const MALFORMED_PACKET: ReasonCode = ReasonCode(129);
    pub const PROTOCOL_ERROR: ReasonCode = ReasonCode(130);
    pub const IMPLEMENTATION_SPECIFIC_ERROR: ReasonCode = ReasonCode(131);
    pub const UNSUPPORTED_PROTOCOL_VERSION: ReasonCode = ReasonCode(132);
    pub const CLIENT_IDENTIFIER_NOT_VALID: ReasonCode = ReasonCode(133);
    pub const BAD_USERNAME_OR_PASSWORD: ReasonCode = ReasonCode(134);
    pub const NOT_AUTHORIZED: ReasonCode = ReasonCode(135);
    pub const SERVER_UNAVAILABLE: ReasonCode = ReasonCode(136);
    pub const SERVER_BUSY: ReasonCode = ReasonCode(137);
    pub const BANNED: ReasonCode = ReasonCode(138);
    pub const BAD_AUTHENTICATION_METHOD: ReasonCode = ReasonCode(140);
    pub const TOPIC_NAME_INVALID: ReasonCode = ReasonCode(144);
    pub const PACKET_TOO_LARGE: ReasonCode = ReasonCode(149);
    pub const QUOTA_EXCEEDED: ReasonCode = ReasonCode(151);
    pub const PAYLOAD_FORMAT_INVALID: ReasonCode = ReasonCode(153);
    pub const RETAIN_NOT_SUPPORTED: ReasonCode = ReasonCode(154);
    pub const QOS_NOT_SUPPORTED: ReasonCode = ReasonCode(155);
    pub const USE_ANOTHER_SERVER: ReasonCode = ReasonCode(156);
    pub const SERVER_MOVED: ReasonCode = ReasonCode(157);
    pub const CONNECTION_RATE_EXCEEDED: ReasonCode = ReasonCode(159);

    #[inline]
    pub fn is_error(self) -> bool {
        self.0 >= 0x80
    }

    pub fn reason(self) -> &'static str {
        match self {
            ReasonCode::SUCCESS => "Success",
            ReasonCode::UNSPECIFIED_ERROR => "unspecified error",
            ReasonCode::MALFORMED_PACKET => "malformed packet",
            ReasonCode::PROTOCOL_ERROR => "protocol error",
            ReasonCode::IMPLEMENTATION_SPECIFIC_ERROR => "implementation specific error",
            ReasonCode::UNSUPPORTED_PROTOCOL_VERSION => "protocol version is not supported",
            ReasonCode::CLIENT_IDENTIFIER_NOT_VALID => "client identifier is invalid",
            ReasonCode::BAD_USERNAME_OR_PASSWORD => "bad user name or password",
            ReasonCode::NOT_AUTHORIZED => "not authorized",
            ReasonCode::SERVER_UNAVAILABLE => "Server unavailable",
            ReasonCode::SERVER_BUSY => "Server busy",
            ReasonCode::BANNED => "banned",
            ReasonCode::BAD_AUTHENTICATION_METHOD => "bad authentication method",
            ReasonCode::TOPIC_NAME_INVALID => "topic name invalid",
            ReasonCode::PACKET_TOO_LARGE => "packet too large",
            ReasonCode::QUOTA_EXCEEDED => "quota exceeded",
            ReasonCode::PAYLOAD_FORMAT_INVALID => "payload format invalid",
            ReasonCode::RETAIN_NOT_SUPPORTED => "retain not supported",
            ReasonCode::QOS_NOT_SUPPORTED => "QoS not supported",
            ReasonCode::USE_ANOTHER_SERVER => "use another server",
            ReasonCode::SERVER_MOVED => "Server moved",
            ReasonCode::CONNECTION_RATE_EXCEEDED => "connection rate exceeded",
            _ => "unknown reason",
        }
    }
}

impl From<u8> for ReasonCode {
    fn from(v: u8) -> Self {
        ReasonCode(v)
    }
}

impl From<ReasonCode> for u8 {
    fn from(v: ReasonCode) -> Self {
        v.0
    }
}
