use bytes::{Buf, BufMut, Bytes, BytesMut};
use bytestring::ByteString;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};
use crate::utils::{self, Decode, Encode};

prim_enum! {
    /// Property identifiers understood by the codec
    #[derive(serde::Serialize, serde::Deserialize, Hash)]
    pub enum PropertyId {
        PayloadFormat = 1,
        MessageExpiryInterval = 2,
        ContentType = 3,
        ResponseTopic = 8,
        CorrelationData = 9,
        SessionExpiryInterval = 17,
        AssignedClientId = 18,
        ServerKeepAlive = 19,
        AuthenticationMethod = 21,
        AuthenticationData = 22,
        RequestProblemInfo = 23,
        WillDelayInterval = 24,
        RequestResponseInfo = 25,
        ResponseInfo = 26,
        ServerReference = 28,
        ReasonString = 31,
        ReceiveMax = 33,
        TopicAliasMax = 34,
        MaxQos = 36,
        RetainAvailable = 37,
        UserProperty = 38,
        MaxPacketSize = 39,
        WildcardSubscriptionAvailable = 40,
        SubscriptionIdsAvailable = 41,
        SharedSubscriptionAvailable = 42
    }
}

/// Wire shape of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum PropertyKind {
    Bool,
    Byte,
    U16,
    U32,
    Binary,
    String,
    KeyValue,
}

impl PropertyId {
    /// The one value shape each identifier carries.
    pub fn kind(self) -> PropertyKind {
        use PropertyId::*;

        match self {
            PayloadFormat
            | RequestProblemInfo
            | RequestResponseInfo
            | MaxQos
            | RetainAvailable
            | WildcardSubscriptionAvailable
            | SubscriptionIdsAvailable
            | SharedSubscriptionAvailable => PropertyKind::Bool,
            ServerKeepAlive | ReceiveMax | TopicAliasMax => PropertyKind::U16,
            MessageExpiryInterval | SessionExpiryInterval | WillDelayInterval | MaxPacketSize => {
                PropertyKind::U32
            }
            CorrelationData | AuthenticationData => PropertyKind::Binary,
            ContentType
            | ResponseTopic
            | AssignedClientId
            | AuthenticationMethod
            | ResponseInfo
            | ServerReference
            | ReasonString => PropertyKind::String,
            UserProperty => PropertyKind::KeyValue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum PropertyValue {
    Bool(bool),
    Byte(u8),
    U16(u16),
    U32(u32),
    Binary(Bytes),
    String(ByteString),
    KeyValue(ByteString, ByteString),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Byte(_) => PropertyKind::Byte,
            PropertyValue::U16(_) => PropertyKind::U16,
            PropertyValue::U32(_) => PropertyKind::U32,
            PropertyValue::Binary(_) => PropertyKind::Binary,
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::KeyValue(..) => PropertyKind::KeyValue,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            PropertyValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            PropertyValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(v) => Some(&**v),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            PropertyValue::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_key_value(&self) -> Option<(&str, &str)> {
        match self {
            PropertyValue::KeyValue(k, v) => Some((&**k, &**v)),
            _ => None,
        }
    }

    fn decode(kind: PropertyKind, src: &mut Bytes) -> Result<Self, DecodeError> {
        Ok(match kind {
            PropertyKind::Bool => PropertyValue::Bool(bool::decode(src)?),
            PropertyKind::Byte => PropertyValue::Byte(u8::decode(src)?),
            PropertyKind::U16 => PropertyValue::U16(u16::decode(src)?),
            PropertyKind::U32 => PropertyValue::U32(u32::decode(src)?),
            PropertyKind::Binary => PropertyValue::Binary(Bytes::decode(src)?),
            PropertyKind::String => PropertyValue::String(ByteString::decode(src)?),
            PropertyKind::KeyValue => {
                let (key, val) = <(ByteString, ByteString)>::decode(src)?;
                PropertyValue::KeyValue(key, val)
            }
        })
    }
}

impl Encode for PropertyValue {
    fn encoded_size(&self) -> usize {
        match self {
            PropertyValue::Bool(v) => v.encoded_size(),
            PropertyValue::Byte(v) => v.encoded_size(),
            PropertyValue::U16(v) => v.encoded_size(),
            PropertyValue::U32(v) => v.encoded_size(),
            PropertyValue::Binary(v) => v.encoded_size(),
            PropertyValue::String(v) => v.encoded_size(),
            PropertyValue::KeyValue(k, v) => k.encoded_size() + v.encoded_size(),
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            PropertyValue::Bool(v) => v.encode(buf),
            PropertyValue::Byte(v) => v.encode(buf),
            PropertyValue::U16(v) => v.encode(buf),
            PropertyValue::U32(v) => v.encode(buf),
            PropertyValue::Binary(v) => v.encode(buf),
            PropertyValue::String(v) => v.encode(buf),
            PropertyValue::KeyValue(k, v) => {
                k.encode(buf);
                v.encode(buf)
            }
        }
    }
}

/// A tagged property whose value always has the shape its identifier requires.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "(PropertyId, PropertyValue)", into = "(PropertyId, PropertyValue)")]
pub struct Property {
    id: PropertyId,
    value: PropertyValue,
}

impl Property {
    /// Pairs `id` with `value`, refusing values of the wrong kind.
    pub fn new(id: PropertyId, value: PropertyValue) -> Result<Self, EncodeError> {
        let kind = id.kind();
        ensure!(value.kind() == kind, EncodeError::PropertyKindMismatch { id, kind });
        Ok(Property { id, value })
    }

    #[inline]
    fn typed(id: PropertyId, value: PropertyValue) -> Self {
        debug_assert_eq!(id.kind(), value.kind());
        Property { id, value }
    }

    #[inline]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    #[inline]
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    #[inline]
    pub fn into_value(self) -> PropertyValue {
        self.value
    }

    pub fn payload_format(utf8: bool) -> Self {
        Self::typed(PropertyId::PayloadFormat, PropertyValue::Bool(utf8))
    }

    pub fn message_expiry_interval(secs: u32) -> Self {
        Self::typed(PropertyId::MessageExpiryInterval, PropertyValue::U32(secs))
    }

    pub fn content_type<T>(content_type: T) -> Self
    where
        ByteString: From<T>,
    {
        Self::typed(PropertyId::ContentType, PropertyValue::String(content_type.into()))
    }

    pub fn response_topic<T>(topic: T) -> Self
    where
        ByteString: From<T>,
    {
        Self::typed(PropertyId::ResponseTopic, PropertyValue::String(topic.into()))
    }

    pub fn correlation_data<T: Into<Bytes>>(data: T) -> Self {
        Self::typed(PropertyId::CorrelationData, PropertyValue::Binary(data.into()))
    }

    pub fn session_expiry_interval(secs: u32) -> Self {
        Self::typed(PropertyId::SessionExpiryInterval, PropertyValue::U32(secs))
    }

    pub fn assigned_client_id<T>(client_id: T) -> Self
    where
        ByteString: From<T>,
    {
        Self::typed(PropertyId::AssignedClientId, PropertyValue::String(client_id.into()))
    }

    pub fn server_keep_alive(secs: u16) -> Self {
        Self::typed(PropertyId::ServerKeepAlive, PropertyValue::U16(secs))
    }

    pub fn authentication_method<T>(method: T) -> Self
    where
        ByteString: From<T>,
    {
        Self::typed(PropertyId::AuthenticationMethod, PropertyValue::String(method.into()))
    }

    pub fn authentication_data<T: Into<Bytes>>(data: T) -> Self {
        Self::typed(PropertyId::AuthenticationData, PropertyValue::Binary(data.into()))
    }

    pub fn request_problem_info(enabled: bool) -> Self {
        Self::typed(PropertyId::RequestProblemInfo, PropertyValue::Bool(enabled))
    }

    pub fn will_delay_interval(secs: u32) -> Self {
        Self::typed(PropertyId::WillDelayInterval, PropertyValue::U32(secs))
    }

    pub fn request_response_info(enabled: bool) -> Self {
        Self::typed(PropertyId::RequestResponseInfo, PropertyValue::Bool(enabled))
    }

    pub fn response_info<T>(info: T) -> Self
    where
        ByteString: From<T>,
    {
        Self::typed(PropertyId::ResponseInfo, PropertyValue::String(info.into()))
    }

    pub fn server_reference<T>(reference: T) -> Self
    where
        ByteString: From<T>,
    {
        Self::typed(PropertyId::ServerReference, PropertyValue::String(reference.into()))
    }

    pub fn reason_string<T>(reason: T) -> Self
    where
        ByteString: From<T>,
    {
        Self::typed(PropertyId::ReasonString, PropertyValue::String(reason.into()))
    }

    pub fn receive_max(max: u16) -> Self {
        Self::typed(PropertyId::ReceiveMax, PropertyValue::U16(max))
    }

    pub fn topic_alias_max(max: u16) -> Self {
        Self::typed(PropertyId::TopicAliasMax, PropertyValue::U16(max))
    }

    pub fn max_qos(enabled: bool) -> Self {
        Self::typed(PropertyId::MaxQos, PropertyValue::Bool(enabled))
    }

    pub fn retain_available(available: bool) -> Self {
        Self::typed(PropertyId::RetainAvailable, PropertyValue::Bool(available))
    }

    pub fn user_property<K, V>(key: K, value: V) -> Self
    where
        ByteString: From<K> + From<V>,
    {
        Self::typed(PropertyId::UserProperty, PropertyValue::KeyValue(key.into(), value.into()))
    }

    pub fn max_packet_size(size: u32) -> Self {
        Self::typed(PropertyId::MaxPacketSize, PropertyValue::U32(size))
    }

    pub fn wildcard_subscription_available(available: bool) -> Self {
        Self::typed(PropertyId::WildcardSubscriptionAvailable, PropertyValue::Bool(available))
    }

    pub fn subscription_ids_available(available: bool) -> Self {
        Self::typed(PropertyId::SubscriptionIdsAvailable, PropertyValue::Bool(available))
    }

    pub fn shared_subscription_available(available: bool) -> Self {
        Self::typed(PropertyId::SharedSubscriptionAvailable, PropertyValue::Bool(available))
    }
}

impl TryFrom<(PropertyId, PropertyValue)> for Property {
    type Error = EncodeError;

    fn try_from((id, value): (PropertyId, PropertyValue)) -> Result<Self, Self::Error> {
        Property::new(id, value)
    }
}

impl From<Property> for (PropertyId, PropertyValue) {
    fn from(p: Property) -> Self {
        (p.id, p.value)
    }
}

impl Encode for Property {
    fn encoded_size(&self) -> usize {
        1 + self.value.encoded_size() // 1 - property type byte
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.id.into());
        self.value.encode(buf)
    }
}

pub type Properties = Vec<Property>;

/// What a property list decode does when it meets an identifier it does not know.
///
/// The value length of an unknown property cannot be known, so the rest of the
/// list can never be recovered; the choice is only whether that is an error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPropertyPolicy {
    /// Drop the whole list, including entries parsed before the unknown one.
    #[default]
    Discard,
    /// Fail with [`DecodeError::UnknownPropertyTag`].
    Reject,
}

/// Writes a single property: identifier byte followed by its value.
pub fn encode_property(prop: &Property, buf: &mut BytesMut) {
    prop.encode(buf)
}

/// Size of the property entries alone, without the length prefix.
pub fn properties_len(props: &[Property]) -> usize {
    props.iter().map(Encode::encoded_size).sum()
}

/// Size of a framed property list, length prefix included.
pub fn encoded_properties_size(props: &[Property]) -> usize {
    let len = properties_len(props);
    utils::var_int_len(len) + len
}

/// Writes the variable length byte count followed by every property.
pub fn encode_properties(props: &[Property], buf: &mut BytesMut) {
    let len = properties_len(props);
    utils::write_variable_length(len as u32, buf); // safe: whole message size is vetted by the codec
    for prop in props {
        prop.encode(buf);
    }
}

/// Reads a framed property list off `src`.
///
/// `src` always ends up right after the declared list region, even when the
/// content of that region is thrown away.
pub fn decode_properties(src: &mut Bytes, policy: UnknownPropertyPolicy) -> Result<Properties, DecodeError> {
    let prop_src = &mut utils::take_properties(src)?;
    match read_properties(prop_src) {
        Err(DecodeError::UnknownPropertyTag(tag)) if policy == UnknownPropertyPolicy::Discard => {
            log::debug!("unknown property identifier {}, property list discarded", tag);
            Ok(Properties::new())
        }
        res => res,
    }
}

fn read_properties(prop_src: &mut Bytes) -> Result<Properties, DecodeError> {
    let mut props = Properties::new();
    while prop_src.has_remaining() {
        let tag = prop_src.get_u8();
        let id = PropertyId::try_from(tag).map_err(|_| DecodeError::UnknownPropertyTag(tag))?;
        let value = PropertyValue::decode(id.kind(), prop_src)?;
        props.push(Property { id, value });
    }
    Ok(props)
}
