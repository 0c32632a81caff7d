//! MQTT v5 Protocol codec

mod codec;
mod decode;
mod encode;
mod packet;
mod property;

pub use self::codec::Codec;
pub use self::decode::decode_packet;
pub use self::packet::*;
pub use self::property::{
    decode_properties, encode_properties, encode_property, encoded_properties_size, properties_len,
    Properties, Property, PropertyId, PropertyKind, PropertyValue, UnknownPropertyPolicy,
};
