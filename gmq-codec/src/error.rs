use std::io;

use crate::types::PacketType;
use crate::v5::{PropertyId, PropertyKind};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Buffer is empty")]
    EmptyBuffer,
    #[error("Control type is not {expected:?} ({actual})")]
    WrongPacketType { expected: PacketType, actual: u8 },
    #[error("Given length {declared} is not equal to package size {actual}")]
    LengthMismatch { declared: u32, actual: usize },
    #[error("Too many bytes {0}")]
    TrailingBytes(usize),
    #[error("Unknown property identifier {0}")]
    UnknownPropertyTag(u8),
    #[error("Malformed variable length integer")]
    MalformedLength,
    #[error("Invalid length")]
    InvalidLength,
    #[error("Malformed packet")]
    MalformedPacket,
    #[error("Unsupported packet type {0}")]
    UnsupportedPacketType(u8),
    #[error("Max size exceeded")]
    MaxSizeExceeded,
    #[error("utf8 error")]
    Utf8Error,
    #[error("io error, {:?}", _0)]
    Io(io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> DecodeError {
        DecodeError::Io(e)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Property {id:?} does not carry a {kind:?} value")]
    PropertyKindMismatch { id: PropertyId, kind: PropertyKind },
    #[error("Packet is bigger than peer's Maximum Packet Size")]
    OverMaxPacketSize,
    #[error("io error, {:?}", _0)]
    Io(io::Error),
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> EncodeError {
        EncodeError::Io(e)
    }
}
