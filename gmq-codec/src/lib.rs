#![deny(unsafe_code)]

//! MQTT v5.0 control packet codec
//!
//! ## Core Features:
//! - **Primitive Codec**: variable length integers, fixed width integers, booleans, length prefixed
//!   strings and binary data, with the remainder left in the caller's `bytes::Bytes`
//! - **Typed Properties**: every known property identifier carries exactly one value kind,
//!   checked when a `Property` is built
//! - **Control Packets**: CONNECT, CONNACK and DISCONNECT with strict fixed header validation
//! - **Tokio Integration**: stream framing via `tokio_util::codec`
//!
//! ## Architecture Components:
//! - `v5::Packet`: decoded control packets
//! - `v5::Codec`: frame decoder / encoder with configurable size limits
//! - `settings::Settings`: file and environment based codec configuration
//! - Error handling with dedicated `EncodeError`/`DecodeError` types
//!

#[macro_use]
mod utils;

/// Error types for encoding/decoding operations
pub mod error;

/// Codec configuration
pub mod settings;

/// Shared types and constants for MQTT protocol
pub mod types;

/// MQTT v5.0 protocol implementation
pub mod v5;

pub use self::error::{DecodeError, EncodeError};
pub use self::settings::Settings;
pub use self::utils::{MAX_FIELD_LEN, MAX_VARIABLE_LENGTH};
