use std::cell::Cell;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{decode::decode_packet, Packet, UnknownPropertyPolicy};
use crate::error::{DecodeError, EncodeError};
use crate::settings::Settings;
use crate::types::{FixedHeader, MAX_PACKET_SIZE};
use crate::utils::decode_variable_length;

/// Frames MQTT v5 control packets on a byte stream.
#[derive(Debug, Clone)]
pub struct Codec {
    state: Cell<DecodeState>,
    max_in_size: Cell<u32>,
    max_out_size: Cell<u32>,
    unknown_property: Cell<UnknownPropertyPolicy>,
}

#[derive(Debug, Clone, Copy)]
enum DecodeState {
    FrameHeader,
    Frame(FixedHeader),
}

impl Codec {
    /// Create `Codec` instance
    ///
    /// `max_out_size` goes through [`Codec::set_max_outbound_size`].
    pub fn new(max_in_size: u32, max_out_size: u32) -> Self {
        let mut codec = Codec {
            state: Cell::new(DecodeState::FrameHeader),
            max_in_size: Cell::new(max_in_size),
            max_out_size: Cell::new(0),
            unknown_property: Cell::new(UnknownPropertyPolicy::default()),
        };
        codec.set_max_outbound_size(max_out_size);
        codec
    }

    /// Create `Codec` from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        let mut codec = Codec::new(settings.max_inbound_size, settings.max_outbound_size);
        codec.set_unknown_property(settings.unknown_property);
        codec
    }

    /// Max inbound frame size, `0` means unlimited.
    pub fn max_inbound_size(&self) -> u32 {
        self.max_in_size.get()
    }

    /// Max outbound frame size, `0` means unlimited.
    pub fn max_outbound_size(&self) -> u32 {
        self.max_out_size.get()
    }

    /// Set max inbound frame size.
    ///
    /// If max size is set to `0`, size is unlimited.
    /// By default max size is set to `0`
    pub fn set_max_inbound_size(&mut self, size: u32) {
        self.max_in_size.set(size);
    }

    /// Set max outbound frame size.
    ///
    /// If max size is set to `0`, size is unlimited.
    /// By default max size is set to `0`
    pub fn set_max_outbound_size(&mut self, mut size: u32) {
        if size > 5 {
            // fixed header = 1, var_len(remaining.max_value()) = 4
            size -= 5;
        }
        self.max_out_size.set(size);
    }

    pub fn unknown_property(&self) -> UnknownPropertyPolicy {
        self.unknown_property.get()
    }

    /// Set what decoding does with property lists carrying unknown identifiers.
    pub fn set_unknown_property(&mut self, policy: UnknownPropertyPolicy) {
        self.unknown_property.set(policy);
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Decoder for Codec {
    type Item = (Packet, u32);
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, DecodeError> {
        loop {
            match self.state.get() {
                DecodeState::FrameHeader => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    let src_slice = src.as_ref();
                    let first_byte = src_slice[0];
                    match decode_variable_length(&src_slice[1..])? {
                        Some((remaining_length, consumed)) => {
                            // check max message size
                            let max_in_size = self.max_in_size.get();
                            if max_in_size != 0 && max_in_size < remaining_length {
                                log::debug!(
                                    "MaxSizeExceeded max-size: {}, remaining: {}",
                                    max_in_size,
                                    remaining_length
                                );
                                return Err(DecodeError::MaxSizeExceeded);
                            }
                            src.advance(consumed + 1);
                            self.state.set(DecodeState::Frame(FixedHeader { first_byte, remaining_length }));
                            let remaining_length = remaining_length as usize;
                            if src.len() < remaining_length {
                                // extend receiving buffer to fit the whole frame
                                src.reserve(remaining_length - src.len());
                                return Ok(None);
                            }
                        }
                        None => {
                            return Ok(None);
                        }
                    }
                }
                DecodeState::Frame(fixed) => {
                    if src.len() < fixed.remaining_length as usize {
                        return Ok(None);
                    }
                    let packet_buf = src.split_to(fixed.remaining_length as usize).freeze();
                    self.state.set(DecodeState::FrameHeader);
                    let packet = decode_packet(packet_buf, fixed.first_byte, self.unknown_property.get())?;
                    src.reserve(5); // enough to fix 1 fixed header byte + 4 bytes max variable packet length
                    return Ok(Some((packet, fixed.remaining_length)));
                }
            }
        }
    }
}

impl Encoder<Packet> for Codec {
    type Error = EncodeError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let max_out_size = self.max_out_size.get();
        let max_size = if max_out_size != 0 { max_out_size } else { MAX_PACKET_SIZE };
        let content_size = item.encoded_size();
        if content_size > max_size as usize {
            log::debug!("OverMaxPacketSize max-size: {}, content: {}", max_size, content_size);
            return Err(EncodeError::OverMaxPacketSize);
        }
        item.encode(dst);
        Ok(())
    }
}
