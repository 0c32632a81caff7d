use std::io::Cursor;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use bytestring::ByteString;

use crate::error::DecodeError;

macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            return Err($e);
        }
    };
}

macro_rules! prim_enum {
    (
        $( #[$enum_attr:meta] )*
        pub enum $name:ident {
            $(
                $( #[$enum_item_attr:meta] )*
                $var:ident=$val:expr
            ),+
        }) => {
        $( #[$enum_attr] )*
        #[repr(u8)]
        #[derive(Debug, Eq, PartialEq, Copy, Clone)]
        pub enum $name {
            $(
                $( #[$enum_item_attr] )*
                $var = $val
            ),+
        }
        impl std::convert::TryFrom<u8> for $name {
            type Error = $crate::error::DecodeError;
            fn try_from(v: u8) -> Result<Self, Self::Error> {
                match v {
                    $($val => Ok($name::$var)),+
                    ,_ => Err($crate::error::DecodeError::MalformedPacket)
                }
            }
        }
        impl From<$name> for u8 {
            fn from(v: $name) -> Self {
                v as u8
            }
        }
    };
}

/// Longest string or binary payload that fits the 16-bit length prefix.
///
/// Anything at or above `u16::MAX` bytes is cut down to this size on encode.
pub const MAX_FIELD_LEN: usize = u16::MAX as usize - 1;

/// Largest value a four byte variable length integer can carry.
pub const MAX_VARIABLE_LENGTH: u32 = 268_435_455;

/// Primitive decoding. The buffer is advanced past the value; what is left
/// in `src` afterwards is the remainder.
///
/// Fixed width values are permissive: a short buffer yields the zero value and
/// is drained, it never fails.
pub(crate) trait Decode: Sized {
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError>;
}

impl Decode for bool {
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        if !src.has_remaining() {
            return Ok(false);
        }
        Ok(src.get_u8() != 0)
    }
}

impl Decode for u8 {
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        if !src.has_remaining() {
            return Ok(0);
        }
        Ok(src.get_u8())
    }
}

impl Decode for u16 {
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        if src.remaining() < 2 {
            src.clear();
            return Ok(0);
        }
        Ok(src.get_u16())
    }
}

impl Decode for u32 {
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        if src.remaining() < 4 {
            src.clear();
            return Ok(0);
        }
        Ok(src.get_u32())
    }
}

impl Decode for Bytes {
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        // a declared length running past the buffer is clamped to what is there
        let len = (u16::decode(src)? as usize).min(src.remaining());
        Ok(src.split_to(len))
    }
}

impl Decode for ByteString {
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        ByteString::try_from(Bytes::decode(src)?).map_err(|_| DecodeError::Utf8Error)
    }
}

impl Decode for (ByteString, ByteString) {
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let key = ByteString::decode(src)?;
        let val = ByteString::decode(src)?;
        Ok((key, val))
    }
}

/// Splits the property region off `src`.
///
/// `src` is left right after the declared region whatever happens to its content.
pub(crate) fn take_properties(src: &mut Bytes) -> Result<Bytes, DecodeError> {
    let prop_len = decode_variable_length_cursor(src)?;
    ensure!(src.remaining() >= prop_len as usize, DecodeError::InvalidLength);

    Ok(src.split_to(prop_len as usize))
}

/// Probes `src` for a variable length integer without consuming it.
///
/// Returns the value and the number of bytes it occupies, or `None` when the
/// terminating byte has not arrived yet.
pub(crate) fn decode_variable_length(src: &[u8]) -> Result<Option<(u32, usize)>, DecodeError> {
    let mut cur = Cursor::new(src);
    match decode_variable_length_cursor(&mut cur) {
        Ok(len) => Ok(Some((len, cur.position() as usize))),
        Err(DecodeError::InvalidLength) => Ok(None),
        Err(e) => Err(e),
    }
}

#[allow(clippy::cast_lossless)]
pub(crate) fn decode_variable_length_cursor<B: Buf>(src: &mut B) -> Result<u32, DecodeError> {
    let mut shift: u32 = 0;
    let mut len: u32 = 0;
    loop {
        ensure!(src.has_remaining(), DecodeError::InvalidLength);
        let val = src.get_u8();
        len += ((val & 0b0111_1111u8) as u32) << shift;
        if val & 0b1000_0000 == 0 {
            return Ok(len);
        } else {
            // at most four bytes
            ensure!(shift < 21, DecodeError::MalformedLength);
            shift += 7;
        }
    }
}

pub(crate) trait Encode {
    fn encoded_size(&self) -> usize;

    fn encode(&self, buf: &mut BytesMut);
}

impl Encode for bool {
    fn encoded_size(&self) -> usize {
        1
    }
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(u8::from(*self));
    }
}

impl Encode for u8 {
    fn encoded_size(&self) -> usize {
        1
    }
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(*self);
    }
}

impl Encode for u16 {
    fn encoded_size(&self) -> usize {
        2
    }
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(*self);
    }
}

impl Encode for u32 {
    fn encoded_size(&self) -> usize {
        4
    }
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(*self);
    }
}

impl Encode for &[u8] {
    fn encoded_size(&self) -> usize {
        2 + self.len().min(MAX_FIELD_LEN)
    }
    fn encode(&self, buf: &mut BytesMut) {
        let len = self.len().min(MAX_FIELD_LEN);
        if len < self.len() {
            log::debug!("field of {} bytes truncated to {} bytes", self.len(), len);
        }
        buf.put_u16(len as u16);
        buf.extend_from_slice(&self[..len]);
    }
}

impl Encode for Bytes {
    fn encoded_size(&self) -> usize {
        self.as_ref().encoded_size()
    }
    fn encode(&self, buf: &mut BytesMut) {
        self.as_ref().encode(buf)
    }
}

/// Longest prefix of `s` that fits a field without splitting a character.
fn str_field_len(s: &str) -> usize {
    if s.len() <= MAX_FIELD_LEN {
        return s.len();
    }
    let mut len = MAX_FIELD_LEN;
    while !s.is_char_boundary(len) {
        len -= 1;
    }
    len
}

impl Encode for ByteString {
    fn encoded_size(&self) -> usize {
        2 + str_field_len(self)
    }
    fn encode(&self, buf: &mut BytesMut) {
        let len = str_field_len(self);
        if len < self.len() {
            log::debug!("string of {} bytes truncated to {} bytes", self.len(), len);
        }
        buf.put_u16(len as u16);
        buf.extend_from_slice(&self.as_bytes()[..len]);
    }
}

impl Encode for (ByteString, ByteString) {
    fn encoded_size(&self) -> usize {
        self.0.encoded_size() + self.1.encoded_size()
    }
    fn encode(&self, buf: &mut BytesMut) {
        self.0.encode(buf);
        self.1.encode(buf)
    }
}

pub(crate) fn write_variable_length(mut len: u32, dst: &mut BytesMut) {
    loop {
        let mut byte = (len & 0b0111_1111) as u8;
        len >>= 7;
        if len > 0 {
            byte |= 0b1000_0000;
        }
        dst.put_u8(byte);
        if len == 0 {
            return;
        }
    }
}

/// Calculates length of variable length integer based on its value
pub(crate) fn var_int_len(val: usize) -> usize {
    match val {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        2_097_152..=268_435_455 => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOREM: &str = "Lorem ipsum dolor sit amet, consetetur sadipscing elitr, sed diam nonumy eirmod tempor \
invidunt ut labore et dolore magna aliquyam erat, sed diam voluptua. At vero eos et accusam et justo duo \
dolores et ea rebum. Stet clita kasd gubergren, no sea takimata sanctus est Lorem ipsum dolor sit amet. Lorem";

    fn encoded<T: Encode>(v: T) -> BytesMut {
        let mut buf = BytesMut::new();
        v.encode(&mut buf);
        buf
    }

    fn with_trailer(buf: BytesMut) -> Bytes {
        let mut buf = buf;
        buf.extend_from_slice(&[8, 9, 10]);
        buf.freeze()
    }

    #[test]
    fn test_decode_variable_length() {
        fn assert_variable_length<B: AsRef<[u8]> + 'static>(bytes: B, res: (u32, usize)) {
            assert_eq!(decode_variable_length(bytes.as_ref()).unwrap(), Some(res));
        }

        assert_variable_length(b"\x7f\x7f", (127, 1));

        assert_eq!(decode_variable_length(b"\xff\xff\xff").unwrap(), None);

        assert_eq!(
            decode_variable_length(b"\xff\xff\xff\xff\xff\xff")
                .map_err(|e| matches!(e, DecodeError::MalformedLength)),
            Err(true)
        );

        assert_variable_length(b"\x00", (0, 1));
        assert_variable_length(b"\x7f", (127, 1));
        assert_variable_length(b"\x80\x01", (128, 2));
        assert_variable_length(b"\xff\x7f", (16383, 2));
        assert_variable_length(b"\x80\x80\x01", (16384, 3));
        assert_variable_length(b"\xff\xff\x7f", (2_097_151, 3));
        assert_variable_length(b"\x80\x80\x80\x01", (2_097_152, 4));
        assert_variable_length(b"\xff\xff\xff\x7f", (268_435_455, 4));
    }

    #[test]
    fn test_encode_variable_length() {
        let mut v = BytesMut::new();

        write_variable_length(0, &mut v);
        assert_eq!(v, [0].as_ref());

        v.clear();

        write_variable_length(123, &mut v);
        assert_eq!(v, [123].as_ref());

        v.clear();

        write_variable_length(129, &mut v);
        assert_eq!(v, b"\x81\x01".as_ref());

        v.clear();

        write_variable_length(301, &mut v);
        assert_eq!(v, [173, 2].as_ref());

        v.clear();

        write_variable_length(16_383, &mut v);
        assert_eq!(v, b"\xff\x7f".as_ref());

        v.clear();

        write_variable_length(2_097_151, &mut v);
        assert_eq!(v, b"\xff\xff\x7f".as_ref());

        v.clear();

        write_variable_length(MAX_VARIABLE_LENGTH, &mut v);
        assert_eq!(v, b"\xff\xff\xff\x7f".as_ref());
    }

    #[test]
    fn test_variable_length_round_trip() {
        for (n, width) in [
            (0u32, 1usize),
            (1, 1),
            (127, 1),
            (128, 2),
            (16_383, 2),
            (16_384, 3),
            (2_097_151, 3),
            (2_097_152, 4),
        ] {
            let mut v = BytesMut::new();
            write_variable_length(n, &mut v);
            assert_eq!(v.len(), width, "width of {n}");
            assert_eq!(var_int_len(n as usize), width);

            let mut src = v.freeze();
            assert_eq!(decode_variable_length_cursor(&mut src).unwrap(), n);
            assert!(src.is_empty());
        }
    }

    #[test]
    fn test_variable_length_leaves_remainder() {
        let mut src = Bytes::from_static(&[173, 2, 8, 9, 10]);
        assert_eq!(decode_variable_length_cursor(&mut src).unwrap(), 301);
        assert_eq!(src, &[8u8, 9, 10][..]);
    }

    #[test]
    fn test_unterminated_variable_length() {
        let mut src = Bytes::from_static(b"\x80\x80");
        assert!(matches!(decode_variable_length_cursor(&mut src), Err(DecodeError::InvalidLength)));

        let mut src = Bytes::from_static(b"\x80\x80\x80\x80\x01");
        assert!(matches!(decode_variable_length_cursor(&mut src), Err(DecodeError::MalformedLength)));
    }

    #[test]
    fn test_string() {
        let b = encoded(ByteString::from_static(LOREM));
        assert_eq!(b[0], 1);
        assert_eq!(b[1], 45);

        let mut src = with_trailer(b);
        assert_eq!(ByteString::decode(&mut src).unwrap(), LOREM);
        assert_eq!(src, &[8u8, 9, 10][..]);

        let mut src = with_trailer(encoded(ByteString::from_static("Hello 世界")));
        assert_eq!(ByteString::decode(&mut src).unwrap(), "Hello 世界");
        assert_eq!(src, &[8u8, 9, 10][..]);
    }

    #[test]
    fn test_string_truncated_on_encode() {
        let s = ByteString::from("a".repeat(70_000));
        let b = encoded(s.clone());
        assert_eq!(&b[..2], &[0xff, 0xfe]);
        assert_eq!(b.len(), 2 + MAX_FIELD_LEN);
        assert_eq!(s.encoded_size(), b.len());

        let s = ByteString::from("b".repeat(u16::MAX as usize));
        let b = encoded(s);
        assert_eq!(u16::from_be_bytes([b[0], b[1]]) as usize, MAX_FIELD_LEN);

        let s = ByteString::from("c".repeat(MAX_FIELD_LEN));
        let mut src = encoded(s.clone()).freeze();
        assert_eq!(ByteString::decode(&mut src).unwrap(), s);
    }

    #[test]
    fn test_multibyte_string_truncated_on_char_boundary() {
        // 3 byte characters: 65534 is not a boundary, 65532 is
        let s = ByteString::from("€".repeat(30_000));
        let b = encoded(s.clone());
        assert_eq!(u16::from_be_bytes([b[0], b[1]]), 65_532);
        assert_eq!(s.encoded_size(), b.len());

        let mut src = b.freeze();
        assert_eq!(ByteString::decode(&mut src).unwrap(), "€".repeat(21_844));
        assert!(src.is_empty());

        // binary data is still cut at exactly 65534 bytes
        let b = encoded(s.as_bytes().clone());
        assert_eq!(u16::from_be_bytes([b[0], b[1]]) as usize, MAX_FIELD_LEN);
    }

    #[test]
    fn test_binary() {
        let mut src = with_trailer(encoded(Bytes::from_static(b"test123")));
        assert_eq!(Bytes::decode(&mut src).unwrap(), Bytes::from_static(b"test123"));
        assert_eq!(src, &[8u8, 9, 10][..]);

        let b = encoded(vec![7u8; 65_535].as_slice());
        assert_eq!(b.len(), 2 + MAX_FIELD_LEN);
    }

    #[test]
    fn test_declared_length_is_clamped() {
        let mut src = Bytes::from_static(b"\x00\x10abc");
        assert_eq!(ByteString::decode(&mut src).unwrap(), "abc");
        assert!(src.is_empty());

        let mut src = Bytes::from_static(b"\x00\x02\xff\xfe");
        assert!(matches!(ByteString::decode(&mut src), Err(DecodeError::Utf8Error)));
    }

    #[test]
    fn test_uint16() {
        let b = encoded(30u16);
        assert_eq!(b, [0, 30].as_ref());

        let mut src = with_trailer(b);
        assert_eq!(u16::decode(&mut src).unwrap(), 30);
        assert_eq!(src, &[8u8, 9, 10][..]);
    }

    #[test]
    fn test_uint32() {
        let mut src = with_trailer(encoded(0x0102_0304u32));
        assert_eq!(u32::decode(&mut src).unwrap(), 0x0102_0304);
        assert_eq!(src, &[8u8, 9, 10][..]);
    }

    #[test]
    fn test_short_fixed_width_decodes_to_zero() {
        let mut src = Bytes::from_static(b"\x01");
        assert_eq!(u16::decode(&mut src).unwrap(), 0);
        assert!(src.is_empty());

        let mut src = Bytes::from_static(b"\x01\x02\x03");
        assert_eq!(u32::decode(&mut src).unwrap(), 0);
        assert!(src.is_empty());

        let mut src = Bytes::new();
        assert!(!bool::decode(&mut src).unwrap());
        assert_eq!(u8::decode(&mut src).unwrap(), 0);
    }

    #[test]
    fn test_bool() {
        let mut src = Bytes::from_static(b"\x00\x01\x7f");
        assert!(!bool::decode(&mut src).unwrap());
        assert!(bool::decode(&mut src).unwrap());
        assert!(bool::decode(&mut src).unwrap());
        assert!(src.is_empty());

        assert_eq!(encoded(true), [1].as_ref());
        assert_eq!(encoded(false), [0].as_ref());
    }

    #[test]
    fn test_key_value() {
        let kv = (ByteString::from_static("name"), ByteString::from_static("value"));
        let b = encoded(kv.clone());
        assert_eq!(b, b"\x00\x04name\x00\x05value".as_ref());
        assert_eq!(kv.encoded_size(), b.len());

        let mut src = b.freeze();
        assert_eq!(<(ByteString, ByteString)>::decode(&mut src).unwrap(), kv);
    }

    #[test]
    fn test_take_properties() {
        let mut src = Bytes::from_static(b"\x02\x21\x00\x0a");
        let region = take_properties(&mut src).unwrap();
        assert_eq!(region, b"\x21\x00".as_ref());
        assert_eq!(src, b"\x0a".as_ref());

        let mut src = Bytes::from_static(b"\x05\x21");
        assert!(matches!(take_properties(&mut src), Err(DecodeError::InvalidLength)));
    }
}
