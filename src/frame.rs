// ABOUTME: Wire frame type and the fixed 5-byte header layout shared by every message
// ABOUTME: Decoding a frame from a byte stream is the Slicer's job, not a method here

use bytes::{BufMut, Bytes, BytesMut};

/// Size of the fixed header: one tag byte plus a 4-byte big-endian length.
pub const HEADER_LEN: usize = 5;

/// Minimum valid `length` field: the length field covers itself (4 bytes)
/// and nothing else.
pub const MIN_LENGTH: u32 = 4;

/// One tagged, length-prefixed wire message.
///
/// Wire layout: `tag:u8 ‖ length:u32_be ‖ payload[length-4]`. `length` is
/// inclusive of itself, exclusive of `tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub tag: u8,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(tag: u8, payload: Bytes) -> Self {
        Self { tag, payload }
    }

    /// Append this frame's wire encoding to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tag);
        buf.put_u32(self.payload.len() as u32 + MIN_LENGTH);
        buf.extend_from_slice(&self.payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_zero_length_payload() {
        let frame = Frame::new(b'Z', Bytes::new());
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        assert_eq!(&buf[..], &[b'Z', 0, 0, 0, 4]);
    }

    #[test]
    fn encode_with_payload() {
        let frame = Frame::new(b'C', Bytes::from_static(b"SELECT 1\0"));
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        assert_eq!(buf[0], b'C');
        assert_eq!(u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]), 13);
        assert_eq!(&buf[5..], b"SELECT 1\0");
    }
}
