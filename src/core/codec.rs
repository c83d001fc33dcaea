//! # Frame Codec
//!
//! Tokio codec that cuts a byte stream into frames.
//!
//! ## Wire Format
//! ```text
//! [Length(2, LE, counts itself)] [Body(Length - 2)]
//! ```
//!
//! The decoder alternates between two states: waiting for the length prefix
//! and waiting for the rest of the frame. A length that cannot describe a
//! valid frame means the stream is out of step and cannot be recovered, so it
//! is reported as a fatal [`ProtocolError::InvalidFrameLength`].

use crate::config::{FRAME_HEADER_SIZE, MAX_FRAME_SIZE};
use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for the 2-byte length prefix.
    Head,
    /// Length known, waiting for this many body bytes.
    Body(usize),
}

/// Length-prefixed frame codec.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_size: usize,
    state: DecodeState,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(MAX_FRAME_SIZE)
    }
}

impl FrameCodec {
    /// `max_frame_size` includes the length prefix and is capped at 65535.
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            max_frame_size: max_frame_size.min(MAX_FRAME_SIZE),
            state: DecodeState::Head,
        }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn decode_head(&self, src: &mut BytesMut) -> Result<Option<usize>> {
        if src.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }
        let length = src.get_u16_le() as usize;
        if length < FRAME_HEADER_SIZE || length > self.max_frame_size {
            return Err(ProtocolError::InvalidFrameLength(length));
        }
        Ok(Some(length - FRAME_HEADER_SIZE))
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let body_len = match self.state {
            DecodeState::Head => match self.decode_head(src)? {
                Some(len) => {
                    self.state = DecodeState::Body(len);
                    len
                }
                None => return Ok(None),
            },
            DecodeState::Body(len) => len,
        };

        if src.len() < body_len {
            src.reserve(body_len - src.len());
            return Ok(None);
        }

        self.state = DecodeState::Head;
        src.reserve(FRAME_HEADER_SIZE);
        Ok(Some(src.split_to(body_len)))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, body: Bytes, dst: &mut BytesMut) -> Result<()> {
        let length = body.len() + FRAME_HEADER_SIZE;
        if length > self.max_frame_size {
            return Err(ProtocolError::OversizedPacket(length));
        }
        dst.reserve(length);
        dst.put_u16_le(length as u16);
        dst.extend_from_slice(&body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_across_partial_reads() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&[0x05, 0x00, 0x0E][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        // Prefix consumed, body still pending
        assert_eq!(buf.len(), 1);

        buf.extend_from_slice(&[0x01, 0x02]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], &[0x0E, 0x01, 0x02]);
        assert!(buf.is_empty());
    }

    #[test]
    fn back_to_back_frames() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&[0x03, 0x00, 0xAA, 0x04, 0x00, 0xBB, 0xCC][..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &[0xAA]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &[0xBB, 0xCC]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn rejects_impossible_lengths() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&[0x01, 0x00][..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::InvalidFrameLength(1))
        ));

        let mut codec = FrameCodec::new(16);
        let mut buf = BytesMut::from(&[0x20, 0x00][..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::InvalidFrameLength(0x20))
        ));
    }

    #[test]
    fn empty_body_is_a_frame() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&[0x02, 0x00][..]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn encode_prefixes_total_length() {
        let mut codec = FrameCodec::default();
        let mut dst = BytesMut::new();
        codec
            .encode(Bytes::from_static(&[0x32, 0x01]), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], &[0x04, 0x00, 0x32, 0x01]);
    }

    #[test]
    fn encode_refuses_oversized_body() {
        let mut codec = FrameCodec::new(8);
        let mut dst = BytesMut::new();
        let result = codec.encode(Bytes::from(vec![0u8; 7]), &mut dst);
        assert!(matches!(result, Err(ProtocolError::OversizedPacket(9))));
        assert!(dst.is_empty());
    }
}
