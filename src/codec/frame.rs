//! ATP frame encoding and decoding.
//!
//! A frame is a fixed header followed by exactly `frame_length` payload bytes.
//! Control frames (HANDSHAKE, GET_NEXT_FRAME) carry no payload.
//!
//! # Wire Format
//!
//! ```text
//! <header:20><payload:frame_length>[padding]
//! ```
//!
//! The transport envelope is usually a fixed-size packet, so anything after
//! the payload is padding and is ignored on decode.

use bytes::{BufMut, Bytes, BytesMut};

use super::flags::FrameFlags;
use super::header::{FrameHeader, HEADER_SIZE};
use crate::error::{AtpError, Result};

/// Complete ATP frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Fixed header
    pub header: FrameHeader,
    /// Payload slice; empty for control frames
    pub payload: Bytes,
}

impl Frame {
    /// HANDSHAKE control frame that (re)starts a logical session
    pub fn handshake() -> Self {
        Self::control(FrameFlags::HANDSHAKE)
    }

    /// GET_NEXT_FRAME control frame
    pub fn get_next_frame() -> Self {
        Self::control(FrameFlags::GET_NEXT_FRAME)
    }

    fn control(flag: u16) -> Self {
        Self {
            header: FrameHeader::control(flag),
            payload: Bytes::new(),
        }
    }

    /// Flags of this frame
    pub fn flags(&self) -> FrameFlags {
        self.header.flags
    }

    /// DATA flag set
    pub fn is_data(&self) -> bool {
        self.header.flags.is_data()
    }

    /// LAST flag set
    pub fn is_last(&self) -> bool {
        self.header.flags.is_last()
    }

    /// HANDSHAKE flag set
    pub fn is_handshake(&self) -> bool {
        self.header.flags.is_handshake()
    }

    /// GET_NEXT_FRAME flag set
    pub fn is_get_next_frame(&self) -> bool {
        self.header.flags.is_get_next_frame()
    }

    /// Size of this frame on the wire
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode frame to wire format bytes
    pub fn encode(&self) -> Result<Bytes> {
        if self.payload.len() != self.header.frame_length as usize {
            return Err(AtpError::InvalidFrame(format!(
                "Payload is {} bytes but header declares {}",
                self.payload.len(),
                self.header.frame_length
            )));
        }

        let mut header = self.header;
        header.header_length = HEADER_SIZE as u8;

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_slice(&header.to_bytes());
        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Decode frame from wire format bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = FrameHeader::from_bytes(data)?;

        let start = header.header_length as usize;
        let end = start.saturating_add(header.frame_length as usize);
        if data.len() < end {
            return Err(AtpError::InvalidFrame(format!(
                "Payload truncated: need {} bytes, have {}",
                end,
                data.len()
            )));
        }

        Ok(Self {
            header,
            payload: Bytes::copy_from_slice(&data[start..end]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_frame(payload: &'static [u8], offset: u32, total: u32, last: bool) -> Frame {
        let mut flags = FrameFlags::new().with(FrameFlags::DATA);
        if last {
            flags.set(FrameFlags::LAST);
        }
        Frame {
            header: FrameHeader {
                flags,
                frame_number: 1,
                frame_offset: offset,
                frame_length: payload.len() as u32,
                buffer_length: total,
                ..FrameHeader::default()
            },
            payload: Bytes::from_static(payload),
        }
    }

    #[test]
    fn test_control_frames() {
        let hsk = Frame::handshake();
        assert!(hsk.is_handshake());
        assert!(!hsk.is_data());
        assert!(hsk.payload.is_empty());

        let gnf = Frame::get_next_frame();
        assert!(gnf.is_get_next_frame());
        assert_eq!(gnf.header.frame_length, 0);
        assert_eq!(gnf.encode().unwrap().len(), HEADER_SIZE);
    }

    #[test]
    fn test_data_frame_wire_roundtrip() {
        let frame = data_frame(b"hello", 10, 15, true);
        let encoded = frame.encode().unwrap();
        assert_eq!(encoded.len(), HEADER_SIZE + 5);
        assert_eq!(&encoded[HEADER_SIZE..], b"hello");

        let decoded = Frame::decode(&encoded).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_decode_ignores_padding() {
        let frame = data_frame(b"abc", 0, 3, true);
        let mut packet = frame.encode().unwrap().to_vec();
        packet.resize(256, 0xEE);

        let decoded = Frame::decode(&packet).unwrap();
        assert_eq!(decoded.payload.as_ref(), b"abc");
    }

    #[test]
    fn test_decode_truncated_payload() {
        let frame = data_frame(b"abcdef", 0, 6, true);
        let encoded = frame.encode().unwrap();
        let err = Frame::decode(&encoded[..encoded.len() - 1]).unwrap_err();
        assert!(matches!(err, AtpError::InvalidFrame(_)));
    }

    #[test]
    fn test_decode_honors_longer_header_length() {
        let frame = data_frame(b"xy", 0, 2, true);
        let mut header = frame.header.to_bytes().to_vec();
        header[1] = (HEADER_SIZE + 4) as u8;
        header.extend_from_slice(&[0, 0, 0, 0]);
        header.extend_from_slice(b"xy");

        let decoded = Frame::decode(&header).unwrap();
        assert_eq!(decoded.payload.as_ref(), b"xy");
    }

    #[test]
    fn test_encode_rejects_length_mismatch() {
        let mut frame = data_frame(b"abc", 0, 3, true);
        frame.header.frame_length = 4;
        assert!(frame.encode().is_err());
    }
}
