//! Fixed frame header for the ATP wire format.
//!
//! ```text
//!  0        1        2        4            8            12           16           20
//! +--------+--------+--------+------------+------------+------------+------------+
//! |version |hdr_len | flags  | frame_num  | frame_off  | frame_len  | buffer_len |
//! +--------+--------+--------+------------+------------+------------+------------+
//! ```
//!
//! All multi-byte fields are little-endian.

use std::fmt;

use super::flags::FrameFlags;
use crate::error::{AtpError, Result};

/// Fixed header size in bytes
pub const HEADER_SIZE: usize = 20;

/// Wire protocol version carried in every header
pub const PROTOCOL_VERSION: u8 = 1;

/// Fixed header (20 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Protocol version
    pub version: u8,
    /// Header length in bytes; the payload starts here
    pub header_length: u8,
    /// Flags
    pub flags: FrameFlags,
    /// 1-based sequence number within the buffer (0 for control frames)
    pub frame_number: u32,
    /// Offset of this payload within the reconstructed buffer
    pub frame_offset: u32,
    /// Payload length carried by this frame
    pub frame_length: u32,
    /// Total length of the buffer being reconstructed
    pub buffer_length: u32,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            header_length: HEADER_SIZE as u8,
            flags: FrameFlags::new(),
            frame_number: 0,
            frame_offset: 0,
            frame_length: 0,
            buffer_length: 0,
        }
    }
}

impl FrameHeader {
    /// Header for a payload-less control frame carrying `flag`
    pub fn control(flag: u16) -> Self {
        Self {
            flags: FrameFlags::new().with(flag),
            ..Self::default()
        }
    }

    /// Encode to bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = self.version;
        bytes[1] = self.header_length;
        bytes[2..4].copy_from_slice(&self.flags.bits().to_le_bytes());
        bytes[4..8].copy_from_slice(&self.frame_number.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.frame_offset.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.frame_length.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.buffer_length.to_le_bytes());
        bytes
    }

    /// Decode from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(AtpError::InvalidFrame(format!(
                "Header too short: {} < {}",
                bytes.len(),
                HEADER_SIZE
            )));
        }

        let version = bytes[0];
        if version != PROTOCOL_VERSION {
            return Err(AtpError::InvalidFrame(format!(
                "Unsupported protocol version {version}"
            )));
        }

        let header_length = bytes[1];
        if (header_length as usize) < HEADER_SIZE {
            return Err(AtpError::InvalidFrame(format!(
                "Header length {header_length} below minimum {HEADER_SIZE}"
            )));
        }

        Ok(Self {
            version,
            header_length,
            flags: FrameFlags::from_bits(u16::from_le_bytes([bytes[2], bytes[3]])),
            frame_number: read_u32(bytes, 4),
            frame_offset: read_u32(bytes, 8),
            frame_length: read_u32(bytes, 12),
            buffer_length: read_u32(bytes, 16),
        })
    }

    /// End of this frame's range in the reconstructed buffer, if it fits in u32
    pub fn frame_end(&self) -> Option<u32> {
        self.frame_offset.checked_add(self.frame_length)
    }

    /// `frame_offset + frame_length <= buffer_length`
    pub fn is_within_buffer(&self) -> bool {
        self.frame_end().is_some_and(|end| end <= self.buffer_length)
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} #{} [{}] {}+{}/{}",
            self.version,
            self.frame_number,
            self.flags,
            self.frame_offset,
            self.frame_length,
            self.buffer_length
        )
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
