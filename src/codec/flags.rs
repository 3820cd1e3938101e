//! Flag definitions for the ATP frame header.
//!
//! Flags are stored as a 16-bit bitfield in the fixed header.
//! - Bit 0: DATA, the frame carries payload bytes
//! - Bit 1: LAST, final frame of a buffer
//! - Bit 2: HANDSHAKE, (re)start a logical session
//! - Bit 3: GET_NEXT_FRAME, ask the peer for its next queued frame
//! - Bits 4-15: Reserved

use std::fmt;

/// Frame flags (16 bits)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FrameFlags(u16);

#[allow(missing_docs)]
impl FrameFlags {
    /// Frame carries a slice of a buffer
    pub const DATA: u16 = 1 << 0;
    /// Frame completes its buffer
    pub const LAST: u16 = 1 << 1;
    /// Session (re)start request
    pub const HANDSHAKE: u16 = 1 << 2;
    /// Request for the peer's next queued frame
    pub const GET_NEXT_FRAME: u16 = 1 << 3;

    const NAMES: [(u16, &'static str); 4] = [
        (Self::DATA, "DATA"),
        (Self::LAST, "LAST"),
        (Self::HANDSHAKE, "HANDSHAKE"),
        (Self::GET_NEXT_FRAME, "GET_NEXT_FRAME"),
    ];

    /// Create new empty flags
    pub fn new() -> Self {
        Self(0)
    }

    /// Create from raw bits
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Set a flag
    pub fn set(&mut self, flag: u16) {
        self.0 |= flag;
    }

    /// Clear a flag
    pub fn clear(&mut self, flag: u16) {
        self.0 &= !flag;
    }

    /// Check if flag is set
    pub fn has(&self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, flag: u16) -> Self {
        self.set(flag);
        self
    }

    pub fn is_data(&self) -> bool {
        self.has(Self::DATA)
    }

    pub fn is_last(&self) -> bool {
        self.has(Self::LAST)
    }

    pub fn is_handshake(&self) -> bool {
        self.has(Self::HANDSHAKE)
    }

    pub fn is_get_next_frame(&self) -> bool {
        self.has(Self::GET_NEXT_FRAME)
    }
}

impl fmt::Display for FrameFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Self::NAMES
            .iter()
            .filter(|(bit, _)| self.has(*bit))
            .map(|(_, name)| *name)
            .peekable();

        if names.peek().is_none() {
            return write!(f, "NONE({:#06x})", self.0);
        }

        let joined: Vec<&str> = names.collect();
        write!(f, "{}", joined.join("|"))
    }
}
