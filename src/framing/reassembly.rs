//! Reassembly of an inbound frame stream into one buffer.

use bytes::Bytes;

use crate::codec::Frame;
use crate::error::{AtpError, Result};

/// Accumulator that maps frames back onto one contiguous buffer.
///
/// The buffer is allocated lazily from the first frame's `buffer_length` and
/// exactly once per transfer. Every later frame must agree on that length.
#[derive(Debug, Clone)]
pub struct BufferContext {
    buffer: Vec<u8>,
    allocated: bool,
    highest_frame_number: u32,
    max_buffer_length: usize,
}

impl BufferContext {
    /// Create an empty context that refuses buffers above `max_buffer_length`
    pub fn new(max_buffer_length: usize) -> Self {
        Self {
            buffer: Vec::new(),
            allocated: false,
            highest_frame_number: 0,
            max_buffer_length,
        }
    }

    /// Whether the first frame of a transfer has been folded in
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Length of the buffer being reconstructed (0 before allocation)
    pub fn buffer_length(&self) -> usize {
        self.buffer.len()
    }

    /// Highest frame number folded so far
    pub fn highest_frame_number(&self) -> u32 {
        self.highest_frame_number
    }

    /// Copy one DATA frame into the buffer.
    ///
    /// Returns `true` when the frame carried LAST, which is the only
    /// completion signal. A frame that fails validation leaves the context
    /// untouched.
    pub fn fold(&mut self, frame: &Frame) -> Result<bool> {
        let header = &frame.header;
        let buffer_length = header.buffer_length as usize;

        if buffer_length == 0 {
            return Err(AtpError::violation("non-empty buffer", "buffer_length 0"));
        }
        if self.allocated && buffer_length != self.buffer.len() {
            return Err(AtpError::violation(
                "consistent buffer_length",
                format!(
                    "buffer_length {} mid-transfer of {}",
                    buffer_length,
                    self.buffer.len()
                ),
            ));
        }
        if !header.is_within_buffer() {
            return Err(AtpError::violation(
                "frame within buffer",
                format!("frame {header}"),
            ));
        }
        if frame.payload.len() != header.frame_length as usize {
            return Err(AtpError::violation(
                "payload matching frame_length",
                format!(
                    "{} payload bytes for frame_length {}",
                    frame.payload.len(),
                    header.frame_length
                ),
            ));
        }

        if !self.allocated {
            if buffer_length > self.max_buffer_length {
                return Err(AtpError::violation(
                    "buffer within configured limit",
                    format!(
                        "buffer_length {} > {}",
                        buffer_length, self.max_buffer_length
                    ),
                ));
            }
            self.allocate(buffer_length)?;
        }

        let start = header.frame_offset as usize;
        self.buffer[start..start + frame.payload.len()].copy_from_slice(&frame.payload);

        if header.frame_number <= self.highest_frame_number {
            tracing::debug!(
                "Frame {} arrived after frame {}",
                header.frame_number,
                self.highest_frame_number
            );
        }
        self.highest_frame_number = self.highest_frame_number.max(header.frame_number);

        Ok(header.flags.is_last())
    }

    fn allocate(&mut self, len: usize) -> Result<()> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| AtpError::Allocation {
                what: "reassembly buffer",
                requested: len,
            })?;
        buffer.resize(len, 0);
        self.buffer = buffer;
        self.allocated = true;
        Ok(())
    }

    /// Hand out the reconstructed buffer and reset for the next transfer
    pub fn take(&mut self) -> Option<Bytes> {
        if !self.allocated {
            return None;
        }
        let buffer = std::mem::take(&mut self.buffer);
        self.reset();
        Some(Bytes::from(buffer))
    }

    /// Drop any partial buffer and reset for the next transfer
    pub fn release(&mut self) {
        self.buffer = Vec::new();
        self.reset();
    }

    fn reset(&mut self) {
        self.allocated = false;
        self.highest_frame_number = 0;
    }
}
