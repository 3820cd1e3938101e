//! Buffer segmentation into a frame queue.

use bytes::Bytes;

use super::queue::FrameQueue;
use crate::codec::{Frame, FrameFlags, FrameHeader};
use crate::error::{AtpError, Result};

/// Splits buffers into frames of at most `max_payload` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framer {
    max_payload: usize,
}

impl Framer {
    /// Create a framer for payloads of at most `max_payload` bytes.
    pub fn new(max_payload: usize) -> Result<Self> {
        if max_payload == 0 {
            return Err(AtpError::Config(
                "Maximum frame payload must be at least 1 byte".to_string(),
            ));
        }
        Ok(Self { max_payload })
    }

    /// Maximum payload per frame
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Number of frames a buffer of `len` bytes splits into
    pub(crate) fn frame_count(&self, len: usize) -> usize {
        len.div_ceil(self.max_payload)
    }

    /// Split `buffer` into an ordered frame queue.
    ///
    /// Every frame carries DATA and the total buffer length; the final frame
    /// also carries LAST. Payloads are slices of `buffer`, so no bytes are
    /// copied. An empty buffer yields an empty queue.
    ///
    /// If the queue cannot be reserved, nothing built so far is kept and
    /// [`AtpError::Allocation`] is returned.
    pub fn split(&self, buffer: Bytes) -> Result<FrameQueue> {
        let total = buffer.len();
        let buffer_length = u32::try_from(total).map_err(|_| {
            AtpError::InvalidFrame(format!(
                "Buffer of {total} bytes exceeds the wire limit of {} bytes",
                u32::MAX
            ))
        })?;

        let count = self.frame_count(total);
        let mut frames: Vec<Frame> = Vec::new();
        frames
            .try_reserve_exact(count)
            .map_err(|_| AtpError::Allocation {
                what: "frame queue",
                requested: count.saturating_mul(std::mem::size_of::<Frame>()),
            })?;

        let mut offset = 0usize;
        while offset < total {
            let length = self.max_payload.min(total - offset);
            let end = offset + length;

            let mut flags = FrameFlags::new().with(FrameFlags::DATA);
            if end == total {
                flags.set(FrameFlags::LAST);
            }

            frames.push(Frame {
                header: FrameHeader {
                    flags,
                    // count <= total <= u32::MAX, so these conversions are lossless
                    frame_number: (frames.len() + 1) as u32,
                    frame_offset: offset as u32,
                    frame_length: length as u32,
                    buffer_length,
                    ..FrameHeader::default()
                },
                payload: buffer.slice(offset..end),
            });

            offset = end;
        }

        tracing::trace!(
            "Split {} bytes into {} frames of <= {} bytes",
            total,
            frames.len(),
            self.max_payload
        );

        Ok(FrameQueue::from_frames(frames))
    }
}
