//! Ordered, owned frame queue for one buffer.

use std::ops::Index;

use crate::codec::Frame;

/// Frames of one buffer in send order.
///
/// The queue exclusively owns its frames until it is released, either by
/// [`release`](Self::release) or by being dropped. Frames are addressed by
/// index, so a session keeps a plain `usize` cursor instead of a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameQueue {
    frames: Vec<Frame>,
}

impl FrameQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Number of frames in the queue
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when the queue holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// First frame, if any
    pub fn head(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Final frame, if any
    pub fn tail(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Frame at `index`, if any
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Whether `index` addresses the final frame
    pub fn is_tail(&self, index: usize) -> bool {
        index + 1 == self.frames.len()
    }

    /// Iterate head to tail (reverse with `.rev()`)
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Total payload bytes held by the queue
    pub fn payload_bytes(&self) -> usize {
        self.frames.iter().map(|f| f.payload.len()).sum()
    }

    /// Free every frame and payload, head to tail. Safe on an empty queue.
    pub fn release(&mut self) {
        self.frames.clear();
        self.frames.shrink_to_fit();
    }
}

impl Index<usize> for FrameQueue {
    type Output = Frame;

    fn index(&self, index: usize) -> &Frame {
        &self.frames[index]
    }
}

impl<'a> IntoIterator for &'a FrameQueue {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl IntoIterator for FrameQueue {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}
