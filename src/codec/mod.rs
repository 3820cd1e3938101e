//! ATP wire model: frame header, flags, and frame codec.
//!
//! Every frame on the wire is a 20-byte little-endian header followed by
//! `frame_length` payload bytes. See [`header`] for the exact layout.

pub mod flags;
pub mod frame;
pub mod header;

pub use flags::FrameFlags;
pub use frame::Frame;
pub use header::{FrameHeader, HEADER_SIZE, PROTOCOL_VERSION};
