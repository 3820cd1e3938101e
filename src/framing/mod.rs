//! Framing primitives shared by both session roles.
//!
//! ```text
//!  buffer ──► Framer::split ──► FrameQueue ──► (session, transport)
//!                                                     │
//!  buffer ◄── BufferContext::take ◄── BufferContext::fold ◄──┘
//! ```
//!
//! - [`Framer`] splits a buffer into frames of at most `P` payload bytes.
//! - [`FrameQueue`] owns those frames until the session releases it.
//! - [`BufferContext`] folds an inbound frame stream back into one buffer.

mod framer;
mod queue;
mod reassembly;

pub use framer::Framer;
pub use queue::FrameQueue;
pub use reassembly::BufferContext;
