//! Transport abstraction for ATP sessions.
//!
//! The protocol needs exactly one primitive from the channel underneath it:
//! send one frame, receive one frame. Anything that can do that implements
//! [`Exchange`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               Initiator                 │
//! │          (Transport-Agnostic)           │
//! └──────────────────┬──────────────────────┘
//!                    │ Exchange::exchange
//!          ┌─────────┴─────────┐
//!          ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐
//! │LoopbackTransport│ │  FnMut closure  │
//! │ (in-process RX) │ │   (any link)    │
//! └─────────────────┘ └─────────────────┘
//! ```

mod loopback;

pub use loopback::LoopbackTransport;

use crate::codec::Frame;
use crate::error::Result;

/// One synchronous request/reply round trip.
///
/// Implementations either return the peer's reply or fail; a failure ends
/// the current transfer.
pub trait Exchange {
    /// Send `request` and wait for the single frame that answers it.
    fn exchange(&mut self, request: &Frame) -> Result<Frame>;
}

impl<F> Exchange for F
where
    F: FnMut(&Frame) -> Result<Frame>,
{
    fn exchange(&mut self, request: &Frame) -> Result<Frame> {
        self(request)
    }
}
