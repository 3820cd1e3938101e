//! In-process transport that hands every frame straight to a [`Responder`].
//!
//! Frames still go through the wire codec in both directions, so the
//! responder sees exactly the bytes a network peer would.

use crate::codec::Frame;
use crate::error::{AtpError, Result};
use crate::protocol::{RequestProcessor, Responder};

use super::Exchange;

/// Loopback link to an owned responder
#[derive(Debug)]
pub struct LoopbackTransport<P> {
    responder: Responder<P>,
    round_trips: u64,
}

impl<P: RequestProcessor> LoopbackTransport<P> {
    /// Wrap a responder
    pub fn new(responder: Responder<P>) -> Self {
        Self {
            responder,
            round_trips: 0,
        }
    }

    /// Borrow the responder
    pub fn responder(&self) -> &Responder<P> {
        &self.responder
    }

    /// Mutably borrow the responder
    pub fn responder_mut(&mut self) -> &mut Responder<P> {
        &mut self.responder
    }

    /// Unwrap into the responder
    pub fn into_responder(self) -> Responder<P> {
        self.responder
    }

    /// Round trips that produced a reply
    pub fn round_trips(&self) -> u64 {
        self.round_trips
    }
}

impl<P: RequestProcessor> Exchange for LoopbackTransport<P> {
    fn exchange(&mut self, request: &Frame) -> Result<Frame> {
        let packet = request.encode()?;
        let reply = self.responder.handle_packet(&packet).ok_or_else(|| {
            AtpError::Transport(format!("responder produced no reply to {}", request.header))
        })?;
        self.round_trips += 1;
        Frame::decode(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FramingConfig;

    fn echo(request: &[u8]) -> Result<Vec<u8>> {
        Ok(request.to_vec())
    }

    #[test]
    fn test_loopback_handshake() {
        let responder = Responder::new(echo, &FramingConfig::default()).unwrap();
        let mut transport = LoopbackTransport::new(responder);

        let reply = transport.exchange(&Frame::handshake()).unwrap();
        assert!(reply.is_get_next_frame());
        assert_eq!(transport.round_trips(), 1);
        assert_eq!(transport.responder().stats().handshakes, 1);
    }

    #[test]
    fn test_loopback_rejected_frame_is_transport_error() {
        let responder = Responder::new(echo, &FramingConfig::default()).unwrap();
        let mut transport = LoopbackTransport::new(responder);

        let err = transport.exchange(&Frame::get_next_frame()).unwrap_err();
        assert!(matches!(err, AtpError::Transport(_)));
        assert_eq!(transport.round_trips(), 0);
        assert_eq!(transport.into_responder().stats().failures, 1);
    }
}
