//! Transmit session: sends a request buffer and pulls the response back.

use bytes::Bytes;

use super::stats::{Role, SessionStats};
use crate::codec::Frame;
use crate::config::FramingConfig;
use crate::error::{AtpError, Result};
use crate::framing::{BufferContext, FrameQueue, Framer};
use crate::transport::Exchange;

/// Initiator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorState {
    /// No transfer started yet
    Idle,
    /// HANDSHAKE sent, waiting for GET_NEXT_FRAME
    Handshaking,
    /// Request frame at this queue index is in flight
    SendingRequest(usize),
    /// This many response frames received so far
    AwaitingResponse(u32),
    /// Last transfer delivered its response
    Complete,
    /// Last transfer failed
    Failed,
}

/// Initiator session driving one [`Exchange`] transport.
///
/// Each [`send`](Self::send) is one full cycle: handshake, request frames,
/// response frames. Only one frame is ever in flight.
pub struct Initiator<T> {
    transport: T,
    framer: Framer,
    state: InitiatorState,
    request: FrameQueue,
    cursor: usize,
    response: BufferContext,
    stats: SessionStats,
}

impl<T: Exchange> Initiator<T> {
    /// Create an initiator that segments requests with the configured
    /// request packet size.
    pub fn new(transport: T, config: &FramingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            framer: Framer::new(config.request_payload_size())?,
            state: InitiatorState::Idle,
            request: FrameQueue::new(),
            cursor: 0,
            response: BufferContext::new(config.max_buffer_length),
            stats: SessionStats::new(uuid::Uuid::new_v4().to_string(), Role::Initiator),
        })
    }

    /// Get session ID
    pub fn id(&self) -> &str {
        &self.stats.session_id
    }

    /// Get current state
    pub fn state(&self) -> InitiatorState {
        self.state
    }

    /// Get session statistics
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Whether part of a response has been reassembled
    pub fn has_partial_response(&self) -> bool {
        self.response.is_allocated()
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Tear the session down, returning the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Send `buffer` as one request and return the complete response.
    ///
    /// The buffer is consumed. An empty buffer fails before the transport is
    /// touched. On any failure the request queue and the partial response
    /// are released and the state becomes [`InitiatorState::Failed`]; the
    /// next call starts again with a fresh handshake.
    pub fn send(&mut self, buffer: impl Into<Bytes>) -> Result<Bytes> {
        let buffer = buffer.into();

        let result = if buffer.is_empty() {
            Err(AtpError::NullInput("request buffer is empty"))
        } else {
            self.transfer(buffer)
        };

        match result {
            Ok(response) => {
                self.state = InitiatorState::Complete;
                self.stats.transfers_completed += 1;
                tracing::debug!(
                    "[{}] transfer complete: {} response bytes",
                    self.stats.session_id,
                    response.len()
                );
                Ok(response)
            },
            Err(e) => {
                self.request.release();
                self.response.release();
                self.cursor = 0;
                self.state = InitiatorState::Failed;
                self.stats.failures += 1;
                tracing::warn!("[{}] transfer failed: {}", self.stats.session_id, e);
                Err(e)
            },
        }
    }

    fn transfer(&mut self, buffer: Bytes) -> Result<Bytes> {
        self.request = self.framer.split(buffer)?;
        self.cursor = 0;
        self.response.release();

        self.handshake()?;

        // Request phase: every frame but the tail is acknowledged with GNF.
        let mut reply = loop {
            self.state = InitiatorState::SendingRequest(self.cursor);
            let reply = round_trip(
                &mut self.transport,
                &mut self.stats,
                &self.request[self.cursor],
            )?;

            if self.request.is_tail(self.cursor) {
                break reply;
            }
            if !reply.is_get_next_frame() {
                return Err(AtpError::violation(
                    "GET_NEXT_FRAME",
                    reply.flags().to_string(),
                ));
            }
            self.cursor += 1;
        };
        self.request.release();

        // Response phase: pull DATA frames until LAST.
        let mut received = 0u32;
        loop {
            if !reply.is_data() {
                return Err(AtpError::violation("DATA", reply.flags().to_string()));
            }
            received += 1;
            self.state = InitiatorState::AwaitingResponse(received);

            if self.response.fold(&reply)? {
                return self
                    .response
                    .take()
                    .ok_or(AtpError::NullInput("response buffer"));
            }

            reply = round_trip(&mut self.transport, &mut self.stats, &Frame::get_next_frame())?;
        }
    }

    fn handshake(&mut self) -> Result<()> {
        self.state = InitiatorState::Handshaking;
        self.stats.handshakes += 1;

        let reply = round_trip(&mut self.transport, &mut self.stats, &Frame::handshake())?;
        if !reply.is_get_next_frame() {
            return Err(AtpError::violation(
                "GET_NEXT_FRAME after HANDSHAKE",
                reply.flags().to_string(),
            ));
        }
        tracing::debug!("[{}] handshake acknowledged", self.stats.session_id);
        Ok(())
    }
}

impl<T> std::fmt::Debug for Initiator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Initiator")
            .field("id", &self.stats.session_id)
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("queued", &self.request.len())
            .finish_non_exhaustive()
    }
}

fn round_trip<T: Exchange>(
    transport: &mut T,
    stats: &mut SessionStats,
    frame: &Frame,
) -> Result<Frame> {
    tracing::trace!("[{}] -> {}", stats.session_id, frame.header);
    stats.record_sent(frame.payload.len());

    let reply = transport.exchange(frame)?;

    tracing::trace!("[{}] <- {}", stats.session_id, reply.header);
    stats.record_received(reply.payload.len());
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{FrameFlags, FrameHeader};

    fn config() -> FramingConfig {
        FramingConfig::with_packet_size(crate::codec::HEADER_SIZE + 4)
    }

    fn response_frame(payload: &'static [u8], total: u32, offset: u32, last: bool) -> Frame {
        let mut flags = FrameFlags::new().with(FrameFlags::DATA);
        if last {
            flags.set(FrameFlags::LAST);
        }
        Frame {
            header: FrameHeader {
                flags,
                frame_number: offset / 4 + 1,
                frame_offset: offset,
                frame_length: payload.len() as u32,
                buffer_length: total,
                ..FrameHeader::default()
            },
            payload: Bytes::from_static(payload),
        }
    }

    #[test]
    fn test_empty_buffer_never_touches_transport() {
        let mut calls = 0;
        let mut initiator = Initiator::new(
            |_: &Frame| -> Result<Frame> {
                calls += 1;
                Ok(Frame::get_next_frame())
            },
            &config(),
        )
        .unwrap();

        let err = initiator.send(Vec::new()).unwrap_err();
        assert!(matches!(err, AtpError::NullInput(_)));
        assert_eq!(initiator.state(), InitiatorState::Failed);
        drop(initiator);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_scripted_exchange() {
        // request "abcdefg" -> 2 frames; response "xyz12" -> 2 frames
        let mut script = vec![
            Frame::get_next_frame(),
            Frame::get_next_frame(),
            response_frame(b"xyz1", 5, 0, false),
            response_frame(b"2", 5, 4, true),
        ]
        .into_iter();
        let mut seen = Vec::new();

        let mut initiator = Initiator::new(
            |frame: &Frame| -> Result<Frame> {
                seen.push(frame.flags().to_string());
                script
                    .next()
                    .ok_or_else(|| AtpError::Transport("script exhausted".to_string()))
            },
            &config(),
        )
        .unwrap();

        let response = initiator.send(b"abcdefg".to_vec()).unwrap();
        assert_eq!(response.as_ref(), b"xyz12");
        assert_eq!(initiator.state(), InitiatorState::Complete);
        assert_eq!(initiator.stats().handshakes, 1);
        assert_eq!(initiator.stats().frames_sent, 4);
        assert_eq!(initiator.stats().bytes_sent, 7);
        assert_eq!(initiator.stats().bytes_received, 5);
        drop(initiator);

        assert_eq!(
            seen,
            vec!["HANDSHAKE", "DATA", "DATA|LAST", "GET_NEXT_FRAME"]
        );
    }

    #[test]
    fn test_handshake_needs_get_next_frame() {
        let mut initiator =
            Initiator::new(|_: &Frame| -> Result<Frame> { Ok(Frame::handshake()) }, &config())
                .unwrap();

        let err = initiator.send(b"hi".to_vec()).unwrap_err();
        assert!(err.is_protocol_violation());
        assert_eq!(initiator.state(), InitiatorState::Failed);
        assert_eq!(initiator.stats().failures, 1);
    }

    #[test]
    fn test_transport_failure_is_fatal() {
        let mut initiator = Initiator::new(
            |_: &Frame| -> Result<Frame> { Err(AtpError::Transport("link down".to_string())) },
            &config(),
        )
        .unwrap();

        let err = initiator.send(b"hi".to_vec()).unwrap_err();
        assert!(matches!(err, AtpError::Transport(_)));
        assert_eq!(initiator.state(), InitiatorState::Failed);
    }

    #[test]
    fn test_data_reply_mid_request_is_violation() {
        let mut replies = vec![
            Frame::get_next_frame(),
            response_frame(b"oops", 4, 0, true),
        ]
        .into_iter();
        let mut initiator = Initiator::new(
            move |_: &Frame| -> Result<Frame> {
                replies
                    .next()
                    .ok_or_else(|| AtpError::Transport("exhausted".to_string()))
            },
            &config(),
        )
        .unwrap();

        // 8 bytes -> 2 request frames; the first must be answered with GNF
        let err = initiator.send(b"12345678".to_vec()).unwrap_err();
        assert!(err.is_protocol_violation());
        assert_eq!(initiator.state(), InitiatorState::Failed);
    }

    #[test]
    fn test_gnf_after_last_request_frame_is_violation() {
        let mut initiator =
            Initiator::new(|_: &Frame| -> Result<Frame> { Ok(Frame::get_next_frame()) }, &config())
                .unwrap();

        let err = initiator.send(b"1234".to_vec()).unwrap_err();
        assert!(err.is_protocol_violation());
    }

    #[test]
    fn test_non_data_reply_mid_response_is_violation() {
        // request "abcd" -> 1 frame; response of 8 bytes interrupted by a GNF
        let mut script = vec![
            Frame::get_next_frame(),
            response_frame(b"wxyz", 8, 0, false),
            Frame::get_next_frame(),
            // next transfer
            Frame::get_next_frame(),
            response_frame(b"ok", 2, 0, true),
        ]
        .into_iter();
        let mut initiator = Initiator::new(
            move |_: &Frame| -> Result<Frame> {
                script
                    .next()
                    .ok_or_else(|| AtpError::Transport("script exhausted".to_string()))
            },
            &config(),
        )
        .unwrap();

        let err = initiator.send(b"abcd".to_vec()).unwrap_err();
        assert!(err.is_protocol_violation());
        assert_eq!(initiator.state(), InitiatorState::Failed);
        assert!(!initiator.has_partial_response());

        let response = initiator.send(b"abcd".to_vec()).unwrap();
        assert_eq!(response.as_ref(), b"ok");
        assert_eq!(initiator.state(), InitiatorState::Complete);
        assert_eq!(initiator.stats().failures, 1);
    }

    #[test]
    fn test_transport_failure_mid_response_releases_buffer() {
        let mut script = vec![
            Frame::get_next_frame(),
            response_frame(b"wxyz", 8, 0, false),
        ]
        .into_iter();
        let mut initiator = Initiator::new(
            move |_: &Frame| -> Result<Frame> {
                script
                    .next()
                    .ok_or_else(|| AtpError::Transport("link down".to_string()))
            },
            &config(),
        )
        .unwrap();

        let err = initiator.send(b"abcd".to_vec()).unwrap_err();
        assert!(matches!(err, AtpError::Transport(_)));
        assert_eq!(initiator.state(), InitiatorState::Failed);
        assert!(!initiator.has_partial_response());
        assert_eq!(initiator.stats().bytes_received, 4);
    }
}
