//! Receive session: accumulates a request and serves the response on demand.

use bytes::Bytes;

use super::stats::{Role, SessionStats};
use crate::codec::Frame;
use crate::config::FramingConfig;
use crate::error::{AtpError, Result};
use crate::framing::{BufferContext, FrameQueue, Framer};

/// Application hook that turns a complete request into a response.
pub trait RequestProcessor {
    /// Process one request buffer. The returned buffer must not be empty.
    fn process(&mut self, request: &[u8]) -> Result<Vec<u8>>;
}

impl<F> RequestProcessor for F
where
    F: FnMut(&[u8]) -> Result<Vec<u8>>,
{
    fn process(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        self(request)
    }
}

/// Per-connection responder state.
///
/// Created when the connection opens, reset by every HANDSHAKE, dropped when
/// the connection closes. Each inbound frame produces exactly one reply or
/// an error. After an error the session keeps whatever transfer it was in;
/// a HANDSHAKE always brings it back to a clean state.
pub struct Responder<P> {
    processor: P,
    framer: Framer,
    request: BufferContext,
    response: FrameQueue,
    cursor: usize,
    expecting_get_next_frame: bool,
    stats: SessionStats,
}

impl<P: RequestProcessor> Responder<P> {
    /// Create a responder that segments responses with the configured
    /// response packet size.
    pub fn new(processor: P, config: &FramingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            processor,
            framer: Framer::new(config.response_payload_size())?,
            request: BufferContext::new(config.max_buffer_length),
            response: FrameQueue::new(),
            cursor: 0,
            expecting_get_next_frame: false,
            stats: SessionStats::new(uuid::Uuid::new_v4().to_string(), Role::Responder),
        })
    }

    /// Get session ID
    pub fn id(&self) -> &str {
        &self.stats.session_id
    }

    /// Get session statistics
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Whether a response is mid-delivery and the next frame must be GNF
    pub fn is_expecting_get_next_frame(&self) -> bool {
        self.expecting_get_next_frame
    }

    /// Response frames queued but not yet handed out
    pub fn pending_response_frames(&self) -> usize {
        if self.expecting_get_next_frame {
            self.response.len() - self.cursor - 1
        } else {
            0
        }
    }

    /// Whether part of a request has been accumulated
    pub fn has_partial_request(&self) -> bool {
        self.request.is_allocated()
    }

    /// Handle one inbound frame and produce the frame to send back.
    pub fn handle(&mut self, frame: &Frame) -> Result<Frame> {
        self.stats.record_received(frame.payload.len());
        tracing::trace!("[{}] <- {}", self.stats.session_id, frame.header);

        let result = if frame.is_handshake() {
            Ok(self.restart())
        } else if self.expecting_get_next_frame {
            self.next_response_frame(frame)
        } else {
            self.accumulate_request(frame)
        };

        match &result {
            Ok(reply) => {
                self.stats.record_sent(reply.payload.len());
                tracing::trace!("[{}] -> {}", self.stats.session_id, reply.header);
            },
            Err(e) => {
                self.stats.failures += 1;
                tracing::warn!("[{}] rejected frame {}: {}", self.stats.session_id, frame.header, e);
            },
        }
        result
    }

    /// Dispatcher entry point: decode one packet, handle it, encode the reply.
    ///
    /// Returns `None` when no reply frame could be produced.
    pub fn handle_packet(&mut self, packet: &[u8]) -> Option<Bytes> {
        let frame = match Frame::decode(packet) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.failures += 1;
                tracing::warn!("[{}] undecodable packet: {}", self.stats.session_id, e);
                return None;
            },
        };

        self.handle(&frame).and_then(|reply| reply.encode()).ok()
    }

    fn restart(&mut self) -> Frame {
        if self.expecting_get_next_frame {
            tracing::debug!(
                "[{}] handshake mid-response, dropping {} queued frames",
                self.stats.session_id,
                self.pending_response_frames()
            );
            self.response.release();
        } else if self.request.is_allocated() {
            tracing::debug!(
                "[{}] handshake mid-request, dropping partial buffer",
                self.stats.session_id
            );
            self.request.release();
        }
        self.expecting_get_next_frame = false;
        self.cursor = 0;
        self.stats.handshakes += 1;

        Frame::get_next_frame()
    }

    fn next_response_frame(&mut self, frame: &Frame) -> Result<Frame> {
        if !frame.is_get_next_frame() {
            return Err(AtpError::violation(
                "GET_NEXT_FRAME",
                frame.flags().to_string(),
            ));
        }

        let next = self.cursor + 1;
        let Some(reply) = self.response.get(next).cloned() else {
            self.expecting_get_next_frame = false;
            self.response.release();
            return Err(AtpError::NullInput("queued response frame"));
        };
        self.cursor = next;

        if self.response.is_tail(next) {
            self.finish_response();
        }
        Ok(reply)
    }

    fn accumulate_request(&mut self, frame: &Frame) -> Result<Frame> {
        if !frame.is_data() {
            return Err(AtpError::violation("DATA", frame.flags().to_string()));
        }

        if !self.request.fold(frame)? {
            return Ok(Frame::get_next_frame());
        }

        let request = self
            .request
            .take()
            .ok_or(AtpError::NullInput("request buffer"))?;
        tracing::debug!(
            "[{}] request complete: {} bytes",
            self.stats.session_id,
            request.len()
        );

        let response = self.processor.process(&request)?;
        drop(request);
        if response.is_empty() {
            return Err(AtpError::NullInput("response buffer is empty"));
        }

        let queue = self.framer.split(Bytes::from(response))?;
        let head = queue
            .head()
            .cloned()
            .ok_or(AtpError::NullInput("response frame"))?;

        self.response = queue;
        self.cursor = 0;
        if self.response.is_tail(0) {
            self.finish_response();
        } else {
            self.expecting_get_next_frame = true;
        }
        Ok(head)
    }

    fn finish_response(&mut self) {
        self.expecting_get_next_frame = false;
        self.response.release();
        self.cursor = 0;
        self.stats.transfers_completed += 1;
    }
}

impl<P> std::fmt::Debug for Responder<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("id", &self.stats.session_id)
            .field("expecting_get_next_frame", &self.expecting_get_next_frame)
            .field("cursor", &self.cursor)
            .field("queued", &self.response.len())
            .finish_non_exhaustive()
    }
}
