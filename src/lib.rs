//! # ATP - Asynchronous Transfer Protocol framing engine
//!
//! Moves arbitrarily large byte buffers across a channel that can only carry
//! bounded-size packets, one request/reply round trip at a time.
//!
//! ## Features
//!
//! - **Framing**: split a buffer into bounded frames and reassemble them
//! - **Initiator sessions**: handshake, push a request, pull the response
//! - **Responder sessions**: accumulate a request, run a processor, serve
//!   the response on demand
//! - **Wire codec**: fixed 20-byte little-endian frame header
//!
//! ## Protocol Overview
//!
//! Every transfer opens with a HANDSHAKE that resets the responder. Request
//! frames flow one at a time, each acknowledged by GET_NEXT_FRAME; the final
//! request frame (flagged LAST) is answered with the first response frame,
//! and the initiator pulls the rest with GET_NEXT_FRAME.
//!
//! ### Frame Header
//!
//! | Offset | Size | Field           |
//! |--------|------|-----------------|
//! | 0      | 1    | version (1)     |
//! | 1      | 1    | header length   |
//! | 2      | 2    | flags           |
//! | 4      | 4    | frame number    |
//! | 8      | 4    | frame offset    |
//! | 12     | 4    | frame length    |
//! | 16     | 4    | buffer length   |
//!
//! ### Flags
//!
//! | Flag             | Bit    | Meaning                              |
//! |------------------|--------|--------------------------------------|
//! | `DATA`           | 0x0001 | Frame carries payload                |
//! | `LAST`           | 0x0002 | Final frame of the buffer            |
//! | `HANDSHAKE`      | 0x0004 | Start of a new transfer              |
//! | `GET_NEXT_FRAME` | 0x0008 | Acknowledge / request the next frame |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use atp::{FramingConfig, Initiator, LoopbackTransport, Responder};
//!
//! let config = FramingConfig::with_packet_size(1020);
//! let responder = Responder::new(|req: &[u8]| Ok(req.to_ascii_uppercase()), &config)?;
//! let mut initiator = Initiator::new(LoopbackTransport::new(responder), &config)?;
//!
//! let response = initiator.send(vec![b'a'; 4096])?;
//! assert_eq!(response.len(), 4096);
//! ```
//!
//! ## Modules
//!
//! - [`codec`]: Frame header, flags and wire encoding
//! - [`framing`]: Framer, frame queue and reassembly
//! - [`protocol`]: Initiator and responder sessions
//! - [`transport`]: The `Exchange` seam and an in-process loopback
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod codec;
pub mod config;
pub mod error;
pub mod framing;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use codec::{Frame, FrameFlags, FrameHeader, HEADER_SIZE, PROTOCOL_VERSION};
pub use config::{Config, FramingConfig};
pub use error::{AtpError, Result};
pub use framing::{BufferContext, FrameQueue, Framer};
pub use protocol::{Initiator, InitiatorState, RequestProcessor, Responder, Role, SessionStats};
pub use transport::{Exchange, LoopbackTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
