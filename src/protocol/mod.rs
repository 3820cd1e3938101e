//! ATP sessions: the initiator and responder state machines.
//!
//! A transfer is strictly lock-step. Every frame the initiator sends gets
//! exactly one frame back, and only one frame is ever in flight.
//!
//! ## Message Flow
//!
//! ```text
//! Initiator                          Responder
//!    |                                  |
//!    |-------- HANDSHAKE -------------->|  Discard any previous transfer
//!    |<------- GET_NEXT_FRAME ----------|
//!    |                                  |
//!    |-------- DATA #1 ---------------->|  Request frames
//!    |<------- GET_NEXT_FRAME ----------|
//!    |-------- DATA|LAST #n ----------->|  Request complete, processor runs
//!    |                                  |
//!    |<------- DATA #1 -----------------|  First response frame
//!    |-------- GET_NEXT_FRAME --------->|
//!    |<------- DATA|LAST #m ------------|  Response complete
//! ```
//!
//! ## Initiator States
//!
//! | State              | Description                              |
//! |--------------------|------------------------------------------|
//! | `Idle`             | No transfer started                      |
//! | `Handshaking`      | HANDSHAKE sent, waiting for GNF          |
//! | `SendingRequest`   | Request frame in flight                  |
//! | `AwaitingResponse` | Pulling response frames                  |
//! | `Complete`         | Last transfer delivered its response     |
//! | `Failed`           | Last transfer failed, buffers released   |
//!
//! The responder has no explicit state enum. It is either accumulating a
//! request or delivering a response, tracked by whether a GET_NEXT_FRAME
//! is expected next.
//!
//! # Usage
//!
//! ```rust,ignore
//! use atp::config::FramingConfig;
//! use atp::protocol::{Initiator, Responder};
//! use atp::transport::LoopbackTransport;
//!
//! let config = FramingConfig::default();
//! let responder = Responder::new(|req: &[u8]| Ok(req.to_vec()), &config)?;
//! let mut initiator = Initiator::new(LoopbackTransport::new(responder), &config)?;
//!
//! let response = initiator.send(b"hello".to_vec())?;
//! assert_eq!(response.as_ref(), b"hello");
//! ```

mod initiator;
mod responder;
mod stats;

pub use initiator::{Initiator, InitiatorState};
pub use responder::{RequestProcessor, Responder};
pub use stats::{Role, SessionStats};
