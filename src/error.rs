//! ATP error types.
//!
//! Every failure is terminal for the operation that raised it. The kinds map
//! onto how a session recovers:
//!
//! - **Allocation**: a buffer or frame queue could not be reserved. Nothing
//!   partially built survives the failing call.
//! - **Transport**: the exchange collaborator could not carry a frame.
//! - **ProtocolViolation**: the peer sent a frame the current state does not
//!   accept. A responder stays unusable for that transfer until the next
//!   HANDSHAKE; an initiator simply starts over on its next `send`.
//! - **NullInput**: a required value was absent or empty.

use thiserror::Error;

/// ATP protocol errors.
#[derive(Error, Debug)]
pub enum AtpError {
    /// Memory for a buffer or frame queue could not be reserved.
    #[error("Allocation failed: could not reserve {requested} bytes for {what}")]
    Allocation {
        /// What was being allocated.
        what: &'static str,
        /// Number of bytes (or elements) requested.
        requested: usize,
    },

    /// The transport collaborator failed to complete a round trip.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The received frame does not match what the session expected.
    #[error("Protocol violation: expected {expected}, got {got}")]
    ProtocolViolation {
        /// What the session state allowed.
        expected: &'static str,
        /// What actually arrived.
        got: String,
    },

    /// A required input was missing or empty.
    #[error("Missing input: {0}")]
    NullInput(&'static str),

    /// Raw bytes could not be decoded as a frame.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// The request processor failed to produce a response.
    #[error("Processing error: {0}")]
    Processing(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ATP operations
pub type Result<T> = std::result::Result<T, AtpError>;

impl AtpError {
    /// Shorthand for a [`AtpError::ProtocolViolation`].
    pub fn violation(expected: &'static str, got: impl Into<String>) -> Self {
        AtpError::ProtocolViolation {
            expected,
            got: got.into(),
        }
    }

    /// Whether this error came from the peer misbehaving rather than from
    /// local resources.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, AtpError::ProtocolViolation { .. })
    }
}

impl From<toml::de::Error> for AtpError {
    fn from(err: toml::de::Error) -> Self {
        AtpError::Config(err.to_string())
    }
}
