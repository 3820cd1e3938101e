//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for the `atp` binary)
//!
//! The packet sizes describe the transport envelope that carries one frame
//! per round trip. The usable payload per frame is the packet size minus the
//! fixed frame header.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::HEADER_SIZE;
use crate::error::{AtpError, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Framing configuration
    #[serde(default)]
    pub framing: FramingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AtpError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AtpError::Config(format!("Failed to parse config: {e}")))?;
        config.framing.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = env_usize("ATP_REQUEST_PACKET_SIZE") {
            config.framing.request_packet_size = size;
        }
        if let Some(size) = env_usize("ATP_RESPONSE_PACKET_SIZE") {
            config.framing.response_packet_size = size;
        }
        if let Some(limit) = env_usize("ATP_MAX_BUFFER_LENGTH") {
            config.framing.max_buffer_length = limit;
        }

        config
    }

    /// Merge with another config (other takes precedence where it differs
    /// from the defaults)
    pub fn merge(self, other: Self) -> Self {
        let defaults = FramingConfig::default();
        let pick = |mine: usize, theirs: usize, default: usize| {
            if theirs != default {
                theirs
            } else {
                mine
            }
        };

        Self {
            framing: FramingConfig {
                request_packet_size: pick(
                    self.framing.request_packet_size,
                    other.framing.request_packet_size,
                    defaults.request_packet_size,
                ),
                response_packet_size: pick(
                    self.framing.response_packet_size,
                    other.framing.response_packet_size,
                    defaults.response_packet_size,
                ),
                max_buffer_length: pick(
                    self.framing.max_buffer_length,
                    other.framing.max_buffer_length,
                    defaults.max_buffer_length,
                ),
            },
        }
    }

    /// Default config file location (`<config dir>/atp/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("atp").join("config.toml"))
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a byte count", key, value);
            None
        },
    }
}

/// Frame sizing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Packet size of the initiator-to-responder direction
    pub request_packet_size: usize,

    /// Packet size of the responder-to-initiator direction
    pub response_packet_size: usize,

    /// Largest buffer a peer may announce in `buffer_length`
    pub max_buffer_length: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            request_packet_size: 2048,
            response_packet_size: 2048,
            max_buffer_length: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl FramingConfig {
    /// Build with the same packet size in both directions
    pub fn with_packet_size(packet_size: usize) -> Self {
        Self {
            request_packet_size: packet_size,
            response_packet_size: packet_size,
            ..Self::default()
        }
    }

    /// Largest packet whose payload length still fits the u32 wire field
    pub const MAX_PACKET_SIZE: usize = (u32::MAX as usize).saturating_add(HEADER_SIZE);

    /// Check that every packet can hold a header plus at least one byte, and
    /// that its payload length can be described on the wire
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [
            ("request_packet_size", self.request_packet_size),
            ("response_packet_size", self.response_packet_size),
        ] {
            if size <= HEADER_SIZE {
                return Err(AtpError::Config(format!(
                    "{name} {size} must exceed the {HEADER_SIZE}-byte frame header"
                )));
            }
            if size > Self::MAX_PACKET_SIZE {
                return Err(AtpError::Config(format!(
                    "{name} {size} exceeds the maximum of {}",
                    Self::MAX_PACKET_SIZE
                )));
            }
        }
        if self.max_buffer_length == 0 {
            return Err(AtpError::Config(
                "max_buffer_length must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Payload bytes per request frame
    pub fn request_payload_size(&self) -> usize {
        self.request_packet_size.saturating_sub(HEADER_SIZE)
    }

    /// Payload bytes per response frame
    pub fn response_payload_size(&self) -> usize {
        self.response_packet_size.saturating_sub(HEADER_SIZE)
    }
}
