//! Per-session counters.

use serde::Serialize;

/// Which side of the channel a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sends requests and pulls responses
    Initiator,
    /// Accumulates requests and serves responses on demand
    Responder,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Responder => write!(f, "responder"),
        }
    }
}

/// Session statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Session ID
    pub session_id: String,
    /// Session role
    pub role: Role,
    /// HANDSHAKE frames sent (initiator) or honored (responder)
    pub handshakes: u64,
    /// Frames sent
    pub frames_sent: u64,
    /// Frames received
    pub frames_received: u64,
    /// Payload bytes sent
    pub bytes_sent: u64,
    /// Payload bytes received
    pub bytes_received: u64,
    /// Request/response cycles that ran to completion
    pub transfers_completed: u64,
    /// Operations that ended in an error
    pub failures: u64,
}

impl SessionStats {
    pub(crate) fn new(session_id: String, role: Role) -> Self {
        Self {
            session_id,
            role,
            handshakes: 0,
            frames_sent: 0,
            frames_received: 0,
            bytes_sent: 0,
            bytes_received: 0,
            transfers_completed: 0,
            failures: 0,
        }
    }

    pub(crate) fn record_sent(&mut self, payload_len: usize) {
        self.frames_sent += 1;
        self.bytes_sent += payload_len as u64;
    }

    pub(crate) fn record_received(&mut self, payload_len: usize) {
        self.frames_received += 1;
        self.bytes_received += payload_len as u64;
    }

    /// Frames exchanged per completed transfer
    pub fn frames_per_transfer(&self) -> f64 {
        if self.transfers_completed == 0 {
            0.0
        } else {
            (self.frames_sent + self.frames_received) as f64 / self.transfers_completed as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counters() {
        let mut stats = SessionStats::new("s".to_string(), Role::Initiator);
        assert_eq!(stats.frames_per_transfer(), 0.0);

        stats.record_sent(100);
        stats.record_received(0);
        stats.record_received(50);
        stats.transfers_completed = 1;

        assert_eq!(stats.frames_sent, 1);
        assert_eq!(stats.bytes_received, 50);
        assert_eq!(stats.frames_per_transfer(), 3.0);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = SessionStats::new("abc".to_string(), Role::Responder);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["role"], "responder");
        assert_eq!(json["session_id"], "abc");
    }
}
