//! Relay configuration

use std::time::Duration;

/// Room code used when a client connects without naming a room
pub const DEFAULT_ROOM_CODE: &str = "DEFAULT";

/// How long a membership stays eligible for store-side expiry
pub const DEFAULT_MEMBERSHIP_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Relay configuration options
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Sentinel room code substituted when a client supplies none
    pub default_room_code: String,

    /// Expiry horizon stamped on each membership at join time.
    /// A cleanup hint for the store, not a liveness guarantee.
    pub membership_ttl: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_room_code: DEFAULT_ROOM_CODE.to_string(),
            membership_ttl: DEFAULT_MEMBERSHIP_TTL,
        }
    }
}

impl RelayConfig {
    /// Set the sentinel room code
    pub fn default_room(mut self, code: impl Into<String>) -> Self {
        self.default_room_code = code.into();
        self
    }

    /// Set the membership expiry horizon
    pub fn membership_ttl(mut self, ttl: Duration) -> Self {
        self.membership_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.default_room_code, "DEFAULT");
        assert_eq!(config.membership_ttl, Duration::from_secs(86400));
    }

    #[test]
    fn test_builder() {
        let config = RelayConfig::default()
            .default_room("lobby")
            .membership_ttl(Duration::from_secs(60));
        assert_eq!(config.default_room_code, "lobby");
        assert_eq!(config.membership_ttl, Duration::from_secs(60));
    }
}
