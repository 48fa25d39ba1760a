//! Session configuration.

use std::time::Duration;

/// Server endpoint baked in at build time.
///
/// Set `ROOMLINK_ENDPOINT` when compiling to point release builds at a
/// different server; [`SessionConfig::with_endpoint`] overrides it at runtime.
pub const DEFAULT_ENDPOINT: &str = match option_env!("ROOMLINK_ENDPOINT") {
    Some(endpoint) => endpoint,
    None => "ws://127.0.0.1:8080/",
};

/// Fixed delay between a disconnect and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Longest display name a client may join with, in characters.
pub const MAX_NAME_CHARS: usize = 8;

/// Configuration for one chat session.
///
/// Start from `SessionConfig::default()` and override what you need:
///
/// ```rust
/// use std::time::Duration;
/// use roomlink_session::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_endpoint("ws://chat.internal:9000/")
///     .with_reconnect_delay(Duration::from_secs(1));
/// assert_eq!(config.max_name_chars, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Where to connect. One endpoint per session; there is no failover.
    pub endpoint: String,

    /// How long to wait after a disconnect before reconnecting.
    ///
    /// Fixed, not exponential: every failure waits the same amount.
    pub reconnect_delay: Duration,

    /// Maximum display-name length in characters (Unicode scalar values).
    pub max_name_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_name_chars: MAX_NAME_CHARS,
        }
    }
}

impl SessionConfig {
    /// Sets the server endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the reconnection delay.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the display-name limit.
    pub fn with_max_name_chars(mut self, max: usize) -> Self {
        self.max_name_chars = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(config.max_name_chars, 8);
    }

    #[test]
    fn test_setters_override_single_fields() {
        let config = SessionConfig::default()
            .with_endpoint("ws://example.test/")
            .with_max_name_chars(12);
        assert_eq!(config.endpoint, "ws://example.test/");
        assert_eq!(config.max_name_chars, 12);
        assert_eq!(config.reconnect_delay, DEFAULT_RECONNECT_DELAY);
    }
}
