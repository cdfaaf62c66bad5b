//! Transport tuning: ports, timeouts and retry schedule.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the UDP transport.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wizlights_mcp::TransportConfig;
///
/// let config = TransportConfig::default();
/// assert_eq!(config.port, 38899);
/// assert_eq!(config.retry_delay(0), Duration::from_millis(750));
/// assert_eq!(config.retry_delay(10), Duration::from_millis(3000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// UDP port bulbs listen on.
    pub port: u16,
    /// How long to wait for a reply to a single datagram.
    pub request_timeout: Duration,
    /// Extra attempts after the first failed one.
    pub max_retries: u32,
    /// Backoff between attempts; the last entry repeats.
    pub retry_delays: Vec<Duration>,
    /// How long discovery listens for replies.
    pub discovery_timeout: Duration,
}

impl TransportConfig {
    pub const DEFAULT_PORT: u16 = 38899;

    /// Delay before retry number `attempt` (zero-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let idx = (attempt as usize).min(self.retry_delays.len().saturating_sub(1));
        self.retry_delays.get(idx).copied().unwrap_or_default()
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            port: Self::DEFAULT_PORT,
            request_timeout: Duration::from_millis(1000),
            max_retries: 3,
            retry_delays: [750, 1500, 3000].map(Duration::from_millis).to_vec(),
            discovery_timeout: Duration::from_secs(5),
        }
    }
}
