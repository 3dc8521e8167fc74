//! Fetch settings shared by the strategies.
//!
//! Settings are plain values handed to the [`FetcherFactory`](crate::FetcherFactory);
//! nothing here is global.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default rendering service address.
pub const DEFAULT_RENDER_ENDPOINT: &str = "http://127.0.0.1:8050";

/// User agent string for pagefetch.
pub const USER_AGENT: &str = concat!("pagefetch/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for fetch operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Whole-request timeout, including reading the body.
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Timeout for establishing a connection.
    #[serde(with = "secs")]
    pub connect_timeout: Duration,
    /// User agent sent by the direct strategy and to the rendering service.
    pub user_agent: String,
    /// Maximum redirects the direct strategy follows.
    pub max_redirects: usize,
    /// Base URL of the rendering service.
    pub render_endpoint: String,
    /// Seconds the rendering service waits after page load.
    pub render_wait: f64,
    /// Seconds the rendering service may spend on one page.
    pub render_timeout: f64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            max_redirects: 10,
            render_endpoint: DEFAULT_RENDER_ENDPOINT.to_string(),
            render_wait: 0.5,
            render_timeout: 30.0,
        }
    }
}

impl FetchSettings {
    /// Creates default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the redirect limit.
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Sets the rendering service address.
    pub fn with_render_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.render_endpoint = endpoint.into();
        self
    }

    /// Sets the post-load wait of the rendering service.
    pub fn with_render_wait(mut self, secs: f64) -> Self {
        self.render_wait = secs;
        self
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = FetchSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
        assert_eq!(settings.render_endpoint, "http://127.0.0.1:8050");
        assert!(settings.user_agent.starts_with("pagefetch/"));
    }

    #[test]
    fn test_builder() {
        let settings = FetchSettings::new()
            .with_timeout(Duration::from_secs(5))
            .with_render_endpoint("http://render:8050")
            .with_max_redirects(0);

        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.render_endpoint, "http://render:8050");
        assert_eq!(settings.max_redirects, 0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: FetchSettings =
            serde_json::from_str(r#"{"timeout": 12, "render_wait": 2.0}"#).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(12));
        assert_eq!(settings.render_wait, 2.0);
        assert_eq!(settings.max_redirects, 10);
    }
}
