//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token-bucket limits applied to every API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Tunables of the console client.
///
/// The defaults mirror the web console: 30 children per tree page, an
/// unpaged depth-1 root listing and a 50-entry object cache.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Children fetched per page of a paginated tree node.
    pub page_size: u32,
    /// Page size of the root listing (large enough to be unpaged).
    pub root_page_size: u32,
    /// Depth of the root listing.
    pub max_depth: u32,
    /// Capacity of the object cache.
    pub cache_capacity: usize,
    /// Per-request timeout.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Optional client-side rate limit.
    pub rate_limit: Option<RateLimitConfig>,
    /// Accept self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: 30,
            root_page_size: 99_999,
            max_depth: 1,
            cache_capacity: 50,
            request_timeout: Duration::from_secs(30),
            rate_limit: None,
            accept_invalid_certs: false,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
