//! Configuration types for dataset-dl

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Submission retry behavior (rate-limited trigger calls only)
///
/// Polling is deliberately unbounded and is not governed by this config;
/// see [`PollConfig`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total trigger attempts before giving up (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base unit for the exponential retry delay (default: 1s)
    ///
    /// Attempt `n` waits `base_delay * 2^n`, so the defaults produce 2s and
    /// 4s between the three trigger attempts.
    #[serde(default = "default_base_delay", with = "duration_secs")]
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
        }
    }
}

/// Status polling behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollConfig {
    /// Fixed delay between successive status checks (default: 5s)
    #[serde(default = "default_poll_interval", with = "duration_secs")]
    pub interval: Duration,

    /// Cadence of the "still processing" progress line for long runs
    /// (default: 30s)
    #[serde(default = "default_progress_interval", with = "duration_secs")]
    pub progress_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            progress_interval: default_progress_interval(),
        }
    }
}

/// Result persistence behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Rename an existing destination to a timestamped `.bak_*` sibling
    /// before writing (default: true)
    #[serde(default = "default_true")]
    pub backup_existing: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            backup_existing: true,
        }
    }
}

/// Main configuration for [`Collector`](crate::Collector)
///
/// Every field has a working default; `Config::default()` targets the
/// Bright Data datasets v3 API. The bearer credential is not part of the
/// config — it is a required constructor parameter so that a missing secret
/// fails at construction, never mid-run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the collection API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout applied to every network call (default: 30s)
    ///
    /// There is intentionally no overall run timeout; job duration is
    /// unbounded and runs are stopped via cancellation instead.
    #[serde(default = "default_request_timeout", with = "duration_secs")]
    pub request_timeout: Duration,

    /// Submission retry behavior
    #[serde(default)]
    pub retry: RetryConfig,

    /// Status polling behavior
    #[serde(default)]
    pub poll: PollConfig,

    /// Result persistence behavior
    #[serde(default)]
    pub sink: SinkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout: default_request_timeout(),
            retry: RetryConfig::default(),
            poll: PollConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.brightdata.com/datasets/v3".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_progress_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

/// Serialize durations as whole seconds for readable config files
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
