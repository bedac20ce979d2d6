//! Configuration types for asset-relay

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the transfer engine
///
/// Fields are organized into logical sub-configs:
/// - [`transfer`](TransferConfig) — concurrency admission limits per direction
/// - [`http`](HttpConfig) — shared HTTP transport tuning
/// - [`sink`](SinkConfig) — object-storage destination
/// - [`retry`](RetryConfig) — push-side retry/backoff policy
///
/// Transfer and HTTP sub-configs are flattened for a flat serialization format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root of the local staging tree (default: "./staging")
    #[serde(default = "default_staging_root")]
    pub staging_root: PathBuf,

    /// Concurrency admission limits
    #[serde(flatten)]
    pub transfer: TransferConfig,

    /// HTTP transport settings shared by fetcher and sink
    #[serde(flatten)]
    pub http: HttpConfig,

    /// Object-storage sink destination
    #[serde(default)]
    pub sink: SinkConfig,

    /// Retry policy for push attempts
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            staging_root: default_staging_root(),
            transfer: TransferConfig::default(),
            http: HttpConfig::default(),
            sink: SinkConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Concurrency admission limits per transfer direction
///
/// The push limit is the effective admission control for in-flight uploads.
/// It is deliberately a separate knob from the transport's connection pool
/// size ([`HttpConfig::max_idle_connections`]): the pool bounds socket reuse,
/// this bounds how many push operations run at once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Maximum concurrent fetch operations (default: 8)
    ///
    /// Fetches share no retry budget, so a light bound is enough to avoid
    /// saturating the origin.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Maximum concurrent push operations in flight (default: 64)
    #[serde(default = "default_push_concurrency")]
    pub push_concurrency: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: default_fetch_concurrency(),
            push_concurrency: default_push_concurrency(),
        }
    }
}

/// HTTP transport settings for the shared client
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total per-request timeout (default: 600 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Connection establishment timeout (default: 30 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Maximum idle connections kept per host (default: 100)
    ///
    /// This is a transport-level ceiling on connection reuse, not an
    /// admission limit; see [`TransferConfig::push_concurrency`].
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            max_idle_connections: default_max_idle_connections(),
        }
    }
}

/// Object-storage sink destination
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Base endpoint URL of the object-storage service
    #[serde(default = "default_sink_endpoint")]
    pub endpoint: String,

    /// Bucket (top-level container) to write objects into
    #[serde(default = "default_sink_bucket")]
    pub bucket: String,

    /// Fixed key prefix for pushed objects (default: "uploads")
    ///
    /// Keys are `<key_prefix>/<basename>` — a flat namespace with no
    /// partitioning on the sink side.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_sink_endpoint(),
            bucket: default_sink_bucket(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// Retry configuration for transient push failures
///
/// `max_attempts` counts total attempts, including the first one: the default
/// of 3 means one initial try plus up to two retries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per item (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

// Duration serialization helper (seconds as integers)
mod duration_serde {
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
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

fn default_staging_root() -> PathBuf {
    PathBuf::from("./staging")
}

fn default_fetch_concurrency() -> usize {
    8
}

fn default_push_concurrency() -> usize {
    64
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_idle_connections() -> usize {
    100
}

fn default_sink_endpoint() -> String {
    "http://localhost:9000".to_string()
}

fn default_sink_bucket() -> String {
    "assets".to_string()
}

fn default_key_prefix() -> String {
    "uploads".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sensible() {
        let config = Config::default();
        assert_eq!(config.staging_root, PathBuf::from("./staging"));
        assert_eq!(config.transfer.fetch_concurrency, 8);
        assert_eq!(config.transfer.push_concurrency, 64);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_delay, Duration::from_secs(1));
        assert!(config.retry.jitter);
        assert_eq!(config.sink.key_prefix, "uploads");
    }

    #[test]
    fn deserializes_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.transfer.push_concurrency, 64);
        assert_eq!(config.http.request_timeout, Duration::from_secs(600));
    }

    #[test]
    fn deserializes_flattened_fields() {
        let config: Config = serde_json::from_str(
            r#"{
                "staging_root": "/var/staging",
                "push_concurrency": 4,
                "request_timeout": 30,
                "sink": {
                    "endpoint": "https://storage.example.com",
                    "bucket": "media",
                    "key_prefix": "img"
                },
                "retry": { "max_attempts": 5, "jitter": false }
            }"#,
        )
        .unwrap();

        assert_eq!(config.staging_root, PathBuf::from("/var/staging"));
        assert_eq!(config.transfer.push_concurrency, 4);
        assert_eq!(config.transfer.fetch_concurrency, 8, "unset field keeps default");
        assert_eq!(config.http.request_timeout, Duration::from_secs(30));
        assert_eq!(config.sink.bucket, "media");
        assert_eq!(config.retry.max_attempts, 5);
        assert!(!config.retry.jitter);
    }

    #[test]
    fn duration_round_trips_as_seconds() {
        let retry = RetryConfig {
            initial_delay: Duration::from_secs(2),
            ..Default::default()
        };
        let json = serde_json::to_value(&retry).unwrap();
        assert_eq!(json["initial_delay"], 2);

        let back: RetryConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.initial_delay, Duration::from_secs(2));
    }
}
