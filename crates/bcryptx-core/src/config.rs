//! Tuner configuration
//!
//! Durations are stored as [`Duration`] and written to JSON as whole
//! milliseconds. Missing fields, and fields set to zero, fall back to the
//! defaults below once the configuration is handed to a
//! [`Bcrypter`](crate::Bcrypter).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, Tier};

/// Default latency budget used for tuning the quick cost
pub const DEFAULT_QUICK_MAX_LATENCY: Duration = Duration::from_millis(500);

/// Default latency budget used for tuning the strong cost
pub const DEFAULT_STRONG_MAX_LATENCY: Duration = Duration::from_millis(2000);

/// Default number of hash generations allowed to run at once
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 2;

/// Latency budgets and generation concurrency for one tuner instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Quick hashes must be generated faster than this
    #[serde(rename = "quick_max_latency_ms", with = "millis")]
    pub quick_max_latency: Duration,

    /// Strong hashes must be generated faster than this
    #[serde(rename = "strong_max_latency_ms", with = "millis")]
    pub strong_max_latency: Duration,

    /// Maximum simultaneous hash generations
    pub concurrency_limit: usize,
}

impl TunerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: TunerConfig = serde_json::from_str(&data)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "Loaded tuner config");
        Ok(config)
    }

    pub fn with_quick_max_latency(mut self, latency: Duration) -> Self {
        self.quick_max_latency = latency;
        self
    }

    pub fn with_strong_max_latency(mut self, latency: Duration) -> Self {
        self.strong_max_latency = latency;
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Latency budget for a tier
    pub fn max_latency(&self, tier: Tier) -> Duration {
        match tier {
            Tier::Quick => self.quick_max_latency,
            Tier::Strong => self.strong_max_latency,
        }
    }

    /// Replace unset (zero) fields with their defaults
    pub fn normalized(self) -> Self {
        Self {
            quick_max_latency: non_zero_or(self.quick_max_latency, DEFAULT_QUICK_MAX_LATENCY),
            strong_max_latency: non_zero_or(self.strong_max_latency, DEFAULT_STRONG_MAX_LATENCY),
            concurrency_limit: if self.concurrency_limit == 0 {
                DEFAULT_CONCURRENCY_LIMIT
            } else {
                self.concurrency_limit
            },
        }
    }
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            quick_max_latency: DEFAULT_QUICK_MAX_LATENCY,
            strong_max_latency: DEFAULT_STRONG_MAX_LATENCY,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

fn non_zero_or(value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        default
    } else {
        value
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = TunerConfig::default();
        assert_eq!(config.quick_max_latency, Duration::from_millis(500));
        assert_eq!(config.strong_max_latency, Duration::from_millis(2000));
        assert_eq!(config.concurrency_limit, 2);
    }

    #[test]
    fn test_zero_means_default() {
        let config = TunerConfig::new()
            .with_quick_max_latency(Duration::ZERO)
            .with_strong_max_latency(Duration::from_millis(800))
            .with_concurrency_limit(0)
            .normalized();

        assert_eq!(config.quick_max_latency, DEFAULT_QUICK_MAX_LATENCY);
        assert_eq!(config.strong_max_latency, Duration::from_millis(800));
        assert_eq!(config.concurrency_limit, DEFAULT_CONCURRENCY_LIMIT);
    }

    #[test]
    fn test_max_latency_by_tier() {
        let config = TunerConfig::new()
            .with_quick_max_latency(Duration::from_millis(400))
            .with_strong_max_latency(Duration::from_millis(1600));

        assert_eq!(config.max_latency(Tier::Quick), Duration::from_millis(400));
        assert_eq!(config.max_latency(Tier::Strong), Duration::from_millis(1600));
    }

    #[test]
    fn test_partial_json() {
        let config: TunerConfig = serde_json::from_str(r#"{"strong_max_latency_ms": 1600}"#).unwrap();
        assert_eq!(config.quick_max_latency, DEFAULT_QUICK_MAX_LATENCY);
        assert_eq!(config.strong_max_latency, Duration::from_millis(1600));
        assert_eq!(config.concurrency_limit, DEFAULT_CONCURRENCY_LIMIT);
    }

    #[test]
    fn test_json_field_names() {
        let config = TunerConfig::new().with_quick_max_latency(Duration::from_millis(250));
        let value = serde_json::to_value(config).unwrap();
        assert_eq!(value["quick_max_latency_ms"], 250);
        assert_eq!(value["strong_max_latency_ms"], 2000);
        assert_eq!(value["concurrency_limit"], 2);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tuner.json");
        std::fs::write(
            &path,
            r#"{"quick_max_latency_ms": 300, "strong_max_latency_ms": 900, "concurrency_limit": 4}"#,
        )
        .unwrap();

        let config = TunerConfig::load(&path).unwrap();
        assert_eq!(config.quick_max_latency, Duration::from_millis(300));
        assert_eq!(config.strong_max_latency, Duration::from_millis(900));
        assert_eq!(config.concurrency_limit, 4);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = TunerConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert_eq!(missing.code(), "IO_ERROR");

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let bad = TunerConfig::load(&path).unwrap_err();
        assert_eq!(bad.code(), "JSON_ERROR");
    }
}
