use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};

/// Configuration for one scope's scheduler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Label used in log fields.
    pub name: String,
    /// Extra time to wait after the tick boundary before flushing.
    /// Zero flushes as soon as the enqueuing task yields.
    pub flush_delay: Duration,
    /// Capacity of the flush event broadcast channel.
    pub event_capacity: usize,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            name: "root".to_string(),
            flush_delay: Duration::ZERO,
            event_capacity: 64,
        }
    }
}

impl ScopeConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| BatchError::Config(e.to_string()))?;
        if config.event_capacity == 0 {
            return Err(BatchError::Config(
                "event_capacity must be greater than zero".into(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ScopeConfig::default();
        assert_eq!(c.name, "root");
        assert_eq!(c.flush_delay, Duration::ZERO);
        assert_eq!(c.event_capacity, 64);
    }

    #[test]
    fn toml_partial_uses_defaults() {
        let c = ScopeConfig::from_toml_str(r#"name = "filters""#).unwrap();
        assert_eq!(c.name, "filters");
        assert_eq!(c.event_capacity, 64);
    }

    #[test]
    fn toml_flush_delay() {
        let c = ScopeConfig::from_toml_str(
            r#"
            flush_delay = { secs = 0, nanos = 5000000 }
            event_capacity = 8
            "#,
        )
        .unwrap();
        assert_eq!(c.flush_delay, Duration::from_millis(5));
        assert_eq!(c.event_capacity, 8);
    }

    #[test]
    fn toml_zero_capacity_rejected() {
        let err = ScopeConfig::from_toml_str("event_capacity = 0").unwrap_err();
        assert!(matches!(err, BatchError::Config(_)));
    }

    #[test]
    fn toml_garbage_rejected() {
        assert!(ScopeConfig::from_toml_str("name = [").is_err());
    }
}
