//! Reasoner configuration

use super::error::{ReasonerError, ReasonerResult};
use crate::io::SILENT_LEVEL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Runtime configuration for a reasoner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Name used in logs and worker thread names.
    pub name: String,

    /// Minimum wall-time spacing between worker cycles, in milliseconds.
    /// 0 disables throttling.
    pub min_tick_period_ms: i64,

    /// Cycles after which a task link / term link pairing is novel again.
    pub novelty_horizon: i64,

    /// Record length given to each task link's novelty tracker.
    pub task_link_record_length: usize,

    /// 0 = everything reported, 100 = regular output muted.
    pub silence_level: u32,

    /// Per-cycle scheduler trace.
    pub debug: bool,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            name: "nar".to_string(),
            min_tick_period_ms: 0,
            novelty_horizon: 100_000,
            task_link_record_length: 10,
            silence_level: 0,
            debug: false,
        }
    }
}

impl ReasonerConfig {
    /// Parses and validates a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> ReasonerResult<Self> {
        let config: ReasonerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ReasonerResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> ReasonerResult<()> {
        if self.min_tick_period_ms < 0 {
            return Err(invalid(format!(
                "min_tick_period_ms must be >= 0, got {}",
                self.min_tick_period_ms
            )));
        }
        if self.novelty_horizon < 0 {
            return Err(invalid(format!(
                "novelty_horizon must be >= 0, got {}",
                self.novelty_horizon
            )));
        }
        if self.task_link_record_length < 1 {
            return Err(invalid(format!(
                "task_link_record_length must be >= 1, got {}",
                self.task_link_record_length
            )));
        }
        validate_silence(self.silence_level)?;
        Ok(())
    }

    pub fn min_tick_period(&self) -> Duration {
        Duration::from_millis(self.min_tick_period_ms.max(0) as u64)
    }

    pub fn novelty_horizon(&self) -> u64 {
        self.novelty_horizon.max(0) as u64
    }
}

pub(crate) fn validate_silence(level: u32) -> ReasonerResult<()> {
    if level > SILENT_LEVEL {
        return Err(invalid(format!(
            "silence_level must be in [0, {}], got {}",
            SILENT_LEVEL, level
        )));
    }
    Ok(())
}

fn invalid(reason: String) -> ReasonerError {
    ReasonerError::InvalidConfig { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ReasonerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_tick_period(), Duration::ZERO);
        assert_eq!(config.novelty_horizon(), 100_000);
    }

    #[test]
    fn test_negative_tick_period_rejected() {
        let config = ReasonerConfig {
            min_tick_period_ms: -5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ReasonerError::InvalidConfig { .. }));
        assert!(err.to_string().contains("min_tick_period_ms"));
    }

    #[test]
    fn test_negative_horizon_rejected() {
        let config = ReasonerConfig {
            novelty_horizon: -1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_silence_above_limit_rejected() {
        let config = ReasonerConfig {
            silence_level: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(validate_silence(100).is_ok());
    }

    #[test]
    fn test_zero_record_length_rejected() {
        let config = ReasonerConfig {
            task_link_record_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = ReasonerConfig::from_json_str(r#"{"min_tick_period_ms": 20, "debug": true}"#)
            .unwrap();
        assert_eq!(config.min_tick_period(), Duration::from_millis(20));
        assert!(config.debug);
        assert_eq!(config.name, "nar");
    }

    #[test]
    fn test_json_validation_is_immediate() {
        let err = ReasonerConfig::from_json_str(r#"{"min_tick_period_ms": -1}"#).unwrap_err();
        assert!(matches!(err, ReasonerError::InvalidConfig { .. }));

        let err = ReasonerConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ReasonerError::ConfigParse(_)));
    }
}
