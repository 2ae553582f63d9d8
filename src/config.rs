use serde::{Deserialize, Serialize};

use crate::kernel::telemetry::recorder::MAX_EVENTS;

pub const DEFAULT_START_HOUR: u32 = 4;
pub const DEFAULT_END_HOUR: u32 = 10;
pub const DEFAULT_BUDGET_MS: u64 = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("window start hour {start} must be before end hour {end} (and end <= 24)")]
    InvalidWindow { start: u32, end: u32 },

    #[error("boundary hour {hour} must be below 24")]
    InvalidBoundaryHour { hour: u32 },

    #[error("scheduler budget must be greater than zero")]
    ZeroBudget,

    #[error("failed to parse configuration")]
    Parse(#[from] serde_json::Error),
}

/// Daily window `[start_hour:00, end_hour:00)`, local time.
/// `start_hour` doubles as the day boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(ConfigError::InvalidWindow {
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Per-tick budget before the scheduler yields.
    pub budget_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            budget_ms: DEFAULT_BUDGET_MS,
        }
    }
}

/// Kernel configuration. Fixed once the kernel is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RitualConfig {
    pub window: WindowConfig,
    pub scheduler: SchedulerConfig,
    pub telemetry_capacity: usize,
}

impl Default for RitualConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            scheduler: SchedulerConfig::default(),
            telemetry_capacity: MAX_EVENTS,
        }
    }
}

impl RitualConfig {
    /// Parses a (possibly partial) JSON document over the defaults and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RitualConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        if self.scheduler.budget_ms == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RitualConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.start_hour, 4);
        assert_eq!(config.window.end_hour, 10);
        assert_eq!(config.scheduler.budget_ms, 8);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RitualConfig::from_json_str(r#"{ "window": { "end_hour": 11 } }"#).unwrap();
        assert_eq!(config.window.start_hour, 4);
        assert_eq!(config.window.end_hour, 11);
        assert_eq!(config.scheduler.budget_ms, 8);
    }

    #[test]
    fn rejects_inverted_window() {
        let err = RitualConfig::from_json_str(r#"{ "window": { "start_hour": 10, "end_hour": 4 } }"#);
        assert!(matches!(err, Err(ConfigError::InvalidWindow { start: 10, end: 4 })));
    }

    #[test]
    fn rejects_zero_budget() {
        let err = RitualConfig::from_json_str(r#"{ "scheduler": { "budget_ms": 0 } }"#);
        assert!(matches!(err, Err(ConfigError::ZeroBudget)));
    }
}
