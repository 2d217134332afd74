// src/config.rs

use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{MeterError, Result};

pub const DEFAULT_INTERVAL_MS: u64 = 1_000;
pub const INTERVAL_ENV_VAR: &str = "ALLOC_RATE_METER_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    // Sampling period between two snapshots
    pub interval_ms: u64, // Default: 1000
}

impl Default for MeterConfig {
    fn default() -> Self {
        MeterConfig {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl MeterConfig {
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        MeterConfig { interval_ms }
    }

    /// Default configuration, with the interval overridden by
    /// `ALLOC_RATE_METER_INTERVAL_MS` when that variable holds a valid number.
    pub fn from_env() -> Self {
        let raw = std::env::var(INTERVAL_ENV_VAR).ok();
        Self::default().with_override(raw.as_deref())
    }

    fn with_override(mut self, raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => self.interval_ms = value,
                _ => warn!(
                    "ignoring {}={:?}, keeping interval of {}ms",
                    INTERVAL_ENV_VAR, raw, self.interval_ms
                ),
            }
        }
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(MeterError::InvalidConfig(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
