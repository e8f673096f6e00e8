use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::drivers::ScopeError;

pub const DEFAULT_NUM_CHANNELS: usize = 33;
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1000;
pub const DEFAULT_SERIES_WINDOW: usize = 20;

/// Runtime options for the simulator. Every field may be omitted from a JSON
/// config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub num_channels: usize,
    pub tick_period_ms: u64,
    /// Entries kept in the time and brainwave series.
    pub series_window: usize,
    /// Ticks of density cells kept; 1 keeps exactly one grid.
    pub density_ticks: usize,
    /// `None` lets the raw series grow without limit.
    pub raw_capacity: Option<usize>,
    pub frequency_capacity: Option<usize>,
    pub seed: Option<u64>,
}
impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            num_channels: DEFAULT_NUM_CHANNELS,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            series_window: DEFAULT_SERIES_WINDOW,
            density_ticks: 1,
            raw_capacity: None,
            frequency_capacity: None,
            seed: None,
        }
    }
}
impl ScopeConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ScopeError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScopeError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.num_channels == 0 {
            return Err(ScopeError::InvalidChannelCount);
        }
        if self.tick_period_ms == 0 {
            return Err(ScopeError::InvalidTickPeriod);
        }
        if self.series_window == 0 {
            return Err(ScopeError::InvalidWindow {
                name: "series_window",
            });
        }
        if self.density_ticks == 0 {
            return Err(ScopeError::InvalidWindow {
                name: "density_ticks",
            });
        }
        if self.raw_capacity == Some(0) {
            return Err(ScopeError::InvalidWindow {
                name: "raw_capacity",
            });
        }
        if self.frequency_capacity == Some(0) {
            return Err(ScopeError::InvalidWindow {
                name: "frequency_capacity",
            });
        }
        Ok(())
    }
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
    pub fn density_capacity(&self) -> usize {
        self.num_channels * self.density_ticks
    }
}
