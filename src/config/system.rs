//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use crate::stepper::Oid;

use super::stepper::StepperConfig;

/// Maximum number of steppers in one configuration.
pub const MAX_CONFIGURED_STEPPERS: usize = 8;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Timer tick frequency in Hz.
    #[serde(default = "default_clock_freq")]
    pub clock_freq_hz: u32,

    /// Named virtual stepper configurations.
    #[serde(default)]
    pub steppers: FnvIndexMap<String<32>, StepperConfig, MAX_CONFIGURED_STEPPERS>,
}

fn default_clock_freq() -> u32 {
    1_000_000
}

impl SystemConfig {
    /// Get a stepper configuration by name.
    pub fn stepper(&self, name: &str) -> Option<&StepperConfig> {
        self.steppers
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a stepper configuration by oid.
    pub fn stepper_by_oid(&self, oid: Oid) -> Option<(&str, &StepperConfig)> {
        self.steppers
            .iter()
            .find(|(_, v)| v.oid == oid)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// List all stepper names.
    pub fn stepper_names(&self) -> impl Iterator<Item = &str> {
        self.steppers.keys().map(|s| s.as_str())
    }

    /// Convert microseconds to timer ticks.
    ///
    /// Returns `None` if the result does not fit the 32-bit tick counter.
    pub fn micros_to_ticks(&self, micros: u32) -> Option<u32> {
        u32::try_from(u64::from(micros) * u64::from(self.clock_freq_hz) / 1_000_000).ok()
    }

    /// Convert timer ticks to microseconds.
    ///
    /// Returns `None` for a zero clock or a result wider than 32 bits.
    pub fn ticks_to_micros(&self, ticks: u32) -> Option<u32> {
        if self.clock_freq_hz == 0 {
            return None;
        }
        u32::try_from(u64::from(ticks) * 1_000_000 / u64::from(self.clock_freq_hz)).ok()
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            clock_freq_hz: default_clock_freq(),
            steppers: FnvIndexMap::new(),
        }
    }
}
