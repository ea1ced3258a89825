//! Virtual stepper configuration from TOML.

use serde::Deserialize;

use crate::stepper::Oid;

/// Configuration of one virtual stepper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepperConfig {
    /// Object id the host addresses this stepper by.
    pub oid: Oid,

    /// Initial wake-time base for the first queued segment.
    #[serde(default)]
    pub reset_clock: u32,

    /// Initial position as a signed displacement.
    #[serde(default)]
    pub position: i32,
}

impl StepperConfig {
    /// Create a configuration with default clock and position.
    pub fn new(oid: Oid) -> Self {
        Self {
            oid,
            reset_clock: 0,
            position: 0,
        }
    }

    /// Initial position as the raw wrapping counter value.
    #[inline]
    pub fn raw_position(&self) -> u32 {
        self.position as u32
    }
}
