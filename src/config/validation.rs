//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::system::MAX_OBJECTS;

use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Clock frequency is non-zero
/// - Every oid fits in the object table
/// - No two steppers share an oid
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    if config.clock_freq_hz == 0 {
        return Err(Error::Config(ConfigError::InvalidClockFrequency(
            config.clock_freq_hz,
        )));
    }

    for (idx, (_, stepper)) in config.steppers.iter().enumerate() {
        if usize::from(stepper.oid) >= MAX_OBJECTS {
            return Err(Error::Config(ConfigError::OidOutOfRange(stepper.oid)));
        }

        let duplicate = config
            .steppers
            .values()
            .skip(idx + 1)
            .any(|other| other.oid == stepper.oid);
        if duplicate {
            return Err(Error::Config(ConfigError::DuplicateOid(stepper.oid)));
        }
    }

    Ok(())
}
