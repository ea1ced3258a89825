//! Configuration module for virtual-stepper.
//!
//! Provides types for loading and validating virtual stepper configuration
//! from TOML files (with `std` feature) or pre-parsed data.

#[cfg(feature = "std")]
mod loader;
mod stepper;
mod system;
mod validation;

pub use stepper::StepperConfig;
pub use system::{SystemConfig, MAX_CONFIGURED_STEPPERS};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
