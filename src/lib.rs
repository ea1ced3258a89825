//! # virtual-stepper
//!
//! Interrupt-safe virtual stepper position tracking driven by timed step
//! segments.
//!
//! ## Features
//!
//! - **Segment replay**: `(interval, add, count)` segments replayed with
//!   integer additions only, reproducing constant-acceleration step timing
//! - **Interrupt safe**: state lives behind `critical_section::Mutex`, shared
//!   between command handling and the timer callback
//! - **no_std compatible**: fixed segment pools, no allocation
//! - **Fatal error discipline**: malformed commands shut the system down
//!   instead of risking a missed or extra step
//! - **Configuration-driven**: steppers declared in TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use virtual_stepper::{Command, StepperSystem, StepTimer};
//!
//! let config = virtual_stepper::load_config("steppers.toml")?;
//! let mut system: StepperSystem = StepperSystem::from_config(&config)?;
//!
//! // Setup: configuration commands need exclusive access
//! system.dispatch_config(Command::Configure { oid: 1 }, &mut timer)?;
//!
//! // Foreground: runtime commands only need a shared reference
//! let system = &system;
//! system.dispatch(Command::QueueStep { oid: 0, interval: 1000, count: 3, add: 0 }, &mut timer)?;
//!
//! // Timer interrupt for oid 0
//! if let Some(waketime) = system.on_timer(0).waketime() {
//!     timer.arm(0, waketime);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and the host
//!   critical-section implementation
//! - `defmt`: Enables defmt logging for embedded targets
//!
//! Without `std` the target must provide a `critical-section` implementation.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
#![allow(clippy::result_large_err)]

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod stepper;
pub mod system;

// Re-exports for ergonomic API
pub use config::{validate_config, StepperConfig, SystemConfig};
pub use error::{Error, Result};
pub use motion::{Direction, MotionQueue, MotionSegment};
pub use stepper::{
    timer_is_before, EngineState, Oid, StepTimer, StepperState, StepperStatus, TimerEvent,
    VirtualStepper,
};
pub use system::{Command, ObjectKind, Response, StepperSystem};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
