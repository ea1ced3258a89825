//! Stepper module for virtual-stepper.
//!
//! Provides the stepping engine, its interrupt-safe handle and the timer seam.

mod engine;
mod handle;
mod state;
mod timer;

pub use engine::StepperState;
pub use handle::VirtualStepper;
pub use state::{EngineState, StepperStatus};
pub use timer::{timer_is_before, StepTimer, TimerEvent};

/// Object id assigned to a configured object.
pub type Oid = u8;
