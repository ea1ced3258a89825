//! Motion module for virtual-stepper.
//!
//! Provides motion segments and the per-stepper segment queue.

mod queue;
mod segment;

pub use queue::{Iter, MotionQueue, DEFAULT_QUEUE_DEPTH};
pub use segment::{Direction, MotionSegment};
