//! Interrupt-safe virtual stepper handle.
//!
//! Producer operations take the critical section themselves. Accessors that
//! callers normally use while already holding it (position, stop) take a
//! [`CriticalSection`] token instead, so unguarded access does not compile.

use core::cell::RefCell;

use critical_section::{CriticalSection, Mutex};

use crate::error::Result;
use crate::motion::{Direction, DEFAULT_QUEUE_DEPTH};

use super::engine::StepperState;
use super::state::StepperStatus;
use super::timer::{StepTimer, TimerEvent};
use super::Oid;

/// A virtual stepper shared between command handling and its timer callback.
pub struct VirtualStepper<const N: usize = DEFAULT_QUEUE_DEPTH> {
    oid: Oid,
    state: Mutex<RefCell<StepperState<N>>>,
}

impl<const N: usize> VirtualStepper<N> {
    /// Create an idle stepper.
    pub const fn new(oid: Oid) -> Self {
        Self {
            oid,
            state: Mutex::new(RefCell::new(StepperState::new())),
        }
    }

    /// Object id of this stepper.
    #[inline]
    pub fn oid(&self) -> Oid {
        self.oid
    }

    /// Queue `count` steps starting `interval` ticks after the previous step.
    ///
    /// Arms the timer if the engine was idle.
    ///
    /// # Errors
    ///
    /// Zero `count` or an exhausted segment pool. Both are fatal.
    pub fn queue_step<T: StepTimer>(
        &self,
        interval: u32,
        count: u16,
        add: i16,
        timer: &mut T,
    ) -> Result<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if let Some(waketime) = state.queue_segment(interval, count, add)? {
                timer.arm(self.oid, waketime);
            }
            Ok(())
        })
    }

    /// Set the direction of the next queued segment.
    pub fn set_next_step_dir(&self, dir: Direction) {
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).set_next_direction(dir);
        });
    }

    /// Set the absolute time the next queued segment is relative to.
    ///
    /// # Errors
    ///
    /// Fails while the engine is active.
    pub fn reset_step_clock(&self, clock: u32) -> Result<()> {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).reset_clock(clock))
    }

    /// Timer callback. Runs in interrupt context.
    pub fn on_timer(&self) -> TimerEvent {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).step_event())
    }

    /// Current position counter.
    #[inline]
    pub fn position(&self, cs: CriticalSection<'_>) -> u32 {
        self.state.borrow_ref(cs).position()
    }

    /// Overwrite the position counter.
    #[inline]
    pub fn set_position(&self, cs: CriticalSection<'_>, position: u32) {
        self.state.borrow_ref_mut(cs).set_position(position);
    }

    /// Cancel the timer and discard all pending motion.
    ///
    /// Used by homing-style callers that already hold the critical section.
    pub fn stop<T: StepTimer>(&self, cs: CriticalSection<'_>, timer: &mut T) {
        timer.cancel(self.oid);
        self.state.borrow_ref_mut(cs).stop();
    }

    /// Diagnostic snapshot.
    pub fn status(&self, cs: CriticalSection<'_>) -> StepperStatus {
        self.state.borrow_ref(cs).status()
    }
}

impl<const N: usize> core::fmt::Debug for VirtualStepper<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualStepper")
            .field("oid", &self.oid)
            .finish_non_exhaustive()
    }
}
