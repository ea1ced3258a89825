//! Timer facility seam.
//!
//! The scheduler that fires callbacks at absolute times lives outside this
//! crate. Steppers arm it when a producer primes an idle engine and cancel it
//! on stop; every later rearm is requested through the [`TimerEvent`] the
//! callback returns.

use super::Oid;

/// What the scheduler should do after a step event.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    /// Fire again at this absolute wake time.
    Reschedule(u32),
    /// Engine went idle; leave the timer unarmed.
    Done,
}

impl TimerEvent {
    /// Wake time to rearm at, if any.
    #[inline]
    pub fn waketime(self) -> Option<u32> {
        match self {
            TimerEvent::Reschedule(waketime) => Some(waketime),
            TimerEvent::Done => None,
        }
    }
}

/// Absolute-time timer facility used by virtual steppers.
///
/// Both methods are called with the critical section held and must not
/// block. Each stepper owns at most one armed timer, identified by its oid.
pub trait StepTimer {
    /// Arm the stepper's timer to fire at `waketime`.
    fn arm(&mut self, oid: Oid, waketime: u32);

    /// Cancel the stepper's timer if it is armed.
    fn cancel(&mut self, oid: Oid);
}

impl<T: StepTimer + ?Sized> StepTimer for &mut T {
    fn arm(&mut self, oid: Oid, waketime: u32) {
        (**self).arm(oid, waketime)
    }

    fn cancel(&mut self, oid: Oid) {
        (**self).cancel(oid)
    }
}

/// Check whether tick `a` comes before tick `b` on a wrapping 32-bit clock.
#[inline]
pub fn timer_is_before(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}
