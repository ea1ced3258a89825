//! Stepping engine.
//!
//! [`StepperState`] is the plain state machine with no locking of its own.
//! [`VirtualStepper`](super::VirtualStepper) wraps it in a critical-section
//! mutex; this type is only ever touched with that section held.
//!
//! The step event uses integer additions only: each inter-step interval is
//! the previous one plus a fixed signed delta, which replays a constant
//! acceleration profile in bounded time.

use crate::error::{CommandError, Result};
use crate::motion::{Direction, MotionQueue, MotionSegment, DEFAULT_QUEUE_DEPTH};

use super::state::{EngineState, StepperStatus};
use super::timer::TimerEvent;

/// Live state of one virtual stepper.
#[derive(Debug, Clone)]
pub struct StepperState<const N: usize = DEFAULT_QUEUE_DEPTH> {
    wake_time: u32,
    interval: u32,
    delta: i16,
    step_count: u16,
    position: u32,
    current_dir: Direction,
    next_dir: Direction,
    queue: MotionQueue<N>,
}

impl<const N: usize> Default for StepperState<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> StepperState<N> {
    /// Create an idle stepper at position zero.
    pub const fn new() -> Self {
        Self {
            wake_time: 0,
            interval: 0,
            delta: 0,
            step_count: 0,
            position: 0,
            current_dir: Direction::Reverse,
            next_dir: Direction::Reverse,
            queue: MotionQueue::new(),
        }
    }

    /// Timer callback body: emit one step.
    pub fn step_event(&mut self) -> TimerEvent {
        self.position = self.current_dir.step(self.position);
        let count = self.step_count.saturating_sub(1);
        if count != 0 {
            self.step_count = count;
            self.wake_time = self.wake_time.wrapping_add(self.interval);
            self.interval = self.interval.wrapping_add(self.delta as i32 as u32);
            return TimerEvent::Reschedule(self.wake_time);
        }
        self.load_next()
    }

    /// Load the next queued segment into the live fields.
    ///
    /// The wake time advances from the previous wake time, not from "now",
    /// so back-to-back segments keep continuous timing.
    pub fn load_next(&mut self) -> TimerEvent {
        let Some(segment) = self.queue.pop_front() else {
            self.step_count = 0;
            return TimerEvent::Done;
        };
        self.wake_time = self.wake_time.wrapping_add(segment.interval);
        self.delta = segment.delta;
        self.interval = segment.seed_interval();
        self.step_count = segment.step_count;
        self.current_dir = segment.direction;
        TimerEvent::Reschedule(self.wake_time)
    }

    /// Queue a segment using the current direction latch.
    ///
    /// Returns the wake time to arm if this primed an idle engine.
    ///
    /// # Errors
    ///
    /// - [`CommandError::InvalidArgument`] if `count` is zero
    /// - [`QueueError::Full`](crate::error::QueueError::Full) if the pool is exhausted
    pub fn queue_segment(&mut self, interval: u32, count: u16, delta: i16) -> Result<Option<u32>> {
        if count == 0 {
            return Err(CommandError::InvalidArgument("Invalid count parameter").into());
        }
        let segment = MotionSegment::new(interval, count, delta, self.next_dir);
        self.queue.push_back(segment)?;
        if self.is_active() {
            return Ok(None);
        }
        Ok(self.load_next().waketime())
    }

    /// Set the direction latched into subsequently queued segments.
    #[inline]
    pub fn set_next_direction(&mut self, dir: Direction) {
        self.next_dir = dir;
    }

    /// Rebase the wake time that the next segment is relative to.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidState`] while steps are in flight.
    pub fn reset_clock(&mut self, clock: u32) -> Result<()> {
        if self.is_active() {
            return Err(CommandError::InvalidState("Can't reset time when stepper active").into());
        }
        self.wake_time = clock;
        Ok(())
    }

    /// Return to idle and discard every queued segment.
    ///
    /// The caller cancels the armed timer.
    pub fn stop(&mut self) {
        self.wake_time = 0;
        self.step_count = 0;
        self.current_dir = Direction::Reverse;
        self.next_dir = Direction::Reverse;
        self.queue.clear();
    }

    /// Raw position counter.
    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Overwrite the position counter.
    #[inline]
    pub fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    /// Absolute tick of the next step event.
    #[inline]
    pub fn wake_time(&self) -> u32 {
        self.wake_time
    }

    /// Direction of the executing segment.
    #[inline]
    pub fn current_direction(&self) -> Direction {
        self.current_dir
    }

    /// Direction that the next queued segment will capture.
    #[inline]
    pub fn next_direction(&self) -> Direction {
        self.next_dir
    }

    /// Check if a segment is executing.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.step_count != 0
    }

    /// Current engine state.
    #[inline]
    pub fn engine_state(&self) -> EngineState {
        if self.is_active() {
            EngineState::Active
        } else {
            EngineState::Idle
        }
    }

    /// Snapshot for diagnostics.
    pub fn status(&self) -> StepperStatus {
        StepperStatus {
            position: self.position,
            wake_time: self.wake_time,
            state: self.engine_state(),
            remaining_steps: self.step_count,
            queued_segments: self.queue.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, QueueError};

    /// Run the engine until idle, returning (fire time, position) per step.
    fn drain(state: &mut StepperState<8>, first: u32) -> Vec<(u32, u32)> {
        let mut fires = Vec::new();
        let mut next = Some(first);
        while let Some(at) = next {
            let event = state.step_event();
            fires.push((at, state.position()));
            next = event.waketime();
        }
        fires
    }

    #[test]
    fn test_prime_from_idle() {
        let mut state: StepperState<8> = StepperState::new();
        state.reset_clock(500).unwrap();
        state.set_next_direction(Direction::Forward);

        let armed = state.queue_segment(1000, 3, 0).unwrap();
        assert_eq!(armed, Some(1500));
        assert_eq!(state.engine_state(), EngineState::Active);
        assert_eq!(state.status().queued_segments, 0);

        let fires = drain(&mut state, 1500);
        assert_eq!(fires, vec![(1500, 1), (2500, 2), (3500, 3)]);
        assert_eq!(state.engine_state(), EngineState::Idle);
    }

    #[test]
    fn test_append_while_active_does_not_arm() {
        let mut state: StepperState<8> = StepperState::new();
        assert!(state.queue_segment(100, 2, 0).unwrap().is_some());
        assert_eq!(state.queue_segment(100, 2, 0).unwrap(), None);
        assert_eq!(state.status().queued_segments, 1);
    }

    #[test]
    fn test_progression_and_seeded_interval() {
        let mut state: StepperState<8> = StepperState::new();
        state.set_next_direction(Direction::Forward);
        let first = state.queue_segment(1000, 4, -100).unwrap().unwrap();
        assert_eq!(first, 1000);

        let fires = drain(&mut state, first);
        let times: Vec<u32> = fires.iter().map(|f| f.0).collect();
        // Spacings 1000, 900, 800, 700
        assert_eq!(times, vec![1000, 1900, 2700, 3400]);
    }

    #[test]
    fn test_segment_boundary_keeps_timing() {
        let mut state: StepperState<8> = StepperState::new();
        state.set_next_direction(Direction::Forward);
        let first = state.queue_segment(10, 2, 0).unwrap().unwrap();
        state.set_next_direction(Direction::Reverse);
        state.queue_segment(7, 2, 1).unwrap();

        let fires = drain(&mut state, first);
        assert_eq!(fires, vec![(10, 1), (20, 2), (27, 1), (35, 0)]);
    }

    #[test]
    fn test_direction_captured_at_enqueue() {
        let mut state: StepperState<8> = StepperState::new();
        state.set_next_direction(Direction::Forward);
        let first = state.queue_segment(5, 3, 0).unwrap().unwrap();
        state.set_next_direction(Direction::Reverse);

        let fires = drain(&mut state, first);
        assert_eq!(fires.last().unwrap().1, 3);
        assert_eq!(state.current_direction(), Direction::Forward);
        assert_eq!(state.next_direction(), Direction::Reverse);
    }

    #[test]
    fn test_zero_count_rejected() {
        let mut state: StepperState<8> = StepperState::new();
        let err = state.queue_segment(100, 0, 0).unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::InvalidArgument(_))));
        assert_eq!(state.engine_state(), EngineState::Idle);
    }

    #[test]
    fn test_reset_clock_only_when_idle() {
        let mut state: StepperState<8> = StepperState::new();
        state.queue_segment(100, 1, 0).unwrap();
        let err = state.reset_clock(0).unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::InvalidState(_))));

        assert_eq!(state.step_event(), TimerEvent::Done);
        state.reset_clock(42).unwrap();
        assert_eq!(state.wake_time(), 42);
    }

    #[test]
    fn test_stop_clears_everything_but_position() {
        let mut state: StepperState<8> = StepperState::new();
        state.set_next_direction(Direction::Forward);
        state.queue_segment(100, 5, 0).unwrap();
        state.queue_segment(100, 5, 0).unwrap();
        let _ = state.step_event();
        state.stop();

        let status = state.status();
        assert_eq!(status.state, EngineState::Idle);
        assert_eq!(status.wake_time, 0);
        assert_eq!(status.queued_segments, 0);
        assert_eq!(status.position, 1);
        assert_eq!(state.next_direction(), Direction::Reverse);

        // Stopping twice changes nothing
        state.stop();
        assert_eq!(state.status(), status);
    }

    #[test]
    fn test_pool_exhaustion() {
        let mut state: StepperState<2> = StepperState::new();
        state.queue_segment(1, 1, 0).unwrap();
        state.queue_segment(1, 1, 0).unwrap();
        state.queue_segment(1, 1, 0).unwrap();
        let err = state.queue_segment(1, 1, 0).unwrap_err();
        assert_eq!(err, Error::Queue(QueueError::Full { capacity: 2 }));
    }

    #[test]
    fn test_position_wraps() {
        let mut state: StepperState<8> = StepperState::new();
        state.set_position(u32::MAX);
        state.set_next_direction(Direction::Forward);
        state.queue_segment(1, 1, 0).unwrap();
        assert_eq!(state.step_event(), TimerEvent::Done);
        assert_eq!(state.position(), 0);
    }
}
