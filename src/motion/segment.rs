//! Motion segments.
//!
//! A segment is a run of steps sharing one direction and one arithmetic
//! timing progression: the first step fires `interval` ticks after the
//! previous one and every following spacing grows by `delta`.

use serde::{Deserialize, Serialize};

/// Direction of virtual stepper motion.
///
/// The cleared latch state is [`Direction::Reverse`], so a stepper that has
/// been stopped counts down until a direction is set again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Position decrements on every step.
    #[default]
    Reverse,
    /// Position increments on every step.
    Forward,
}

impl Direction {
    /// Decode a wire direction bit (non-zero is forward).
    #[inline]
    pub fn from_bit(bit: u8) -> Self {
        if bit != 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Encode as a wire direction bit.
    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => 0,
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    /// Apply one step in this direction to a wrapping position counter.
    #[inline]
    pub fn step(self, position: u32) -> u32 {
        match self {
            Direction::Forward => position.wrapping_add(1),
            Direction::Reverse => position.wrapping_sub(1),
        }
    }
}

/// A queued run of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionSegment {
    /// Ticks from the previous step to the first step of this segment.
    pub interval: u32,
    /// Signed adjustment added to the interval after each step.
    pub delta: i16,
    /// Number of steps; never zero once queued.
    pub step_count: u16,
    /// Direction latched when the segment was created.
    pub direction: Direction,
}

impl MotionSegment {
    /// Placeholder used for unoccupied pool nodes.
    pub(crate) const EMPTY: Self = Self {
        interval: 0,
        delta: 0,
        step_count: 0,
        direction: Direction::Reverse,
    };

    /// Create a segment.
    #[inline]
    pub const fn new(interval: u32, step_count: u16, delta: i16, direction: Direction) -> Self {
        Self {
            interval,
            delta,
            step_count,
            direction,
        }
    }

    /// Interval the engine holds after the first step fires.
    ///
    /// The live interval already anticipates the first delta adjustment.
    #[inline]
    pub fn seed_interval(&self) -> u32 {
        self.interval.wrapping_add(self.delta as i32 as u32)
    }

    /// Spacing before the `k`-th step of this segment (k = 0 is the first),
    /// in closed form: `interval + k * delta`.
    pub fn spacing(&self, k: u16) -> u32 {
        let offset = (self.delta as i32).wrapping_mul(k as i32);
        self.interval.wrapping_add(offset as u32)
    }

    /// Total ticks spanned from the previous step to the last step.
    pub fn duration(&self) -> u64 {
        (0..self.step_count)
            .map(|k| u64::from(self.spacing(k)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_step_wraps() {
        assert_eq!(Direction::Forward.step(u32::MAX), 0);
        assert_eq!(Direction::Reverse.step(0), u32::MAX);
        assert_eq!(Direction::Forward.step(41), 42);
    }

    #[test]
    fn test_direction_bits() {
        assert_eq!(Direction::from_bit(0), Direction::Reverse);
        assert_eq!(Direction::from_bit(1), Direction::Forward);
        assert_eq!(Direction::from_bit(7), Direction::Forward);
        assert_eq!(Direction::Forward.bit(), 1);
        assert_eq!(Direction::default(), Direction::Reverse);
    }

    #[test]
    fn test_seed_interval_includes_delta() {
        let seg = MotionSegment::new(1000, 4, -25, Direction::Forward);
        assert_eq!(seg.seed_interval(), 975);
        assert_eq!(seg.spacing(0), 1000);
        assert_eq!(seg.spacing(3), 925);
    }

    #[test]
    fn test_duration() {
        // 100 + 110 + 120
        let seg = MotionSegment::new(100, 3, 10, Direction::Reverse);
        assert_eq!(seg.duration(), 330);
    }
}
