//! Engine state reporting.

/// Stepping engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// No segment loaded, timer unarmed.
    #[default]
    Idle,
    /// A live segment is executing and the timer is armed.
    Active,
}

impl EngineState {
    /// Get the state name as a static string.
    pub fn name(self) -> &'static str {
        match self {
            EngineState::Idle => "Idle",
            EngineState::Active => "Active",
        }
    }
}

/// Point-in-time view of a virtual stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperStatus {
    /// Raw position counter.
    pub position: u32,
    /// Absolute tick of the next (or last) step event.
    pub wake_time: u32,
    /// Engine state.
    pub state: EngineState,
    /// Steps left in the live segment, including the next one.
    pub remaining_steps: u16,
    /// Segments waiting behind the live one.
    pub queued_segments: usize,
}

impl StepperStatus {
    /// Position as a signed displacement.
    #[inline]
    pub fn signed_position(&self) -> i32 {
        self.position as i32
    }
}
