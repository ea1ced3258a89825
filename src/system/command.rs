//! Inbound commands and outbound reports.
//!
//! Wire framing belongs to the host protocol layer; these are the decoded
//! forms. Serde names follow the firmware message names.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::motion::Direction;
use crate::stepper::Oid;

/// A decoded virtual stepper command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Allocate a virtual stepper.
    #[serde(rename = "config_virtual_stepper")]
    Configure {
        /// Object id to assign.
        oid: Oid,
    },
    /// Queue a segment of steps.
    #[serde(rename = "virtual_queue_step")]
    QueueStep {
        /// Target stepper.
        oid: Oid,
        /// Ticks until the first step.
        interval: u32,
        /// Number of steps; must be non-zero.
        count: u16,
        /// Interval adjustment after each step.
        add: i16,
    },
    /// Set the direction of subsequently queued segments.
    #[serde(rename = "virtual_set_next_step_dir")]
    SetNextStepDir {
        /// Target stepper.
        oid: Oid,
        /// Direction bit; non-zero is forward.
        dir: u8,
    },
    /// Rebase the step clock of an idle stepper.
    #[serde(rename = "virtual_reset_step_clock")]
    ResetStepClock {
        /// Target stepper.
        oid: Oid,
        /// Absolute clock the next segment is relative to.
        clock: u32,
    },
    /// Request a position report.
    #[serde(rename = "virtual_stepper_get_position")]
    GetPosition {
        /// Target stepper.
        oid: Oid,
    },
    /// Cancel all pending motion.
    #[serde(rename = "virtual_stepper_stop")]
    Stop {
        /// Target stepper.
        oid: Oid,
    },
}

impl Command {
    /// Message name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Configure { .. } => "config_virtual_stepper",
            Command::QueueStep { .. } => "virtual_queue_step",
            Command::SetNextStepDir { .. } => "virtual_set_next_step_dir",
            Command::ResetStepClock { .. } => "virtual_reset_step_clock",
            Command::GetPosition { .. } => "virtual_stepper_get_position",
            Command::Stop { .. } => "virtual_stepper_stop",
        }
    }

    /// Object id the command is addressed to.
    pub fn oid(&self) -> Oid {
        match *self {
            Command::Configure { oid }
            | Command::QueueStep { oid, .. }
            | Command::SetNextStepDir { oid, .. }
            | Command::ResetStepClock { oid, .. }
            | Command::GetPosition { oid }
            | Command::Stop { oid } => oid,
        }
    }

    /// Convenience constructor for a direction command.
    pub fn set_next_step_dir(oid: Oid, dir: Direction) -> Self {
        Command::SetNextStepDir { oid, dir: dir.bit() }
    }
}

/// A report sent back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Current position of a stepper.
    #[serde(rename = "stepper_position")]
    StepperPosition {
        /// Reporting stepper.
        oid: Oid,
        /// Position as a signed displacement.
        pos: i32,
    },
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::StepperPosition { oid, pos } => {
                write!(f, "stepper_position oid={} pos={}", oid, pos)
            }
        }
    }
}
