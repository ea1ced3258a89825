//! Error types for virtual-stepper.
//!
//! Every command and queue error is fatal to the whole system: the
//! [`StepperSystem`](crate::StepperSystem) enters shutdown when one is raised.

use core::fmt;

use crate::stepper::Oid;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all virtual-stepper operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Malformed or out-of-order command
    Command(CommandError),
    /// Segment pool exhausted
    Queue(QueueError),
    /// The system is shut down and rejects further commands
    Shutdown,
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Clock frequency must be non-zero
    InvalidClockFrequency(u32),
    /// Two steppers claim the same oid
    DuplicateOid(Oid),
    /// Oid does not fit in the object table
    OidOutOfRange(Oid),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Command errors.
///
/// These mirror the conditions under which the firmware shuts down rather
/// than risk a missed or extra step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// A parameter is out of range (e.g. zero step count)
    InvalidArgument(&'static str),
    /// Operation not allowed in the current engine state
    InvalidState(&'static str),
    /// Oid is not a configured virtual stepper
    TypeMismatch {
        /// Offending object id
        oid: Oid,
    },
    /// Oid already assigned to another object
    OidInUse {
        /// Offending object id
        oid: Oid,
    },
}

/// Motion queue errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// Every segment node is in use
    Full {
        /// Pool capacity in segments
        capacity: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Command(e) => write!(f, "Command error: {}", e),
            Error::Queue(e) => write!(f, "Queue error: {}", e),
            Error::Shutdown => write!(f, "System is shut down"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidClockFrequency(v) => {
                write!(f, "Invalid clock frequency: {}. Must be > 0", v)
            }
            ConfigError::DuplicateOid(oid) => write!(f, "Duplicate oid: {}", oid),
            ConfigError::OidOutOfRange(oid) => write!(f, "Oid {} out of range", oid),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CommandError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            CommandError::TypeMismatch { oid } => {
                write!(f, "Oid {} is not a virtual stepper", oid)
            }
            CommandError::OidInUse { oid } => write!(f, "Can't assign oid {}", oid),
        }
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full { capacity } => {
                write!(f, "Move queue overflow ({} segments)", capacity)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Error::Queue(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

#[cfg(feature = "std")]
impl std::error::Error for QueueError {}
