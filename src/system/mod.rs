//! Virtual stepper system facade.
//!
//! Owns the object table, routes commands to steppers and latches the
//! system into shutdown on the first fatal error.

mod command;
mod registry;

pub use command::{Command, Response};
pub use registry::{ObjectKind, ObjectTable, MAX_OBJECTS};

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::{validate_config, SystemConfig};
use crate::error::{CommandError, Error, Result};
use crate::motion::{Direction, DEFAULT_QUEUE_DEPTH};
use crate::stepper::{Oid, StepTimer, TimerEvent, VirtualStepper};

/// A set of virtual steppers sharing one timer facility.
///
/// Configuration takes `&mut self`; everything after that takes `&self` so
/// the timer interrupt can call [`StepperSystem::on_timer`] while command
/// handling holds its own shared reference.
///
/// # Example
///
/// ```rust,ignore
/// use virtual_stepper::{Command, StepperSystem};
///
/// let system: StepperSystem = StepperSystem::from_config(&config)?;
/// system.dispatch(Command::QueueStep { oid: 0, interval: 1000, count: 3, add: 0 }, &mut timer)?;
///
/// // From the timer interrupt
/// let event = system.on_timer(0);
/// ```
pub struct StepperSystem<const Q: usize = DEFAULT_QUEUE_DEPTH> {
    objects: ObjectTable<Q>,
    clock_freq_hz: u32,
    /// First fatal error, once shut down.
    shutdown: Mutex<RefCell<Option<Error>>>,
}

impl<const Q: usize> Default for StepperSystem<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const Q: usize> StepperSystem<Q> {
    /// Create an empty system with the default 1 MHz clock.
    pub fn new() -> Self {
        Self::with_clock(SystemConfig::default().clock_freq_hz)
    }

    /// Create an empty system with the given timer frequency.
    pub fn with_clock(clock_freq_hz: u32) -> Self {
        Self {
            objects: ObjectTable::new(),
            clock_freq_hz,
            shutdown: Mutex::new(RefCell::new(None)),
        }
    }

    /// Create a system and configure every stepper in `config`.
    ///
    /// Each stepper starts idle at its configured clock and position.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &SystemConfig) -> Result<Self> {
        validate_config(config)?;

        let mut system = Self::with_clock(config.clock_freq_hz);
        for stepper_config in config.steppers.values() {
            let stepper = system.objects.alloc_stepper(stepper_config.oid)?;
            stepper.reset_step_clock(stepper_config.reset_clock)?;
            critical_section::with(|cs| {
                stepper.set_position(cs, stepper_config.raw_position());
            });
        }
        Ok(system)
    }

    /// Timer tick frequency in Hz.
    pub fn clock_freq_hz(&self) -> u32 {
        self.clock_freq_hz
    }

    /// The object table.
    pub fn objects(&self) -> &ObjectTable<Q> {
        &self.objects
    }

    /// Look up a virtual stepper for a peer subsystem.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if `oid` is not a virtual stepper.
    pub fn lookup(&self, oid: Oid) -> Result<&VirtualStepper<Q>> {
        self.objects.lookup(oid)
    }

    /// Check if `oid` is a virtual stepper.
    pub fn verify(&self, oid: Oid) -> bool {
        self.objects.verify(oid)
    }

    /// Iterate every configured virtual stepper.
    pub fn steppers(&self) -> impl Iterator<Item = &VirtualStepper<Q>> {
        self.objects.steppers()
    }

    /// Allocate a virtual stepper at `oid`.
    ///
    /// # Errors
    ///
    /// Fatal if the oid is invalid or already assigned.
    pub fn configure<T: StepTimer>(&mut self, oid: Oid, timer: &mut T) -> Result<()> {
        self.ensure_running()?;
        let result = self.objects.alloc_stepper(oid).map(|_| ());
        if result.is_ok() {
            #[cfg(feature = "defmt")]
            defmt::info!("virtual stepper oid={} configured", oid);
        }
        self.fatal(timer, result)
    }

    /// Claim `oid` for an object owned by another subsystem.
    ///
    /// # Errors
    ///
    /// Fatal if the oid is invalid or already assigned.
    pub fn reserve<T: StepTimer>(
        &mut self,
        oid: Oid,
        kind: &'static str,
        timer: &mut T,
    ) -> Result<()> {
        self.ensure_running()?;
        let result = self.objects.reserve(oid, kind);
        self.fatal(timer, result)
    }

    /// Queue a segment of steps on a stepper.
    ///
    /// # Errors
    ///
    /// Fatal on an unknown oid, zero count or exhausted segment pool.
    pub fn queue_step<T: StepTimer>(
        &self,
        oid: Oid,
        interval: u32,
        count: u16,
        add: i16,
        timer: &mut T,
    ) -> Result<()> {
        self.ensure_running()?;
        let result = self
            .lookup(oid)
            .and_then(|stepper| stepper.queue_step(interval, count, add, timer));
        self.fatal(timer, result)
    }

    /// Set the direction of the next segment queued on a stepper.
    ///
    /// # Errors
    ///
    /// Fatal on an unknown oid.
    pub fn set_next_step_dir<T: StepTimer>(
        &self,
        oid: Oid,
        dir: Direction,
        timer: &mut T,
    ) -> Result<()> {
        self.ensure_running()?;
        let result = self
            .lookup(oid)
            .map(|stepper| stepper.set_next_step_dir(dir));
        self.fatal(timer, result)
    }

    /// Rebase the step clock of an idle stepper.
    ///
    /// # Errors
    ///
    /// Fatal on an unknown oid or while the stepper is active.
    pub fn reset_step_clock<T: StepTimer>(
        &self,
        oid: Oid,
        clock: u32,
        timer: &mut T,
    ) -> Result<()> {
        self.ensure_running()?;
        let result = self
            .lookup(oid)
            .and_then(|stepper| stepper.reset_step_clock(clock));
        self.fatal(timer, result)
    }

    /// Build a position report for a stepper.
    ///
    /// # Errors
    ///
    /// Fatal on an unknown oid.
    pub fn get_position<T: StepTimer>(&self, oid: Oid, timer: &mut T) -> Result<Response> {
        self.ensure_running()?;
        let result = self.lookup(oid).map(|stepper| {
            let position = critical_section::with(|cs| stepper.position(cs));
            Response::StepperPosition {
                oid,
                pos: position as i32,
            }
        });
        self.fatal(timer, result)
    }

    /// Stop a stepper, discarding its queued motion.
    ///
    /// # Errors
    ///
    /// Fatal on an unknown oid.
    pub fn stop<T: StepTimer>(&self, oid: Oid, timer: &mut T) -> Result<()> {
        self.ensure_running()?;
        let result = self.lookup(oid).map(|stepper| {
            critical_section::with(|cs| stepper.stop(cs, timer));
        });
        self.fatal(timer, result)
    }

    /// Route a decoded runtime command.
    ///
    /// Returns the report for commands that produce one. Takes `&self`, so
    /// it can run while the timer interrupt holds its own shared reference.
    /// [`Command::Configure`] changes the object table and must go through
    /// [`StepperSystem::dispatch_config`] instead.
    ///
    /// # Errors
    ///
    /// Every error is fatal; the system is shut down before it is returned.
    /// A `Configure` command fails with [`CommandError::InvalidState`].
    pub fn dispatch<T: StepTimer>(
        &self,
        command: Command,
        timer: &mut T,
    ) -> Result<Option<Response>> {
        match command {
            Command::Configure { .. } => {
                self.ensure_running()?;
                let err = CommandError::InvalidState("Configure requires exclusive access");
                self.fatal(timer, Err(err.into()))
            }
            Command::QueueStep {
                oid,
                interval,
                count,
                add,
            } => self.queue_step(oid, interval, count, add, timer).map(|_| None),
            Command::SetNextStepDir { oid, dir } => self
                .set_next_step_dir(oid, Direction::from_bit(dir), timer)
                .map(|_| None),
            Command::ResetStepClock { oid, clock } => {
                self.reset_step_clock(oid, clock, timer).map(|_| None)
            }
            Command::GetPosition { oid } => self.get_position(oid, timer).map(Some),
            Command::Stop { oid } => self.stop(oid, timer).map(|_| None),
        }
    }

    /// Route any decoded command, including [`Command::Configure`].
    ///
    /// Used while the system is being set up and no interrupt shares it.
    ///
    /// # Errors
    ///
    /// Every error is fatal; the system is shut down before it is returned.
    pub fn dispatch_config<T: StepTimer>(
        &mut self,
        command: Command,
        timer: &mut T,
    ) -> Result<Option<Response>> {
        match command {
            Command::Configure { oid } => self.configure(oid, timer).map(|_| None),
            runtime => self.dispatch(runtime, timer),
        }
    }

    /// Timer callback for stepper `oid`. Runs in interrupt context.
    ///
    /// An oid that is not a virtual stepper never has a timer armed by this
    /// system, so it reports [`TimerEvent::Done`].
    pub fn on_timer(&self, oid: Oid) -> TimerEvent {
        match self.objects.lookup(oid) {
            Ok(stepper) => stepper.on_timer(),
            Err(_) => TimerEvent::Done,
        }
    }

    /// Enter shutdown, recording `reason` if none was recorded yet.
    ///
    /// Also the entry point for an externally broadcast shutdown.
    pub fn shutdown<T: StepTimer>(&self, reason: Error, timer: &mut T) {
        #[cfg(feature = "defmt")]
        defmt::error!("shutdown: {}", defmt::Display2Format(&reason));
        critical_section::with(|cs| {
            let mut latched = self.shutdown.borrow_ref_mut(cs);
            if latched.is_none() {
                *latched = Some(reason);
            }
        });
        self.shutdown_all(timer);
    }

    /// Stop every stepper and release every queued segment.
    pub fn shutdown_all<T: StepTimer>(&self, timer: &mut T) {
        critical_section::with(|cs| {
            for stepper in self.objects.steppers() {
                stepper.stop(cs, timer);
            }
        });
    }

    /// Check if the system is shut down.
    pub fn is_shutdown(&self) -> bool {
        critical_section::with(|cs| self.shutdown.borrow_ref(cs).is_some())
    }

    /// The error that caused shutdown, if any.
    pub fn shutdown_reason(&self) -> Option<Error> {
        critical_section::with(|cs| self.shutdown.borrow_ref(cs).clone())
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_shutdown() {
            return Err(Error::Shutdown);
        }
        Ok(())
    }

    fn fatal<T: StepTimer, R>(&self, timer: &mut T, result: Result<R>) -> Result<R> {
        if let Err(err) = &result {
            self.shutdown(err.clone(), timer);
        }
        result
    }
}
