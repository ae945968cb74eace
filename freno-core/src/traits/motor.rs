//! Motor drive trait
//!
//! The actuator state machine decides *whether* and *which way* to drive;
//! the implementation decides how that maps onto the power stage (half
//! bridge direction pin plus PWM duty in the reference hardware).

/// Direction of actuator travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward the pushed end position
    Push,
    /// Toward the released end position
    Release,
}

/// Interface to the motor power stage
///
/// Implementations are expected to be infallible at this level: an
/// implementation that detects a hardware fault should latch it internally
/// and drive its outputs to a safe state rather than report back, because
/// the state machine has no recovery path for drive errors.
pub trait MotorDrive {
    /// Drive the motor in the given direction at the given duty cycle
    /// (0-100 %). Called every tick while an operation is in progress.
    fn drive(&mut self, direction: Direction, duty_percent: u8);

    /// Stop the motor immediately
    fn stop(&mut self);
}
