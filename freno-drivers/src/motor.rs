//! BTN7971B half-bridge motor driver
//!
//! Control logic:
//! - push: INH high, PWM on the IN pin
//! - release: INH low, PWM on the IN pin (inverted logic)
//! - stop: duty 0 and INH low, so the bridge is disabled even if the PWM
//!   output glitches
//!
//! The driver only computes pin states; the board layer reads
//! `inhibit_pin_state()` and `duty_percent()` after each state-machine tick
//! and applies them to the GPIO and timer compare register.

use freno_core::traits::{Direction, MotorDrive};

/// BTN7971B half bridge, modeled as an inhibit level plus a PWM duty
#[derive(Debug, Default)]
pub struct Btn7971 {
    inhibit: bool,
    duty: u8,
}

impl Btn7971 {
    /// Create a driver with the bridge disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Level to apply to the INH pin (true = bridge enabled, push direction)
    pub fn inhibit_pin_state(&self) -> bool {
        self.inhibit
    }

    /// Duty cycle to apply to the IN pin PWM, 0-100 %
    pub fn duty_percent(&self) -> u8 {
        self.duty
    }

    /// Whether the motor is currently being driven
    pub fn is_running(&self) -> bool {
        self.duty > 0
    }
}

impl MotorDrive for Btn7971 {
    fn drive(&mut self, direction: Direction, duty_percent: u8) {
        self.inhibit = direction == Direction::Push;
        self.duty = duty_percent.min(100);
    }

    fn stop(&mut self) {
        self.duty = 0;
        self.inhibit = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disabled() {
        let motor = Btn7971::new();
        assert!(!motor.inhibit_pin_state());
        assert_eq!(motor.duty_percent(), 0);
        assert!(!motor.is_running());
    }

    #[test]
    fn test_push_sets_inhibit_high() {
        let mut motor = Btn7971::new();
        motor.drive(Direction::Push, 80);
        assert!(motor.inhibit_pin_state());
        assert_eq!(motor.duty_percent(), 80);
        assert!(motor.is_running());
    }

    #[test]
    fn test_release_sets_inhibit_low() {
        let mut motor = Btn7971::new();
        motor.drive(Direction::Release, 80);
        assert!(!motor.inhibit_pin_state());
        assert_eq!(motor.duty_percent(), 80);
    }

    #[test]
    fn test_duty_clamped_to_100() {
        let mut motor = Btn7971::new();
        motor.drive(Direction::Push, 250);
        assert_eq!(motor.duty_percent(), 100);
    }

    #[test]
    fn test_stop_disables_bridge() {
        let mut motor = Btn7971::new();
        motor.drive(Direction::Push, 80);
        motor.stop();
        assert!(!motor.inhibit_pin_state());
        assert_eq!(motor.duty_percent(), 0);
        assert!(!motor.is_running());
    }
}
