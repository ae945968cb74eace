//! Brake actuator state machine
//!
//! Drives the actuator toward a commanded end position using potentiometer
//! feedback, estimates time to completion, and detects faults. All faults
//! surface as state transitions or boolean queries; nothing here panics or
//! aborts the polling loop.
//!
//! Fault taxonomy:
//! - a single out-of-range sample is counted and otherwise ignored;
//! - a run of out-of-range samples at the threshold forces Stopped and
//!   asserts the fault signal until an explicit recovery succeeds;
//! - an operation that outruns its timeout forces Stopped but leaves the
//!   fault signal clear, so fresh commands are still accepted.

use freno_protocol::BrakeRequest;

use crate::traits::{Direction, MotorDrive};

/// Brake actuator tunables
///
/// Positions are raw 12-bit ADC counts. Defaults carry the reference
/// hardware values; tests inject their own.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrakeConfig {
    /// Feedback count at the fully released position
    pub position_released: u16,
    /// Feedback count at the fully pushed position
    pub position_pushed: u16,
    /// Window around an end position considered "arrived"
    pub tolerance: u16,
    /// PWM duty while pushing, in percent
    pub duty_push: u8,
    /// PWM duty while releasing, in percent
    pub duty_release: u8,
    /// Seed for the remaining-time estimate at operation start, in ms
    pub default_estimate_ms: u32,
    /// Maximum allowed operation duration before Stopped, in ms
    pub operation_timeout_ms: u32,
    /// Lowest plausible feedback count
    pub valid_min: u16,
    /// Highest plausible feedback count
    pub valid_max: u16,
    /// Consecutive implausible samples that force Stopped
    pub max_invalid_samples: u8,
}

impl Default for BrakeConfig {
    fn default() -> Self {
        Self {
            position_released: 200,
            position_pushed: 3800,
            tolerance: 100,
            duty_push: 80,
            duty_release: 80,
            default_estimate_ms: 2000,
            operation_timeout_ms: 5000,
            valid_min: 50,
            valid_max: 4000,
            max_invalid_samples: 10,
        }
    }
}

/// Actuator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrakeState {
    /// Resting at the released end position
    Released,
    /// Moving toward the released end position
    Releasing,
    /// Moving toward the pushed end position
    Pushing,
    /// Resting at the pushed end position
    Pushed,
    /// Motor halted after a timeout, sustained invalid feedback, or an
    /// emergency stop; terminal until explicit recovery
    Stopped,
}

/// Timing context of an in-flight push or release operation
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Operation {
    /// Tick at which the transition began
    started_at: u32,
    /// Current remaining-time estimate in ms
    estimate_ms: u32,
}

/// The brake actuator state machine
#[derive(Debug)]
pub struct BrakeActuator {
    config: BrakeConfig,
    state: BrakeState,
    position: u16,
    invalid_samples: u8,
    op: Option<Operation>,
}

impl BrakeActuator {
    /// Create the state machine, classifying the initial position sample
    ///
    /// At or below released + tolerance the actuator starts Released; at or
    /// above pushed - tolerance it starts Pushed; mid-stroke defaults to
    /// Released.
    pub fn new(config: BrakeConfig, initial_position: u16) -> Self {
        let state = classify(&config, initial_position);
        Self {
            config,
            state,
            position: initial_position,
            invalid_samples: 0,
            op: None,
        }
    }

    /// Current state
    pub fn state(&self) -> BrakeState {
        self.state
    }

    /// Last accepted position sample
    pub fn position(&self) -> u16 {
        self.position
    }

    /// Whether the invalid-feedback counter has reached its threshold
    ///
    /// Feeds the watchdog Failure escalation and gates command acceptance.
    pub fn has_fault(&self) -> bool {
        self.invalid_samples >= self.config.max_invalid_samples
    }

    fn is_plausible(&self, sample: u16) -> bool {
        (self.config.valid_min..=self.config.valid_max).contains(&sample)
    }

    /// Feed a fresh position sample
    ///
    /// A plausible sample is stored and clears the invalid counter. An
    /// implausible one is counted; at the threshold the actuator is forced
    /// to Stopped with the motor halted.
    pub fn update_position(&mut self, sample: u16, motor: &mut impl MotorDrive) {
        if self.is_plausible(sample) {
            self.position = sample;
            self.invalid_samples = 0;
            return;
        }

        self.invalid_samples = self.invalid_samples.saturating_add(1);
        if self.has_fault() {
            self.state = BrakeState::Stopped;
            self.op = None;
            motor.stop();
        }
    }

    /// Apply a commanded end-state
    ///
    /// Idempotent: a push while Pushing or Pushed is ignored, likewise for
    /// release. Commands are rejected outright while stopped on sustained
    /// invalid feedback; a timeout-induced stop accepts fresh commands.
    pub fn command(&mut self, request: BrakeRequest, now: u32) {
        if self.state == BrakeState::Stopped && self.has_fault() {
            return;
        }

        match request {
            BrakeRequest::Push => {
                if !matches!(self.state, BrakeState::Pushing | BrakeState::Pushed) {
                    self.begin(BrakeState::Pushing, now);
                }
            }
            BrakeRequest::Release => {
                if !matches!(self.state, BrakeState::Releasing | BrakeState::Released) {
                    self.begin(BrakeState::Releasing, now);
                }
            }
        }
    }

    fn begin(&mut self, state: BrakeState, now: u32) {
        self.state = state;
        self.op = Some(Operation {
            started_at: now,
            estimate_ms: self.config.default_estimate_ms,
        });
    }

    /// Advance the state machine one tick
    ///
    /// Checks the operation timeout first, then drives toward the target or
    /// keeps the motor stopped, per state.
    pub fn update(&mut self, now: u32, motor: &mut impl MotorDrive) {
        if matches!(self.state, BrakeState::Pushing | BrakeState::Releasing) {
            if let Some(op) = self.op {
                if now.wrapping_sub(op.started_at) > self.config.operation_timeout_ms {
                    self.state = BrakeState::Stopped;
                    self.op = None;
                    motor.stop();
                    return;
                }
            }
        }

        match self.state {
            BrakeState::Pushing => {
                self.refresh_estimate(now);
                let arrived =
                    self.position >= self.config.position_pushed.saturating_sub(self.config.tolerance);
                if arrived {
                    self.state = BrakeState::Pushed;
                    self.op = None;
                    motor.stop();
                } else {
                    motor.drive(Direction::Push, self.config.duty_push);
                }
            }
            BrakeState::Releasing => {
                self.refresh_estimate(now);
                let arrived = self.position
                    <= self.config.position_released.saturating_add(self.config.tolerance);
                if arrived {
                    self.state = BrakeState::Released;
                    self.op = None;
                    motor.stop();
                } else {
                    motor.drive(Direction::Release, self.config.duty_release);
                }
            }
            BrakeState::Released | BrakeState::Pushed | BrakeState::Stopped => {
                motor.stop();
            }
        }
    }

    /// Extrapolate the remaining-time estimate from progress so far
    ///
    /// Until measurable progress exists the seed estimate is kept, so no
    /// division by a near-zero distance ever happens.
    fn refresh_estimate(&mut self, now: u32) {
        let (start, target) = match self.state {
            BrakeState::Pushing => (self.config.position_released, self.config.position_pushed),
            BrakeState::Releasing => (self.config.position_pushed, self.config.position_released),
            _ => return,
        };
        let position = self.position;
        let Some(op) = self.op.as_mut() else {
            return;
        };

        let total = (i32::from(target) - i32::from(start)).unsigned_abs();
        let remaining = (i32::from(target) - i32::from(position)).unsigned_abs();
        if remaining >= total {
            // No progress yet (or moving the wrong way): keep the seed
            return;
        }
        let covered = total - remaining;

        let elapsed = now.wrapping_sub(op.started_at);
        let estimate = u64::from(elapsed) * u64::from(remaining) / u64::from(covered);
        op.estimate_ms = estimate.min(u64::from(u32::MAX)) as u32;
    }

    /// Estimated time until the in-flight operation completes, in ms
    ///
    /// Zero in every state except Pushing and Releasing.
    pub fn time_to_end(&self, now: u32) -> u32 {
        match (self.state, self.op) {
            (BrakeState::Pushing | BrakeState::Releasing, Some(op)) => {
                op.estimate_ms.saturating_sub(now.wrapping_sub(op.started_at))
            }
            _ => 0,
        }
    }

    /// Position as a percentage of travel, clamped to 0-100
    ///
    /// 0 % is the released reference, 100 % the pushed reference.
    pub fn position_percent(&self) -> u8 {
        let released = self.config.position_released;
        let pushed = self.config.position_pushed;
        if self.position <= released {
            return 0;
        }
        if self.position >= pushed {
            return 100;
        }
        let range = u32::from(pushed - released);
        let offset = u32::from(self.position - released);
        (offset * 100 / range) as u8
    }

    /// Halt the motor and force Stopped, regardless of state or feedback
    pub fn emergency_stop(&mut self, motor: &mut impl MotorDrive) {
        motor.stop();
        self.state = BrakeState::Stopped;
        self.op = None;
    }

    /// Attempt to leave Stopped using a fresh position sample
    ///
    /// A plausible sample is classified against the end-position thresholds,
    /// the invalid counter is cleared, and recovery succeeds. An implausible
    /// sample leaves Stopped and the counter in place, so commands stay
    /// rejected.
    pub fn recover(&mut self, sample: u16) -> bool {
        if !self.is_plausible(sample) {
            return false;
        }
        self.position = sample;
        self.invalid_samples = 0;
        self.state = classify(&self.config, sample);
        self.op = None;
        true
    }
}

fn classify(config: &BrakeConfig, position: u16) -> BrakeState {
    if position <= config.position_released.saturating_add(config.tolerance) {
        BrakeState::Released
    } else if position >= config.position_pushed.saturating_sub(config.tolerance) {
        BrakeState::Pushed
    } else {
        // Mid-stroke: assume released
        BrakeState::Released
    }
}
