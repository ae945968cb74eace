//! Controller tying transport, watchdog and actuator together
//!
//! The outer loop owns the peripherals and the clock; it feeds received
//! frames in through [`Controller::on_frame_received`], calls
//! [`Controller::poll`] on a fixed cadence, and drains the outbound queue
//! into the bus hardware afterwards. Everything in here returns
//! immediately.

use freno_protocol::{
    BrakeCommand, BrakeTelemetry, CanFrame, Health, Heartbeat, FRAME_ID_BRAKE_COMMAND,
    FRAME_ID_HEARTBEAT,
};

use crate::brake::{BrakeActuator, BrakeConfig, BrakeState};
use crate::indicator::LedPattern;
use crate::traits::{MotorDrive, PositionSensor};
use crate::transport::Transport;
use crate::watchdog::{Watchdog, WatchdogConfig};

/// Telemetry transmission period in ms
pub const TELEMETRY_PERIOD_MS: u32 = 100;

/// The firmware core: message dispatch, periodic transmissions, health
#[derive(Debug)]
pub struct Controller {
    transport: Transport,
    watchdog: Watchdog,
    brake: BrakeActuator,
    telemetry_seq: u8,
    last_telemetry_tick: u32,
}

impl Controller {
    /// Create the controller around an initial position sample
    pub fn new(
        watchdog_config: WatchdogConfig,
        brake_config: BrakeConfig,
        initial_position: u16,
    ) -> Self {
        Self {
            transport: Transport::new(),
            watchdog: Watchdog::new(watchdog_config),
            brake: BrakeActuator::new(brake_config, initial_position),
            telemetry_seq: 0,
            last_telemetry_tick: 0,
        }
    }

    /// Accept a received frame from the bus interrupt
    ///
    /// Returns false and drops the frame when the inbound queue is full.
    pub fn on_frame_received(&mut self, frame: CanFrame) -> bool {
        self.transport.enqueue_inbound(frame)
    }

    /// One pass of the polling loop
    ///
    /// Dispatches queued inbound frames, feeds the actuator a fresh
    /// position sample, advances the state machine, emits any due periodic
    /// messages and re-derives the health value.
    pub fn poll(
        &mut self,
        now: u32,
        sensor: &mut impl PositionSensor,
        motor: &mut impl MotorDrive,
    ) {
        while let Some(frame) = self.transport.dequeue_inbound() {
            self.dispatch(&frame, now);
        }

        let sample = sensor.sample();
        self.brake.update_position(sample, motor);
        self.brake.update(now, motor);

        if let Some(heartbeat) = self.watchdog.on_tick(now) {
            self.transport.enqueue_outbound(heartbeat.to_frame());
        }
        if now.wrapping_sub(self.last_telemetry_tick) >= TELEMETRY_PERIOD_MS {
            let _ = self.enqueue_telemetry(now);
        }

        self.watchdog.evaluate_health(now, self.brake.has_fault());
    }

    /// Route one decoded inbound frame
    ///
    /// Frames that fail to decode (wrong DLC, out-of-range field) and
    /// frames with unknown ids are dropped without side effects.
    fn dispatch(&mut self, frame: &CanFrame, now: u32) {
        match frame.id() {
            FRAME_ID_HEARTBEAT => {
                if let Ok(heartbeat) = Heartbeat::from_frame(frame) {
                    self.watchdog.on_peer_heartbeat(&heartbeat, now);
                }
            }
            FRAME_ID_BRAKE_COMMAND => {
                if let Ok(command) = BrakeCommand::from_frame(frame) {
                    self.brake.command(command.request, now);
                }
            }
            _ => {}
        }
    }

    /// Build and queue one telemetry message
    ///
    /// The sequence counter and period clock only advance when the frame
    /// was actually queued, so a full outbound queue neither skips a
    /// sequence number nor suppresses the next attempt.
    fn enqueue_telemetry(&mut self, now: u32) -> bool {
        let telemetry = self.build_telemetry(now);
        if !self.transport.enqueue_outbound(telemetry.to_frame()) {
            return false;
        }
        self.telemetry_seq = self.telemetry_seq.wrapping_add(1);
        self.last_telemetry_tick = now;
        true
    }

    /// Snapshot the actuator into a telemetry message
    ///
    /// Exactly one state flag is set in any non-stopped state; Stopped
    /// reports no flag at all.
    fn build_telemetry(&self, now: u32) -> BrakeTelemetry {
        let state = self.brake.state();
        BrakeTelemetry {
            msg_id: self.telemetry_seq,
            stamp: now as u16,
            releasing: state == BrakeState::Releasing,
            released: state == BrakeState::Released,
            pushing: state == BrakeState::Pushing,
            pushed: state == BrakeState::Pushed,
            time_to_end_ms: self.brake.time_to_end(now).min(u32::from(u16::MAX)) as u16,
        }
    }

    /// Hand queued outbound frames to the bus sender (see
    /// [`Transport::drain_outbound`])
    pub fn drain_outbound(&mut self, send: impl FnMut(&CanFrame) -> bool) -> usize {
        self.transport.drain_outbound(send)
    }

    /// Queue a heartbeat immediately, outside the periodic cadence
    ///
    /// The periodic clock restarts from this send.
    pub fn send_heartbeat_now(&mut self, now: u32) -> bool {
        let heartbeat = self.watchdog.announce(now);
        self.transport.enqueue_outbound(heartbeat.to_frame())
    }

    /// Queue a telemetry message immediately, outside the periodic cadence
    ///
    /// Returns false without consuming a sequence number when the outbound
    /// queue is full; the periodic cadence is unaffected in that case.
    pub fn send_telemetry_now(&mut self, now: u32) -> bool {
        self.enqueue_telemetry(now)
    }

    /// Halt the motor and force the actuator to its stopped state
    pub fn emergency_stop(&mut self, motor: &mut impl MotorDrive) {
        self.brake.emergency_stop(motor);
    }

    /// Attempt recovery from the stopped state with a fresh sample
    ///
    /// The motor is halted first so a successful recovery never resumes a
    /// stale operation.
    pub fn recover(
        &mut self,
        sensor: &mut impl PositionSensor,
        motor: &mut impl MotorDrive,
    ) -> bool {
        motor.stop();
        self.brake.recover(sensor.sample())
    }

    /// Current health value
    pub fn health(&self) -> Health {
        self.watchdog.health()
    }

    /// Manual diagnostic override of the health value
    pub fn set_health(&mut self, health: Health) {
        self.watchdog.set_health(health);
    }

    /// Current actuator state
    pub fn brake_state(&self) -> BrakeState {
        self.brake.state()
    }

    /// Last accepted actuator position sample
    pub fn brake_position(&self) -> u16 {
        self.brake.position()
    }

    /// Actuator position as a percentage of travel
    pub fn brake_position_percent(&self) -> u8 {
        self.brake.position_percent()
    }

    /// Estimated time to operation end in ms
    pub fn time_to_end(&self, now: u32) -> u32 {
        self.brake.time_to_end(now)
    }

    /// What the status LED should currently show
    pub fn led_pattern(&self) -> LedPattern {
        LedPattern::from(self.brake.state())
    }

    /// Frames waiting in the inbound queue
    pub fn rx_pending(&self) -> usize {
        self.transport.rx_count()
    }

    /// Frames waiting for transmission
    pub fn tx_pending(&self) -> usize {
        self.transport.tx_count()
    }
}
