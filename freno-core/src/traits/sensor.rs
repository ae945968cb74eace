//! Position feedback trait

/// Source of raw actuator position samples
///
/// The reference hardware is a potentiometer on a 12-bit ADC, so samples
/// fall in 0-4095. Range plausibility is judged by the state machine, not
/// by the sensor.
pub trait PositionSensor {
    /// Take a position sample
    fn sample(&mut self) -> u16;
}
