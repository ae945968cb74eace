//! Potentiometer position feedback
//!
//! The feedback element is a potentiometer coupled to the actuator shaft,
//! read through a 12-bit ADC. A conversion that times out yields the last
//! known reading, so the state machine always gets a value; sustained bad
//! readings surface through its own range plausibility check instead.

use freno_core::traits::PositionSensor;

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Potentiometer on an ADC channel, holding the last good reading
#[derive(Debug)]
pub struct Potentiometer<ADC> {
    adc: ADC,
    last_reading: u16,
}

impl<ADC: AdcReader> Potentiometer<ADC> {
    /// Create a sensor around an ADC channel
    ///
    /// `initial` seeds the held reading returned until the first successful
    /// conversion.
    pub fn new(adc: ADC, initial: u16) -> Self {
        Self {
            adc,
            last_reading: initial,
        }
    }

    /// Last value a conversion produced
    pub fn last_reading(&self) -> u16 {
        self.last_reading
    }
}

impl<ADC: AdcReader> PositionSensor for Potentiometer<ADC> {
    fn sample(&mut self) -> u16 {
        if let Ok(value) = self.adc.read() {
            self.last_reading = value;
        }
        self.last_reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ADC mock yielding a scripted sequence of conversion results
    struct ScriptedAdc {
        results: &'static [Result<u16, ()>],
        index: usize,
    }

    impl AdcReader for ScriptedAdc {
        fn read(&mut self) -> Result<u16, ()> {
            let result = self.results.get(self.index).copied().unwrap_or(Err(()));
            self.index += 1;
            result
        }
    }

    #[test]
    fn test_successful_conversions_pass_through() {
        let adc = ScriptedAdc {
            results: &[Ok(1000), Ok(2000)],
            index: 0,
        };
        let mut sensor = Potentiometer::new(adc, 0);
        assert_eq!(sensor.sample(), 1000);
        assert_eq!(sensor.sample(), 2000);
    }

    #[test]
    fn test_timeout_holds_last_reading() {
        let adc = ScriptedAdc {
            results: &[Ok(1500), Err(()), Err(())],
            index: 0,
        };
        let mut sensor = Potentiometer::new(adc, 0);
        assert_eq!(sensor.sample(), 1500);
        assert_eq!(sensor.sample(), 1500);
        assert_eq!(sensor.sample(), 1500);
    }

    #[test]
    fn test_seed_returned_before_first_conversion() {
        let adc = ScriptedAdc {
            results: &[Err(())],
            index: 0,
        };
        let mut sensor = Potentiometer::new(adc, 200);
        assert_eq!(sensor.sample(), 200);
        assert_eq!(sensor.last_reading(), 200);
    }
}
