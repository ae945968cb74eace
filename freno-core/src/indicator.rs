//! Status LED pattern logic
//!
//! Pure pin-level computation; applying the level to a GPIO stays with the
//! board layer.

use crate::brake::BrakeState;

/// Toggle period of the slow blink, in ms
pub const BLINK_SLOW_PERIOD_MS: u32 = 500;
/// Toggle period of the fast blink, in ms
pub const BLINK_FAST_PERIOD_MS: u32 = 125;

/// What the status LED should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedPattern {
    /// Solid off (actuator released)
    Off,
    /// Solid on (actuator pushed)
    On,
    /// Slow blink (operation in progress)
    BlinkSlow,
    /// Fast blink (stopped on fault or timeout)
    BlinkFast,
}

impl From<BrakeState> for LedPattern {
    fn from(state: BrakeState) -> Self {
        match state {
            BrakeState::Released => LedPattern::Off,
            BrakeState::Pushed => LedPattern::On,
            BrakeState::Releasing | BrakeState::Pushing => LedPattern::BlinkSlow,
            BrakeState::Stopped => LedPattern::BlinkFast,
        }
    }
}

/// Turns a pattern plus the current tick into an LED level
#[derive(Debug, Default)]
pub struct LedBlinker {
    level: bool,
    last_toggle_tick: u32,
}

impl LedBlinker {
    /// Create a blinker with the LED off
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the LED level for this tick
    ///
    /// Solid patterns also resynchronize the toggle clock, so a blink
    /// starting later begins from a full period.
    pub fn level(&mut self, pattern: LedPattern, now: u32) -> bool {
        match pattern {
            LedPattern::Off => {
                self.level = false;
                self.last_toggle_tick = now;
            }
            LedPattern::On => {
                self.level = true;
                self.last_toggle_tick = now;
            }
            LedPattern::BlinkSlow => self.toggle_after(BLINK_SLOW_PERIOD_MS, now),
            LedPattern::BlinkFast => self.toggle_after(BLINK_FAST_PERIOD_MS, now),
        }
        self.level
    }

    fn toggle_after(&mut self, period_ms: u32, now: u32) {
        if now.wrapping_sub(self.last_toggle_tick) >= period_ms {
            self.level = !self.level;
            self.last_toggle_tick = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_from_state() {
        assert_eq!(LedPattern::from(BrakeState::Released), LedPattern::Off);
        assert_eq!(LedPattern::from(BrakeState::Pushed), LedPattern::On);
        assert_eq!(LedPattern::from(BrakeState::Pushing), LedPattern::BlinkSlow);
        assert_eq!(LedPattern::from(BrakeState::Releasing), LedPattern::BlinkSlow);
        assert_eq!(LedPattern::from(BrakeState::Stopped), LedPattern::BlinkFast);
    }

    #[test]
    fn test_solid_levels() {
        let mut blinker = LedBlinker::new();
        assert!(!blinker.level(LedPattern::Off, 0));
        assert!(blinker.level(LedPattern::On, 10));
        assert!(!blinker.level(LedPattern::Off, 20));
    }

    #[test]
    fn test_slow_blink_toggles_every_period() {
        let mut blinker = LedBlinker::new();
        assert!(!blinker.level(LedPattern::BlinkSlow, 100));
        assert!(!blinker.level(LedPattern::BlinkSlow, 499));
        assert!(blinker.level(LedPattern::BlinkSlow, 500));
        assert!(blinker.level(LedPattern::BlinkSlow, 999));
        assert!(!blinker.level(LedPattern::BlinkSlow, 1000));
    }

    #[test]
    fn test_fast_blink_is_four_times_faster() {
        let mut blinker = LedBlinker::new();
        assert!(!blinker.level(LedPattern::BlinkFast, 100));
        assert!(blinker.level(LedPattern::BlinkFast, 125));
        assert!(!blinker.level(LedPattern::BlinkFast, 250));
    }

    #[test]
    fn test_blink_restarts_from_full_period_after_solid() {
        let mut blinker = LedBlinker::new();
        blinker.level(LedPattern::On, 1000);
        // Pattern change resets the toggle clock: no immediate toggle
        assert!(blinker.level(LedPattern::BlinkSlow, 1001));
        assert!(!blinker.level(LedPattern::BlinkSlow, 1500));
    }
}
