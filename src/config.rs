use embedded_time::{duration::Milliseconds, rate::Hertz};

use crate::{Error, Result};

/// Pulse widths (in ticks) of 0% and 100% throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub min_pulse_ticks: u32,
    pub max_pulse_ticks: u32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            min_pulse_ticks: 1000,
            max_pulse_ticks: 2000,
        }
    }
}

/// Arm sequence constants. These must match the ESC firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmConfig {
    /// Pulse width the ESC reads as "enter arm mode".
    pub trigger_ticks: u32,

    /// Idle pulse width the ESC acknowledges as armed.
    pub steady_ticks: u32,

    pub trigger_hold: Milliseconds<u32>,

    /// Hold at minimum pulse width, shorter than `trigger_hold`.
    pub safety_hold: Milliseconds<u32>,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            trigger_ticks: 1200,
            steady_ticks: 1050,
            trigger_hold: Milliseconds(5000),
            safety_hold: Milliseconds(2000),
        }
    }
}

/// Compiled-in power train configuration.
///
/// The default runs a 1 MHz counter (1 us per tick) at 50 Hz, the standard
/// RC servo frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Counter tick rate.
    pub resolution: Hertz<u32>,

    /// PWM frequency.
    pub frequency: Hertz<u32>,
    pub calibration: Calibration,
    pub arm: ArmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution: Hertz(1_000_000),
            frequency: Hertz(50),
            calibration: Calibration::default(),
            arm: ArmConfig::default(),
        }
    }
}

impl Config {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Counter period in ticks.
    pub fn period_ticks(&self) -> Result<u32> {
        if self.frequency.0 == 0 || self.resolution.0 < self.frequency.0 {
            return Err(Error::InvalidArgument);
        }
        Ok(self.resolution.0 / self.frequency.0)
    }

    /// Check that every pulse fits in the period and every pulse written to a
    /// channel stays within the calibrated range.
    pub fn validate(&self) -> Result<()> {
        let period = self.period_ticks()?;
        let Calibration {
            min_pulse_ticks: min,
            max_pulse_ticks: max,
        } = self.calibration;

        if min >= max || max > period {
            return Err(Error::InvalidArgument);
        }

        let range = min..=max;
        if !range.contains(&self.arm.trigger_ticks) || !range.contains(&self.arm.steady_ticks) {
            return Err(Error::InvalidArgument);
        }

        if self.arm.safety_hold.0 >= self.arm.trigger_hold.0 {
            return Err(Error::InvalidArgument);
        }

        Ok(())
    }
}

/// Builder for a validated [`Config`].
#[derive(Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn resolution(mut self, resolution: Hertz<u32>) -> Self {
        self.config.resolution = resolution;
        self
    }

    pub fn frequency(mut self, frequency: Hertz<u32>) -> Self {
        self.config.frequency = frequency;
        self
    }

    pub fn pulse_range(mut self, min_pulse_ticks: u32, max_pulse_ticks: u32) -> Self {
        self.config.calibration = Calibration {
            min_pulse_ticks,
            max_pulse_ticks,
        };
        self
    }

    pub fn trigger(mut self, ticks: u32) -> Self {
        self.config.arm.trigger_ticks = ticks;
        self
    }

    pub fn steady(mut self, ticks: u32) -> Self {
        self.config.arm.steady_ticks = ticks;
        self
    }

    pub fn trigger_hold(mut self, hold: Milliseconds<u32>) -> Self {
        self.config.arm.trigger_hold = hold;
        self
    }

    pub fn safety_hold(mut self, hold: Milliseconds<u32>) -> Self {
        self.config.arm.safety_hold = hold;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert_eq!(config.period_ticks(), Ok(20_000));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_constants() {
        assert_eq!(
            Config::builder().frequency(Hertz(0)).build(),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            Config::builder().pulse_range(2000, 1000).build(),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            Config::builder().frequency(Hertz(1000)).build(),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            Config::builder().trigger(2500).build(),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            Config::builder().safety_hold(Milliseconds(5000)).build(),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn builds_custom_config() {
        let config = Config::builder()
            .frequency(Hertz(400))
            .pulse_range(1000, 2000)
            .trigger(1000)
            .steady(1000)
            .trigger_hold(Milliseconds(3000))
            .safety_hold(Milliseconds(1000))
            .build()
            .unwrap();

        assert_eq!(config.period_ticks(), Ok(2500));
        assert_eq!(config.arm.trigger_hold.0, 3000);
    }
}
