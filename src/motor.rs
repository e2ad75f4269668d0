use log::{debug, info};

use crate::{
    channel::PwmChannel,
    config::Calibration,
    hal::PwmPeripheral,
    mapping::{clamp_percentage, ticks_of},
    timebase::Timebase,
    Error, Result,
};

/// Motor slots of a quad-copter power train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadMotor {
    ForwardLeft = 0,
    ForwardRight = 1,
    BackwardLeft = 2,
    BackwardRight = 3,
}

impl From<QuadMotor> for usize {
    fn from(motor: QuadMotor) -> Self {
        motor as usize
    }
}

/// A logical motor bound to one PWM channel.
pub struct MotorHandler<H: PwmPeripheral> {
    tag: &'static str,
    pin: H::Pin,
    timebase: usize,
    channel: Option<PwmChannel<H>>,
    throttle: f32,
}

impl<H: PwmPeripheral> MotorHandler<H> {
    /// Create a motor driven through `pin` on the power train timebase at
    /// index `timebase`.
    pub fn new(tag: &'static str, pin: H::Pin, timebase: usize) -> Self {
        Self {
            tag,
            pin,
            timebase,
            channel: None,
            throttle: 0.,
        }
    }

    pub(crate) fn initialize(&mut self, peripheral: &mut H, timebase: &Timebase<H>) -> Result<()> {
        self.channel = Some(PwmChannel::initialize(peripheral, timebase, self.pin)?);
        self.throttle = 0.;

        info!("Engine {} bound to timer {}", self.tag, timebase.id());
        Ok(())
    }

    pub(crate) fn release(&mut self) {
        self.channel = None;
        self.throttle = 0.;
    }

    /// Write a raw pulse width, bypassing the throttle mapping.
    pub(crate) fn set_threshold(&mut self, peripheral: &mut H, ticks: u32) -> Result<()> {
        self.channel
            .as_mut()
            .ok_or(Error::NotInitialized)?
            .set_threshold(peripheral, ticks)
    }

    pub(crate) fn set_throttle(
        &mut self,
        peripheral: &mut H,
        pct: f32,
        calibration: &Calibration,
    ) -> Result<()> {
        let pct = clamp_percentage(pct);
        let ticks = ticks_of(pct, calibration);

        debug!(
            "Engine {} throttle percentage change: {:.2}% -> {:.2}% ({} ticks)",
            self.tag, self.throttle, pct, ticks
        );

        self.set_threshold(peripheral, ticks)?;
        self.throttle = pct;
        Ok(())
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Last throttle percentage written to the channel.
    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    /// Last pulse width written to the channel.
    pub fn threshold(&self) -> Option<u32> {
        self.channel.as_ref().and_then(PwmChannel::threshold)
    }

    pub fn channel(&self) -> Option<&PwmChannel<H>> {
        self.channel.as_ref()
    }

    /// Index of the power train timebase this motor runs on.
    pub fn timebase(&self) -> usize {
        self.timebase
    }

    pub fn is_initialized(&self) -> bool {
        self.channel.is_some()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::hal::mock::{mock, MockPwm};

    #[test]
    fn quad_slots() {
        assert_eq!(usize::from(QuadMotor::ForwardLeft), 0);
        assert_eq!(usize::from(QuadMotor::BackwardRight), 3);
    }

    #[test]
    fn throttle_requires_channel() {
        let (mut pwm, _) = mock();
        let mut motor = MotorHandler::<MockPwm>::new("Forward Left(1)", 25, 0);

        assert_eq!(
            motor.set_throttle(&mut pwm, 50., &Calibration::default()),
            Err(Error::NotInitialized)
        );
        assert!(pwm.events().is_empty());
    }

    #[test]
    fn records_clamped_throttle() {
        let (mut pwm, _) = mock();
        let timebase = Timebase::<MockPwm>::create(&mut pwm, 0, 20_000).unwrap();
        let mut motor = MotorHandler::new("Forward Left(1)", 25, 0);
        motor.initialize(&mut pwm, &timebase).unwrap();

        motor.set_throttle(&mut pwm, 37.5, &Calibration::default()).unwrap();
        assert_relative_eq!(motor.throttle(), 37.5);
        assert_eq!(motor.threshold(), Some(1375));

        motor.set_throttle(&mut pwm, 120., &Calibration::default()).unwrap();
        assert_relative_eq!(motor.throttle(), 100.);
        assert_eq!(motor.threshold(), Some(2000));
    }
}
