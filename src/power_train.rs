use embedded_hal::blocking::delay::DelayMs;
use log::{error, info, warn};

use crate::{
    arm::{ArmSequence, ArmStage},
    config::Config,
    hal::PwmPeripheral,
    motor::MotorHandler,
    timebase::Timebase,
    Error, Result,
};

/// A fixed set of `N` motors sharing `T` timebases, initialized and armed as
/// one unit.
///
/// Bring-up is all or nothing: a power train with one failed motor is never
/// left half running and can never be armed.
///
/// ```
/// use embedded_powertrain::{Config, PowerTrain, QuadMotor};
/// # use embedded_powertrain::{hal::PwmPeripheral, Result};
/// # struct Pwm;
/// # impl PwmPeripheral for Pwm {
/// #     type Timebase = ();
/// #     type Channel = ();
/// #     type Pin = u8;
/// #     fn max_period_ticks(&self) -> u32 { u32::from(u16::MAX) }
/// #     fn create_timebase(&mut self, _: u8, _: u32) -> Result<()> { Ok(()) }
/// #     fn start_timebase(&mut self, _: &mut ()) -> Result<()> { Ok(()) }
/// #     fn stop_timebase(&mut self, _: &mut ()) -> Result<()> { Ok(()) }
/// #     fn create_channel(&mut self, _: &(), _: u8) -> Result<()> { Ok(()) }
/// #     fn set_threshold(&mut self, _: &mut (), _: u32) -> Result<()> { Ok(()) }
/// # }
/// # struct Delay;
/// # impl embedded_hal::blocking::delay::DelayMs<u32> for Delay {
/// #     fn delay_ms(&mut self, _: u32) {}
/// # }
/// # fn main() -> Result<()> {
/// let mut power_train = PowerTrain::quad(Pwm, Config::default(), [25, 26, 32, 33])?;
///
/// power_train.initialize()?;
/// power_train.arm(&mut Delay)?;
///
/// power_train.set_throttle(QuadMotor::ForwardLeft, 50.)?;
/// assert_eq!(power_train.threshold(QuadMotor::ForwardLeft)?, Some(1500));
/// # Ok(())
/// # }
/// ```
pub struct PowerTrain<H: PwmPeripheral, const N: usize, const T: usize> {
    peripheral: H,
    config: Config,
    timebase_ids: [u8; T],
    timebases: [Option<Timebase<H>>; T],
    motors: [MotorHandler<H>; N],
    arm: ArmSequence,
}

impl<H: PwmPeripheral> PowerTrain<H, 4, 2> {
    /// Create a quad-copter power train.
    ///
    /// The forward motors share timebase 0 and the backward motors share
    /// timebase 1. Pins are given in [`QuadMotor`](crate::QuadMotor) order.
    pub fn quad(peripheral: H, config: Config, pins: [H::Pin; 4]) -> Result<Self> {
        let [forward_left, forward_right, backward_left, backward_right] = pins;
        Self::new(
            peripheral,
            config,
            [0, 1],
            [
                MotorHandler::new("Forward Left(1)", forward_left, 0),
                MotorHandler::new("Forward Right(2)", forward_right, 0),
                MotorHandler::new("Backward Left(3)", backward_left, 1),
                MotorHandler::new("Backward Right(4)", backward_right, 1),
            ],
        )
    }
}

impl<H: PwmPeripheral, const N: usize, const T: usize> PowerTrain<H, N, T> {
    /// Create a power train from its motors and the peripheral ids of its
    /// timebases. Each motor names its timebase by index into `timebase_ids`.
    pub fn new(
        peripheral: H,
        config: Config,
        timebase_ids: [u8; T],
        motors: [MotorHandler<H>; N],
    ) -> Result<Self> {
        config.validate()?;

        if motors.iter().any(|motor| motor.timebase() >= T) {
            error!("Engine bound to a timer outside of the power train");
            return Err(Error::InvalidArgument);
        }

        for (index, id) in timebase_ids.iter().enumerate() {
            if timebase_ids[index + 1..].contains(id) {
                error!("Timer {} listed twice", id);
                return Err(Error::InvalidArgument);
            }
        }

        Ok(Self {
            peripheral,
            arm: ArmSequence::new(config.arm, config.calibration.min_pulse_ticks),
            config,
            timebase_ids,
            timebases: core::array::from_fn(|_| None),
            motors,
        })
    }

    /// Create and start every timebase, then bind every motor to its channel.
    ///
    /// The first failure tears down everything brought up so far and is
    /// returned.
    pub fn initialize(&mut self) -> Result<()> {
        if self.is_initialized() {
            warn!("Power train already initialized");
            return Ok(());
        }

        info!("Initializing power train of {} engines", N);
        if let Err(e) = self.bring_up() {
            error!("Power train initialization failed: {}", e);
            let _ = self.tear_down();
            return Err(e);
        }

        info!("Power train initialized");
        Ok(())
    }

    fn bring_up(&mut self) -> Result<()> {
        let period_ticks = self.config.period_ticks()?;

        for (slot, &id) in self.timebases.iter_mut().zip(&self.timebase_ids) {
            let timebase = slot.insert(Timebase::create(&mut self.peripheral, id, period_ticks)?);
            timebase.start(&mut self.peripheral)?;
        }

        for motor in self.motors.iter_mut() {
            let timebase = self.timebases[motor.timebase()]
                .as_ref()
                .ok_or(Error::NotInitialized)?;
            motor.initialize(&mut self.peripheral, timebase)?;
        }

        Ok(())
    }

    /// Release every channel and stop every timebase, returning the first
    /// stop error once all of them have been attempted.
    fn tear_down(&mut self) -> Result<()> {
        for motor in self.motors.iter_mut() {
            motor.release();
        }

        let mut result = Ok(());
        for slot in self.timebases.iter_mut() {
            if let Some(timebase) = slot.take() {
                let id = timebase.id();
                if let Err(e) = timebase.stop(&mut self.peripheral) {
                    error!("Failed to stop timer {}: {}", id, e);
                    result = result.and(Err(e));
                }
            }
        }

        self.arm.reset();
        result
    }

    /// Run the ESC arm sequence on every motor, blocking on `delay` for each
    /// hold.
    pub fn arm<D: DelayMs<u32>>(&mut self, delay: &mut D) -> Result<()> {
        if !self.is_initialized() {
            error!("Refusing to arm an uninitialized power train");
            return Err(Error::NotInitialized);
        }

        self.arm.run(&mut self.peripheral, &mut self.motors, delay)
    }

    /// Set the throttle percentage of the motor at `slot`.
    ///
    /// Percentages outside `[0, 100]` saturate. Fails with
    /// [`Error::OutOfRange`] for an unknown slot and with [`Error::NotArmed`]
    /// before the arm sequence finished, without touching any channel.
    pub fn set_throttle(&mut self, slot: impl Into<usize>, pct: f32) -> Result<()> {
        let slot = slot.into();
        let motor = self.motors.get_mut(slot).ok_or(Error::OutOfRange(slot))?;

        if !self.arm.is_armed() {
            warn!("Ignoring throttle for engine {} before arming", motor.tag());
            return Err(Error::NotArmed);
        }

        motor.set_throttle(&mut self.peripheral, pct, &self.config.calibration)
    }

    /// Set the throttle of every motor in slot order.
    pub fn set_throttles(&mut self, pcts: [f32; N]) -> Result<()> {
        for (slot, pct) in pcts.into_iter().enumerate() {
            self.set_throttle(slot, pct)?;
        }
        Ok(())
    }

    /// Drop every motor to 0% throttle.
    pub fn cut_throttle(&mut self) -> Result<()> {
        self.set_throttles([0.; N])?;
        info!("Killed engines");
        Ok(())
    }

    /// Drive every motor to the minimum pulse, stop every timebase and
    /// release all resources. The power train returns to uninitialized and
    /// must be initialized and armed again before use.
    ///
    /// Every step is attempted; the first error is returned.
    pub fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down power train");

        let min_pulse_ticks = self.config.calibration.min_pulse_ticks;
        let mut result = Ok(());
        for motor in self.motors.iter_mut().filter(|motor| motor.is_initialized()) {
            result = result.and(motor.set_threshold(&mut self.peripheral, min_pulse_ticks));
        }

        result.and(self.tear_down())
    }

    /// Throttle percentage last applied to the motor at `slot`.
    pub fn throttle(&self, slot: impl Into<usize>) -> Result<f32> {
        self.motor(slot).map(MotorHandler::throttle)
    }

    /// Pulse width last written to the motor at `slot`.
    pub fn threshold(&self, slot: impl Into<usize>) -> Result<Option<u32>> {
        self.motor(slot).map(MotorHandler::threshold)
    }

    pub fn motor(&self, slot: impl Into<usize>) -> Result<&MotorHandler<H>> {
        let slot = slot.into();
        self.motors.get(slot).ok_or(Error::OutOfRange(slot))
    }

    pub fn motors(&self) -> &[MotorHandler<H>; N] {
        &self.motors
    }

    /// The timebase at `index`, once created.
    pub fn timebase(&self, index: usize) -> Option<&Timebase<H>> {
        self.timebases.get(index).and_then(Option::as_ref)
    }

    pub fn stage(&self) -> ArmStage {
        self.arm.stage()
    }

    pub fn is_armed(&self) -> bool {
        self.arm.is_armed()
    }

    pub fn is_initialized(&self) -> bool {
        self.timebases.iter().all(Option::is_some)
            && self.motors.iter().all(MotorHandler::is_initialized)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn peripheral(&self) -> &H {
        &self.peripheral
    }
}
