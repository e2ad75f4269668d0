//! ESC arm sequence.
//!
//! RC ESC firmware only accepts throttle after seeing a timed pattern on its
//! input: an arm trigger pulse, then minimum throttle, then an idle pulse.
//! The firmware state machines are time gated, so every hold runs to
//! completion; a shortened hold fails silently on real hardware.

use embedded_hal::blocking::delay::DelayMs;
use log::{error, info, warn};

use crate::{config::ArmConfig, hal::PwmPeripheral, motor::MotorHandler, Result};

/// Stage of the arm sequence. Advances `Idle -> Triggering -> Safing -> Steady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmStage {
    #[default]
    Idle,

    /// Every channel holds the arm trigger pulse.
    Triggering,

    /// Every channel holds the minimum pulse.
    Safing,

    /// Every channel holds the idle pulse and the ESCs accept throttle.
    Steady,
}

/// The arm sequence of one power train.
///
/// The stage only advances once every motor has accepted the pulse of the
/// next stage, so after a failure [`stage`](Self::stage) is the last stage
/// the whole power train reached.
pub struct ArmSequence {
    config: ArmConfig,
    min_pulse_ticks: u32,
    stage: ArmStage,
}

impl ArmSequence {
    pub fn new(config: ArmConfig, min_pulse_ticks: u32) -> Self {
        Self {
            config,
            min_pulse_ticks,
            stage: ArmStage::Idle,
        }
    }

    pub fn stage(&self) -> ArmStage {
        self.stage
    }

    pub fn is_armed(&self) -> bool {
        self.stage == ArmStage::Steady
    }

    pub(crate) fn reset(&mut self) {
        self.stage = ArmStage::Idle;
    }

    /// Run the whole sequence, blocking on `delay` for each hold.
    ///
    /// A failed attempt leaves the motors unarmed. Running again restarts
    /// from [`ArmStage::Idle`].
    pub fn run<H, D>(
        &mut self,
        peripheral: &mut H,
        motors: &mut [MotorHandler<H>],
        delay: &mut D,
    ) -> Result<()>
    where
        H: PwmPeripheral,
        D: DelayMs<u32>,
    {
        if self.is_armed() {
            warn!("ESC ARM sequence already finished");
            return Ok(());
        }

        info!("Running ESC ARM sequence...");
        self.stage = ArmStage::Idle;

        self.enter(ArmStage::Triggering, self.config.trigger_ticks, peripheral, motors)?;
        delay.delay_ms(self.config.trigger_hold.0);

        self.enter(ArmStage::Safing, self.min_pulse_ticks, peripheral, motors)?;
        delay.delay_ms(self.config.safety_hold.0);

        self.enter(ArmStage::Steady, self.config.steady_ticks, peripheral, motors)?;

        info!("ESC ARM sequence finished");
        Ok(())
    }

    fn enter<H: PwmPeripheral>(
        &mut self,
        stage: ArmStage,
        ticks: u32,
        peripheral: &mut H,
        motors: &mut [MotorHandler<H>],
    ) -> Result<()> {
        for motor in motors.iter_mut() {
            motor.set_threshold(peripheral, ticks).map_err(|e| {
                error!(
                    "ESC ARM sequence aborted entering {:?} on engine {}: {}",
                    stage,
                    motor.tag(),
                    e
                );
                e
            })?;
        }

        self.stage = stage;
        Ok(())
    }
}
