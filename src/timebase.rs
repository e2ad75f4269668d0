use log::{error, info, warn};

use crate::{hal::PwmPeripheral, Error, Result};

/// A free-running counter shared by one or more PWM channels.
///
/// Every channel on the same timebase runs at the same frequency.
pub struct Timebase<H: PwmPeripheral> {
    id: u8,
    period_ticks: u32,
    running: bool,
    handle: H::Timebase,
}

impl<H: PwmPeripheral> Timebase<H> {
    /// Allocate the counter `id` with a period of `period_ticks`.
    pub fn create(peripheral: &mut H, id: u8, period_ticks: u32) -> Result<Self> {
        if period_ticks == 0 || period_ticks > peripheral.max_period_ticks() {
            error!("Invalid period of {} ticks for timer {}", period_ticks, id);
            return Err(Error::InvalidArgument);
        }

        let handle = peripheral
            .create_timebase(id, period_ticks)
            .map_err(|e| {
                error!("Failed to initialize timer {}: {}", id, e);
                e
            })?;

        Ok(Self {
            id,
            period_ticks,
            running: false,
            handle,
        })
    }

    /// Start the counter in continuous mode.
    pub fn start(&mut self, peripheral: &mut H) -> Result<()> {
        if self.running {
            warn!("Timer {} is already running", self.id);
            return Ok(());
        }

        peripheral.start_timebase(&mut self.handle).map_err(|e| {
            error!("Failed to start timer {}: {}", self.id, e);
            e
        })?;
        self.running = true;

        info!("Timer {} running with a period of {} ticks", self.id, self.period_ticks);
        Ok(())
    }

    /// Stop the counter and hand it back to the peripheral, whether or not
    /// it was ever started.
    pub fn stop(mut self, peripheral: &mut H) -> Result<()> {
        peripheral.stop_timebase(&mut self.handle)
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn period_ticks(&self) -> u32 {
        self.period_ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn handle(&self) -> &H::Timebase {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{mock, Event, MockPwm};

    #[test]
    fn starts_once() {
        let (mut pwm, _) = mock();
        let mut timebase = Timebase::<MockPwm>::create(&mut pwm, 1, 20_000).unwrap();
        assert!(!timebase.is_running());

        timebase.start(&mut pwm).unwrap();
        timebase.start(&mut pwm).unwrap();
        assert!(timebase.is_running());

        timebase.stop(&mut pwm).unwrap();

        assert_eq!(
            pwm.events(),
            [
                Event::CreateTimebase {
                    id: 1,
                    period_ticks: 20_000
                },
                Event::StartTimebase(1),
                Event::StopTimebase(1),
            ]
        );
    }

    #[test]
    fn rejects_invalid_period() {
        let (mut pwm, _) = mock();
        pwm.max_period_ticks = 10_000;

        assert_eq!(
            Timebase::<MockPwm>::create(&mut pwm, 0, 0).err(),
            Some(Error::InvalidArgument)
        );
        assert_eq!(
            Timebase::<MockPwm>::create(&mut pwm, 0, 20_000).err(),
            Some(Error::InvalidArgument)
        );
        assert!(pwm.events().is_empty());
    }

    #[test]
    fn start_fault_propagates() {
        let (mut pwm, _) = mock();
        pwm.reject_start = Some(0);

        let mut timebase = Timebase::<MockPwm>::create(&mut pwm, 0, 20_000).unwrap();
        assert_eq!(timebase.start(&mut pwm), Err(Error::HardwareFault));
        assert!(!timebase.is_running());
    }

    #[test]
    fn stop_releases_unstarted_timebase() {
        let (mut pwm, _) = mock();
        let timebase = Timebase::<MockPwm>::create(&mut pwm, 2, 20_000).unwrap();

        timebase.stop(&mut pwm).unwrap();
        assert_eq!(pwm.events().last(), Some(&Event::StopTimebase(2)));
    }
}
