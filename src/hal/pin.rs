use embedded_hal::PwmPin;

use super::PwmPeripheral;
use crate::{Error, Result};

/// A [`PwmPeripheral`] built from [`PwmPin`] outputs whose timer the HAL has
/// already configured to the PWM frequency.
///
/// Timebase ids index `T` counter slots and channel pins index the `N` pins.
/// Ticks are converted to duty as `ticks * max_duty / period_ticks`, so the
/// period must match the frequency the HAL timer runs at.
/// Stopping a timebase releases it together with every pin bound to it.
pub struct PinBank<P, const N: usize, const T: usize> {
    pins: [P; N],
    bound: [Option<u8>; N],
    counters: [Counter; T],
}

#[derive(Clone, Copy, Default)]
struct Counter {
    allocated: bool,
    running: bool,
}

/// Timebase handle of a [`PinBank`].
#[derive(Debug)]
pub struct PinTimebase {
    id: u8,
    period_ticks: u32,
}

/// Channel handle of a [`PinBank`].
#[derive(Debug)]
pub struct PinChannel {
    pin: usize,
    timebase: u8,
    period_ticks: u32,
}

impl<P, const N: usize, const T: usize> PinBank<P, N, T>
where
    P: PwmPin<Duty = u16>,
{
    pub fn new(pins: [P; N]) -> Self {
        Self {
            pins,
            bound: [None; N],
            counters: [Counter::default(); T],
        }
    }

    pub fn pin(&self, index: usize) -> Option<&P> {
        self.pins.get(index)
    }

    /// Release the bank, returning its pins.
    pub fn free(self) -> [P; N] {
        self.pins
    }

    fn counter(&mut self, id: u8) -> Result<&mut Counter> {
        match self.counters.get_mut(usize::from(id)) {
            Some(counter) if counter.allocated => Ok(counter),
            _ => Err(Error::HardwareFault),
        }
    }
}

impl<P, const N: usize, const T: usize> PwmPeripheral for PinBank<P, N, T>
where
    P: PwmPin<Duty = u16>,
{
    type Timebase = PinTimebase;
    type Channel = PinChannel;
    type Pin = usize;

    fn max_period_ticks(&self) -> u32 {
        u32::from(u16::MAX)
    }

    fn create_timebase(&mut self, id: u8, period_ticks: u32) -> Result<PinTimebase> {
        if period_ticks == 0 || period_ticks > self.max_period_ticks() {
            return Err(Error::InvalidArgument);
        }

        let counter = self
            .counters
            .get_mut(usize::from(id))
            .ok_or(Error::ResourceExhausted)?;
        if counter.allocated {
            return Err(Error::ResourceExhausted);
        }
        counter.allocated = true;

        Ok(PinTimebase { id, period_ticks })
    }

    fn start_timebase(&mut self, timebase: &mut PinTimebase) -> Result<()> {
        self.counter(timebase.id)?.running = true;

        for (pin, bound) in self.pins.iter_mut().zip(&self.bound) {
            if *bound == Some(timebase.id) {
                pin.enable();
            }
        }
        Ok(())
    }

    fn stop_timebase(&mut self, timebase: &mut PinTimebase) -> Result<()> {
        *self.counter(timebase.id)? = Counter::default();

        for (pin, bound) in self.pins.iter_mut().zip(self.bound.iter_mut()) {
            if *bound == Some(timebase.id) {
                pin.disable();
                *bound = None;
            }
        }
        Ok(())
    }

    fn create_channel(&mut self, timebase: &PinTimebase, pin: usize) -> Result<PinChannel> {
        let running = self.counter(timebase.id)?.running;

        let bound = self.bound.get_mut(pin).ok_or(Error::ResourceExhausted)?;
        if bound.is_some() {
            return Err(Error::ResourceExhausted);
        }
        *bound = Some(timebase.id);

        let output = &mut self.pins[pin];
        output.set_duty(0);
        if running {
            output.enable();
        }

        Ok(PinChannel {
            pin,
            timebase: timebase.id,
            period_ticks: timebase.period_ticks,
        })
    }

    fn set_threshold(&mut self, channel: &mut PinChannel, ticks: u32) -> Result<()> {
        if self.bound.get(channel.pin).copied().flatten() != Some(channel.timebase) {
            return Err(Error::HardwareFault);
        }

        let output = &mut self.pins[channel.pin];
        let max_duty = u64::from(output.get_max_duty());
        let duty = (u64::from(ticks) * max_duty / u64::from(channel.period_ticks)).min(max_duty);
        output.set_duty(duty as u16);
        Ok(())
    }
}
