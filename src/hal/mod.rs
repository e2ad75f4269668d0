//! Hardware abstraction for the PWM peripheral driving the ESCs.

use crate::Result;

pub mod pin;
pub use pin::PinBank;

#[cfg(test)]
pub(crate) mod mock;

/// A hardware PWM peripheral made of free-running counters (timebases) and
/// comparator/generator pairs (channels).
///
/// Every call is synchronous and returns in bounded time.
pub trait PwmPeripheral {
    /// Handle to an allocated counter.
    type Timebase;

    /// Handle to an allocated comparator and generator bound to one pin.
    type Channel;

    /// Output pin identity.
    type Pin: Copy;

    /// Largest period the counter can hold, in ticks.
    fn max_period_ticks(&self) -> u32;

    /// Allocate the counter `id` with a period of `period_ticks`.
    fn create_timebase(&mut self, id: u8, period_ticks: u32) -> Result<Self::Timebase>;

    /// Enable the counter in continuous free-run mode.
    fn start_timebase(&mut self, timebase: &mut Self::Timebase) -> Result<()>;

    /// Disable the counter.
    fn stop_timebase(&mut self, timebase: &mut Self::Timebase) -> Result<()>;

    /// Allocate a channel on `timebase` driving `pin`.
    ///
    /// The output goes high when the counter wraps and low when it reaches
    /// the channel threshold.
    fn create_channel(&mut self, timebase: &Self::Timebase, pin: Self::Pin)
        -> Result<Self::Channel>;

    /// Write the comparator threshold. Takes effect at the next period boundary.
    fn set_threshold(&mut self, channel: &mut Self::Channel, ticks: u32) -> Result<()>;
}

impl<T: PwmPeripheral> PwmPeripheral for &mut T {
    type Timebase = T::Timebase;
    type Channel = T::Channel;
    type Pin = T::Pin;

    fn max_period_ticks(&self) -> u32 {
        (**self).max_period_ticks()
    }

    fn create_timebase(&mut self, id: u8, period_ticks: u32) -> Result<Self::Timebase> {
        (&mut **self).create_timebase(id, period_ticks)
    }

    fn start_timebase(&mut self, timebase: &mut Self::Timebase) -> Result<()> {
        (&mut **self).start_timebase(timebase)
    }

    fn stop_timebase(&mut self, timebase: &mut Self::Timebase) -> Result<()> {
        (&mut **self).stop_timebase(timebase)
    }

    fn create_channel(
        &mut self,
        timebase: &Self::Timebase,
        pin: Self::Pin,
    ) -> Result<Self::Channel> {
        (&mut **self).create_channel(timebase, pin)
    }

    fn set_threshold(&mut self, channel: &mut Self::Channel, ticks: u32) -> Result<()> {
        (&mut **self).set_threshold(channel, ticks)
    }
}
