use log::error;

use crate::{hal::PwmPeripheral, timebase::Timebase, Error, Result};

/// One comparator and waveform generator pair driving a single output pin.
///
/// The output is high from the start of each period until the counter
/// reaches the threshold. A hardware fault latches: once a write has been
/// rejected the channel refuses every further write.
pub struct PwmChannel<H: PwmPeripheral> {
    handle: H::Channel,
    pin: H::Pin,
    timebase: u8,
    threshold: Option<u32>,
    is_faulted: bool,
}

impl<H: PwmPeripheral> PwmChannel<H> {
    pub fn initialize(peripheral: &mut H, timebase: &Timebase<H>, pin: H::Pin) -> Result<Self> {
        let handle = peripheral
            .create_channel(timebase.handle(), pin)
            .map_err(|e| {
                error!("Could not create a channel on timer {}: {}", timebase.id(), e);
                e
            })?;

        Ok(Self {
            handle,
            pin,
            timebase: timebase.id(),
            threshold: None,
            is_faulted: false,
        })
    }

    /// Write a new threshold, applied at the next period boundary.
    pub fn set_threshold(&mut self, peripheral: &mut H, ticks: u32) -> Result<()> {
        if self.is_faulted {
            return Err(Error::HardwareFault);
        }

        match peripheral.set_threshold(&mut self.handle, ticks) {
            Ok(()) => {
                self.threshold = Some(ticks);
                Ok(())
            }
            Err(e) => {
                error!("Failed to set the comparator value on timer {}: {}", self.timebase, e);
                if e == Error::HardwareFault {
                    self.is_faulted = true;
                }
                Err(e)
            }
        }
    }

    /// The last threshold written, `None` before the first write.
    pub fn threshold(&self) -> Option<u32> {
        self.threshold
    }

    pub fn pin(&self) -> H::Pin {
        self.pin
    }

    pub fn timebase(&self) -> u8 {
        self.timebase
    }

    pub fn is_faulted(&self) -> bool {
        self.is_faulted
    }
}
