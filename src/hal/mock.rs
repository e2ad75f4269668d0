//! Recording PWM peripheral and delay for tests.

use std::{cell::RefCell, rc::Rc, vec::Vec};

use embedded_hal::blocking::delay::DelayMs;

use super::PwmPeripheral;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    CreateTimebase { id: u8, period_ticks: u32 },
    StartTimebase(u8),
    StopTimebase(u8),
    CreateChannel { timebase: u8, pin: u8 },
    SetThreshold { pin: u8, ticks: u32 },
    Delay(u32),
}

type Events = Rc<RefCell<Vec<Event>>>;

pub struct MockTimebase {
    id: u8,
}

pub struct MockChannel {
    pin: u8,
}

/// Peripheral that records every call and fails on request.
pub struct MockPwm {
    events: Events,
    pub max_period_ticks: u32,
    /// Timebase id whose allocation fails with `ResourceExhausted`.
    pub exhaust_timebase: Option<u8>,
    /// Timebase id whose start is rejected with `HardwareFault`.
    pub reject_start: Option<u8>,
    /// Pin whose channel allocation fails with `ResourceExhausted`.
    pub exhaust_pin: Option<u8>,
    /// Pin whose channel binding is rejected with `HardwareFault`.
    pub reject_channel: Option<u8>,
    /// Number of threshold writes accepted before every write faults.
    pub fault_after: Option<usize>,
    writes: usize,
}

pub struct MockDelay {
    events: Events,
}

/// A peripheral and a delay sharing one event log.
pub fn mock() -> (MockPwm, MockDelay) {
    let events = Events::default();
    let pwm = MockPwm {
        events: events.clone(),
        max_period_ticks: u32::from(u16::MAX),
        exhaust_timebase: None,
        reject_start: None,
        exhaust_pin: None,
        reject_channel: None,
        fault_after: None,
        writes: 0,
    };
    (pwm, MockDelay { events })
}

impl MockPwm {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn thresholds(&self) -> Vec<(u8, u32)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                Event::SetThreshold { pin, ticks } => Some((pin, ticks)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl PwmPeripheral for MockPwm {
    type Timebase = MockTimebase;
    type Channel = MockChannel;
    type Pin = u8;

    fn max_period_ticks(&self) -> u32 {
        self.max_period_ticks
    }

    fn create_timebase(&mut self, id: u8, period_ticks: u32) -> Result<MockTimebase> {
        if self.exhaust_timebase == Some(id) {
            return Err(Error::ResourceExhausted);
        }
        self.record(Event::CreateTimebase { id, period_ticks });
        Ok(MockTimebase { id })
    }

    fn start_timebase(&mut self, timebase: &mut MockTimebase) -> Result<()> {
        if self.reject_start == Some(timebase.id) {
            return Err(Error::HardwareFault);
        }
        self.record(Event::StartTimebase(timebase.id));
        Ok(())
    }

    fn stop_timebase(&mut self, timebase: &mut MockTimebase) -> Result<()> {
        self.record(Event::StopTimebase(timebase.id));
        Ok(())
    }

    fn create_channel(&mut self, timebase: &MockTimebase, pin: u8) -> Result<MockChannel> {
        if self.exhaust_pin == Some(pin) {
            return Err(Error::ResourceExhausted);
        }
        if self.reject_channel == Some(pin) {
            return Err(Error::HardwareFault);
        }
        self.record(Event::CreateChannel {
            timebase: timebase.id,
            pin,
        });
        Ok(MockChannel { pin })
    }

    fn set_threshold(&mut self, channel: &mut MockChannel, ticks: u32) -> Result<()> {
        if self.fault_after.map_or(false, |limit| self.writes >= limit) {
            return Err(Error::HardwareFault);
        }
        self.writes += 1;
        self.record(Event::SetThreshold {
            pin: channel.pin,
            ticks,
        });
        Ok(())
    }
}

impl DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.events.borrow_mut().push(Event::Delay(ms));
    }
}
