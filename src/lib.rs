//! # embedded-powertrain
//! A `#![no_std]` driver for a bank of RC electronic speed controllers (ESCs)
//! on hardware PWM.
//!
//! [`PowerTrain`] groups the motors of a vehicle and is the only entry point:
//! [`initialize`](PowerTrain::initialize) brings up the PWM timebases and
//! channels, [`arm`](PowerTrain::arm) runs the ESC arm sequence and
//! [`set_throttle`](PowerTrain::set_throttle) commands a motor in percent.
//!
//! [`hal`] contains the PWM peripheral abstraction the power train drives
//! (see [`PinBank`](hal::PinBank) for an implementation on top of
//! `embedded-hal` PWM pins).
//!
//! The layers below the power train are public for inspection:
//! [`MotorHandler`] binds a [`PwmChannel`] to a motor, and channels share a
//! [`Timebase`]. [`mapping`] converts throttle percentages into pulse widths.

#![cfg_attr(not(test), no_std)]

pub mod arm;
pub use arm::{ArmSequence, ArmStage};

pub mod channel;
pub use channel::PwmChannel;

pub mod config;
pub use config::{ArmConfig, Calibration, Config};

mod error;
pub use error::{Error, Result};

pub mod hal;

pub mod mapping;

pub mod motor;
pub use motor::{MotorHandler, QuadMotor};

pub mod power_train;
pub use power_train::PowerTrain;

pub mod timebase;
pub use timebase::Timebase;
