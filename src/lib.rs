//! This is a platform-agnostic Rust driver for the Analog Devices ADT7420 ±0.25 °C accurate,
//! 16-bit digital I²C temperature sensor using the [`embedded-hal`] or [`embedded-hal-async`]
//! traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async
//!
//! This driver allows you to:
//! - Check the chip identification and apply a complete configuration in one call.
//! - Read the temperature in 13-bit or 16-bit resolution.
//! - Read and write the T_CRIT, T_HIGH, T_LOW and T_HYST setpoints in whole degrees.
//! - Power the device down and back up, or take single one-shot measurements.
//! - Read the status register and the configuration register.
//! - Trigger a software reset.
//! - Evaluate the INT and CT alert pins against their configured polarity.
//! - blocking API support.
//! - async API support.
//!
//! Each bus access is one blocking (or awaited) I²C transaction. An optional [`BusyFlag`] lets
//! the driver refuse a transaction while another master holds the bus; there are no retries
//! and no timeouts beyond those of the HAL implementation in use.
//!
//! ## Features
//!
//! - `async`: Enables async API.
//! - `blocking`: Enables blocking API.
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! ## Register encoding
//!
//! Setpoints are written as ADC codes whose scale depends on the resolution bit of the
//! configuration register, so every setter reads the current configuration first. Reads need
//! no configuration: the code itself tells 13-bit and 16-bit layouts apart. See [`codec`].
//!
//! Datasheet:
//!   [ADT7420](https://www.analog.com/media/en/technical-documentation/data-sheets/ADT7420.pdf)
//!
//! ## Blocking Example:
//!
//! ```ignore
//! use adt7420::{Adt7420, Config, I2cAddr, Resolution, Settings};
//!
//! // Platform-specific
//! let i2c = /* embedded_hal::i2c::I2c instance */;
//!
//! let mut adt7420 = Adt7420::new(i2c, I2cAddr::Addr11);
//! adt7420.init(&Settings {
//!     config: Config::default().with_resolution(Resolution::Bits16),
//!     crit_temperature_c: 30,
//!     high_temperature_c: 27,
//!     low_temperature_c: 18,
//!     hysteresis_c: 2,
//! }).unwrap();
//!
//! loop {
//!     println!("{:0.2} °C", adt7420.get_temperature().unwrap());
//! }
//! ```
//!
//! ## Async Example:
//!
//! ```ignore
//! use adt7420::{Adt7420Async, I2cAddr};
//!
//! // Platform-specific
//! let i2c = /* embedded_hal_async::i2c::I2c instance */;
//! let mut delay = /* embedded_hal_async::delay::DelayNs instance */;
//!
//! let mut adt7420 = Adt7420Async::new(i2c, I2cAddr::Addr00);
//! adt7420.power_down().await.unwrap();
//! let celsius = adt7420.read_one_shot(&mut delay).await.unwrap();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![no_std]

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("At least one of \"async\" and \"blocking\" features must be enabled");

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[cfg(test)]
#[macro_use]
extern crate std;

mod fmt;

pub mod alert;
mod bus;
pub mod codec;
mod device_impl;
mod hw_def;
mod types;
pub mod validate;

pub use crate::{
    alert::AlertPins,
    bus::{BusyFlag, NoBusyFlag},
    hw_def::*,
    types::*,
    validate::InvalidSetting,
};

use core::fmt as core_fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// ADT7420 device driver, blocking API
#[cfg(feature = "blocking")]
#[derive(Debug)]
pub struct Adt7420<I2C, B = NoBusyFlag> {
    pub(crate) i2c: I2C,
    pub(crate) busy: B,
    pub(crate) i2c_addr: I2cAddr,
}

/// ADT7420 device driver, async API
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct Adt7420Async<I2C, B = NoBusyFlag> {
    pub(crate) i2c: I2C,
    pub(crate) busy: B,
    pub(crate) i2c_addr: I2cAddr,
}

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Eq, PartialEq)]
pub enum Error<E> {
    /// I²C communication error
    I2c(E),
    /// The bus was busy when the transaction was about to start
    BusBusy,
    /// The identification register did not hold [`CHIP_ID`]
    InvalidChipId(u8),
    /// The bus address cannot be strapped on an ADT7420
    InvalidAddress,
    /// A setpoint is outside its accepted range; nothing was sent to the device
    InvalidSetting,
}

/// Coarse classification of [`Error`]
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// see [`Error::InvalidAddress`]
    InvalidAddress,
    /// see [`Error::InvalidSetting`]
    InvalidSetting,
    /// bus busy, I²C failure or wrong chip identification
    Bus,
}

impl<E> Error<E> {
    /// Collapse the bus-related causes into [`ErrorKind::Bus`]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::I2c(_) | Error::BusBusy | Error::InvalidChipId(_) => ErrorKind::Bus,
            Error::InvalidAddress => ErrorKind::InvalidAddress,
            Error::InvalidSetting => ErrorKind::InvalidSetting,
        }
    }
}

impl<E> From<InvalidSetting> for Error<E> {
    fn from(_: InvalidSetting) -> Self {
        Error::InvalidSetting
    }
}

impl<E> From<hw_def::InvalidAddress> for Error<E> {
    fn from(_: hw_def::InvalidAddress) -> Self {
        Error::InvalidAddress
    }
}

impl<E: core_fmt::Debug> core_fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core_fmt::Formatter<'_>) -> core_fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C error: {e:?}"),
            Error::BusBusy => write!(f, "bus busy"),
            Error::InvalidChipId(id) => write!(f, "unexpected chip id 0x{id:02X}, expected 0x{CHIP_ID:02X}"),
            Error::InvalidAddress => write!(f, "invalid I2C address"),
            Error::InvalidSetting => write!(f, "setting out of range"),
        }
    }
}
