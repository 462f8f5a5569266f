//! This is a platform-agnostic Rust driver for the Sensirion SHT3x (SHT30, SHT31, SHT35) humidity
//! and temperature sensors using the [`embedded-hal`] I²C traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//!
//! This driver allows you to:
//! - Trigger single-shot measurements with clock stretching at high, medium or low repeatability.
//! - Start periodic sampling at 0.5, 1, 2, 4 or 10 measurements per second, or in accelerated
//!   response time mode.
//! - Fetch periodic samples in a blocking loop that hands each sample to a closure, or through an
//!   iterator.  Either can be stopped from another thread.
//! - Break periodic sampling and trigger a software reset.
//! - Enable/disable the heater.
//! - Read the status word.
//!
//! Every sample carries a checksum result per field.  A corrupted word is still converted; it is
//! flagged through [`Measurement::humidity_valid`] or [`Measurement::temperature_valid`] and never
//! reported as an error.
//!
//! Humidity is converted with the linear mapping `-49 + 315 * raw / 65536`, which is not clamped
//! to 0 - 100 %RH.
//!
//! ## Features
//!
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! Datasheet:
//!   [SHT3x-DIS](https://sensirion.com/media/documents/213E6A3B/63A5A569/Datasheet_SHT3x_DIS.pdf)
//!
//! ## Single-shot Example:
//!
//! ```no_run
//! use sht3x::{I2cAddr, Repeatability, Sht3x, SingleShot};
//! # fn run<I2C: embedded_hal::i2c::I2c>(i2c: I2C) {
//!
//! // Platform-specific
//! // let i2c = /* embedded_hal::i2c::I2c instance */;
//!
//! let sht3x = Sht3x::new(i2c, I2cAddr::AddrA);
//! let sample = sht3x.single_shot_measure(SingleShot(Repeatability::High)).unwrap();
//! if sample.is_valid() {
//!     println!("{:.1} %RH, {:.1} °C", sample.humidity, sample.temperature);
//! }
//! # }
//! ```
//!
//! ## Periodic Example:
//!
//! ```no_run
//! use sht3x::{I2cAddr, Periodic, Repeatability, SampleRate, Sht3x};
//! use std::{thread, time::Duration};
//! # fn run<I2C: embedded_hal::i2c::I2c + Send>(i2c: I2C) {
//!
//! let sht3x = Sht3x::new(i2c, I2cAddr::AddrA);
//! sht3x.set_periodic_mode(Periodic::Sampling(SampleRate::Periodic500mHz, Repeatability::High)).unwrap();
//!
//! thread::scope(|s| {
//!     s.spawn(|| {
//!         sht3x.run_periodic_acquisition(|sample| println!("{sample}")).unwrap();
//!     });
//!
//!     thread::sleep(Duration::from_secs(3));
//!     // breaks the acquisition loop, then resets the sensor
//!     sht3x.soft_reset().unwrap();
//! });
//! # }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[macro_use]
mod fmt;

mod codec;
mod device_impl;
mod hw_def;
#[cfg(test)]
mod mock;
mod types;

pub use crate::{codec::*, device_impl::PeriodicMeasurements, hw_def::*, types::*};
