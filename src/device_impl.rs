use crate::codec::decode;
use crate::hw_def::*;
use crate::types::*;

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

impl<I2C, E> Sht3x<I2C>
where
    I2C: I2c<Error = E>,
    E: embedded_hal::i2c::Error,
{
    /// Create a new SHT3x driver instance
    pub fn new(i2c: I2C, i2c_addr: I2cAddr) -> Self {
        Self {
            bus: Mutex::new(Bus { i2c, mode: None }),
            running: AtomicBool::new(false),
            i2c_addr,
        }
    }

    /// Destroy the driver and return the bus handle
    pub fn destroy(self) -> I2C {
        self.bus.into_inner().unwrap_or_else(PoisonError::into_inner).i2c
    }

    /// Address the driver talks to
    pub fn address(&self) -> I2cAddr {
        self.i2c_addr
    }

    /// Last single-shot or periodic command issued, `None` after construction or soft reset
    pub fn mode(&self) -> Option<Command> {
        self.lock().mode
    }

    /// Periodic acquisition is in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    // A panicking sink never holds the lock, so a poisoned bus is still consistent.
    fn lock(&self) -> MutexGuard<'_, Bus<I2C>> {
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cmd(&self, bus: &mut Bus<I2C>, cmd: Command) -> Result<(), Error<E>> {
        trace!("sht3x::write_cmd(): opcode=0x{:04x}", cmd.opcode());
        bus.i2c.write(self.i2c_addr.as_u8(), &cmd.to_be_bytes()).map_err(Error::I2c)
    }

    fn exchange(&self, bus: &mut Bus<I2C>, cmd: Command) -> Result<RawFrame, Error<E>> {
        trace!("sht3x::exchange(): opcode=0x{:04x}", cmd.opcode());
        let mut frame = RawFrame::default();
        bus.i2c
            .write_read(self.i2c_addr.as_u8(), &cmd.to_be_bytes(), &mut frame.0)
            .map_err(Error::I2c)?;
        Ok(frame)
    }

    /// Trigger a clock-stretched single-shot measurement and return the decoded sample.
    ///
    /// Fails with [`Error::InvalidParameter`] before any bus traffic if `mode` is not a
    /// single-shot command.  Bus errors, including a NACK, are returned without retrying.
    pub fn single_shot_measure(&self, mode: impl Into<Command>) -> Result<Measurement, Error<E>> {
        let mode = mode.into();
        if !mode.is_single_shot() {
            return Err(Error::InvalidParameter);
        }

        let mut bus = self.lock();
        bus.mode = Some(mode);
        let frame = self.exchange(&mut bus, mode)?;
        drop(bus);

        let measurement = decode(&frame);
        if !measurement.is_valid() {
            warn!("sht3x::single_shot_measure(): crc mismatch, humidity_valid={}, temperature_valid={}",
                measurement.humidity_valid, measurement.temperature_valid);
        }
        Ok(measurement)
    }

    /// Stop any periodic sampling, then reset the sensor and forget the current mode.
    ///
    /// The sensor NACKs a soft reset while sampling periodically, hence the break first.  If the
    /// reset write fails after the break succeeded, the sensor is left idle but not reset.
    pub fn soft_reset(&self) -> Result<(), Error<E>> {
        self.break_measurement()?;

        let mut bus = self.lock();
        self.write_cmd(&mut bus, Control::SoftReset.into())?;
        bus.mode = None;
        debug!("sht3x::soft_reset(): mode cleared");
        Ok(())
    }

    /// Turn the heater on or off
    pub fn enable_heater(&self, on: bool) -> Result<(), Error<E>> {
        let cmd = if on { Control::HeaterOn } else { Control::HeaterOff };
        self.write_cmd(&mut self.lock(), cmd.into())
    }

    /// Enable accelerated response time.  Use [`Sht3x::set_periodic_mode`] with
    /// [`Periodic::AcceleratedResponseTime`] to also make it the current mode for fetching.
    pub fn enable_accelerated_response(&self) -> Result<(), Error<E>> {
        self.write_cmd(&mut self.lock(), Periodic::AcceleratedResponseTime.into())
    }

    /// Read the raw status word.  See [`StatusBits`] for decoding it.
    pub fn read_status(&self) -> Result<u16, Error<E>> {
        let mut bus = self.lock();
        self.write_cmd(&mut bus, Control::GetStatus.into())?;
        let mut read_buf = [0u8; 2];
        bus.i2c.read(self.i2c_addr.as_u8(), &mut read_buf).map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(read_buf))
    }

    /// Stop periodic sampling.
    ///
    /// The running flag is cleared before the bus is touched, so a periodic acquisition on another
    /// thread stops after its current fetch even when the break write fails.
    pub fn break_measurement(&self) -> Result<(), Error<E>> {
        self.running.store(false, Ordering::Release);
        self.write_cmd(&mut self.lock(), Control::Break.into())
    }

    /// Start periodic sampling on the sensor.  Nothing is fetched until
    /// [`Sht3x::run_periodic_acquisition`] or [`Sht3x::periodic_measurements`] is called.
    pub fn set_periodic_mode(&self, mode: impl Into<Command>) -> Result<(), Error<E>> {
        let mode = mode.into();
        if !mode.is_periodic() {
            return Err(Error::InvalidParameter);
        }

        let mut bus = self.lock();
        self.write_cmd(&mut bus, mode)?;
        bus.mode = Some(mode);
        debug!("sht3x::set_periodic_mode(): opcode=0x{:04x}", mode.opcode());
        Ok(())
    }

    /// Start fetching periodic samples as an iterator.
    ///
    /// Each item is one sample; NACKs (no fresh sample yet) are polled through without yielding.
    /// Iteration ends once the running flag is cleared by [`Sht3x::break_measurement`] or
    /// [`Sht3x::soft_reset`], or after the first bus error is yielded.  Dropping the iterator also
    /// clears the running flag.
    pub fn periodic_measurements(&self) -> Result<PeriodicMeasurements<'_, I2C>, Error<E>> {
        match self.lock().mode {
            None => return Err(Error::InvalidState(StateError::ModeNotSet)),
            Some(mode) if !mode.is_periodic() => return Err(Error::InvalidState(StateError::WrongModeForFetch)),
            Some(_) => {}
        }
        self.running.store(true, Ordering::Release);
        Ok(PeriodicMeasurements { sensor: self })
    }

    /// Fetch periodic samples and hand each one to `sink` until stopped.
    ///
    /// This blocks.  Run it on its own thread and call [`Sht3x::break_measurement`] from elsewhere
    /// (or from inside `sink`) to stop it.  Returns `Ok(())` when stopped and the error when a
    /// fetch fails with anything but a NACK.
    pub fn run_periodic_acquisition<F>(&self, mut sink: F) -> Result<(), Error<E>>
    where
        F: FnMut(Measurement),
    {
        for measurement in self.periodic_measurements()? {
            sink(measurement?);
        }
        Ok(())
    }
}

/// Iterator over periodic samples, see [`Sht3x::periodic_measurements`]
#[derive(Debug)]
pub struct PeriodicMeasurements<'a, I2C> {
    sensor: &'a Sht3x<I2C>,
}

impl<I2C, E> Iterator for PeriodicMeasurements<'_, I2C>
where
    I2C: I2c<Error = E>,
    E: embedded_hal::i2c::Error,
{
    type Item = Result<Measurement, Error<E>>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.sensor.is_running() {
            let fetched = {
                let mut bus = self.sensor.lock();
                self.sensor.exchange(&mut bus, Control::Fetch.into())
            };
            match fetched {
                // stopped while the fetch was in flight; this sample is stale
                Ok(_) if !self.sensor.is_running() => break,
                Ok(frame) => {
                    let measurement = decode(&frame);
                    if !measurement.is_valid() {
                        warn!("sht3x::periodic: crc mismatch, humidity_valid={}, temperature_valid={}",
                            measurement.humidity_valid, measurement.temperature_valid);
                    }
                    return Some(Ok(measurement));
                }
                Err(Error::I2c(e)) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => {
                    trace!("sht3x::periodic: nack, no fresh sample");
                }
                Err(e) => {
                    self.sensor.running.store(false, Ordering::Release);
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl<I2C> Drop for PeriodicMeasurements<'_, I2C> {
    fn drop(&mut self) {
        self.sensor.running.store(false, Ordering::Release);
    }
}
