use crate::hw_def::*;

use core::fmt;
use core::sync::atomic::AtomicBool;
use std::sync::Mutex;

#[cfg(feature="defmt")]
use defmt::Format;

/// SHT3x device driver.
///
/// Every operation takes `&self`, so one session can be shared with the thread that stops a
/// running periodic acquisition.  The bus is locked for one transaction at a time.
#[derive(Debug)]
pub struct Sht3x<I2C> {
    pub(crate) bus: Mutex<Bus<I2C>>,
    pub(crate) running: AtomicBool,
    pub(crate) i2c_addr: I2cAddr,
}

/// Bus handle and the last measurement mode issued through it
#[derive(Debug)]
pub(crate) struct Bus<I2C> {
    pub(crate) i2c: I2C,
    pub(crate) mode: Option<Command>,
}

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// I²C communication error, including a NACK from the sensor
    I2c(E),
    /// The command given is not a member of the set the operation accepts
    InvalidParameter,
    /// The operation needs session state that has not been established
    InvalidState(StateError),
}
impl<E: embedded_hal::i2c::Error> Error<E> {
    /// The sensor did not acknowledge.  During periodic acquisition this means no fresh sample
    /// was ready; elsewhere it is reported like any other bus failure.
    pub fn is_nack(&self) -> bool {
        match self {
            Error::I2c(e) => matches!(e.kind(), embedded_hal::i2c::ErrorKind::NoAcknowledge(_)),
            _ => false,
        }
    }
}
impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C error: {e:?}"),
            Error::InvalidParameter => write!(f, "command not valid for this operation"),
            Error::InvalidState(state) => write!(f, "{state}"),
        }
    }
}
impl<E: fmt::Debug> std::error::Error for Error<E> {}

/// Session state missing for an operation
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// no measurement mode has been set
    ModeNotSet,
    /// the current mode is not a periodic mode, so there is nothing to fetch
    WrongModeForFetch,
}
impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::ModeNotSet => write!(f, "mode not set"),
            StateError::WrongModeForFetch => write!(f, "wrong mode for fetch"),
        }
    }
}

/// Six bytes as returned by a measurement exchange:
/// `[temp_msb, temp_lsb, temp_crc, hum_msb, hum_lsb, hum_crc]`
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RawFrame(pub [u8; 6]);
impl RawFrame {
    /// temperature word as sent by the sensor
    pub fn temperature_bytes(&self) -> [u8; 2] {
        [self.0[0], self.0[1]]
    }
    /// checksum sent with the temperature word
    pub fn temperature_crc(&self) -> u8 {
        self.0[2]
    }
    /// humidity word as sent by the sensor
    pub fn humidity_bytes(&self) -> [u8; 2] {
        [self.0[3], self.0[4]]
    }
    /// checksum sent with the humidity word
    pub fn humidity_crc(&self) -> u8 {
        self.0[5]
    }
    /// unprocessed temperature
    pub fn raw_temperature(&self) -> u16 {
        u16::from_be_bytes(self.temperature_bytes())
    }
    /// unprocessed relative humidity
    pub fn raw_humidity(&self) -> u16 {
        u16::from_be_bytes(self.humidity_bytes())
    }
}
impl From<[u8; 6]> for RawFrame {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

/// Decoded sample.  A field whose checksum failed still carries its converted value; check the
/// matching `*_valid` flag before using it.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// relative humidity in percent
    pub humidity: f32,
    /// degrees centigrade
    pub temperature: f32,
    /// humidity checksum matched
    pub humidity_valid: bool,
    /// temperature checksum matched
    pub temperature_valid: bool,
}
impl Measurement {
    /// Both checksums matched
    pub fn is_valid(&self) -> bool {
        self.humidity_valid && self.temperature_valid
    }
}
impl From<&RawFrame> for Measurement {
    fn from(frame: &RawFrame) -> Self {
        crate::codec::decode(frame)
    }
}
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} %RH", self.humidity)?;
        if !self.humidity_valid {
            write!(f, " (crc mismatch)")?;
        }
        write!(f, ", {:.2} °C", self.temperature)?;
        if !self.temperature_valid {
            write!(f, " (crc mismatch)")?;
        }
        Ok(())
    }
}

/// Status bits from the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusBits {
    raw: u16,
    /// at least one alert is pending
    pub alert_pending: bool,
    /// heater is on
    pub heater_on: bool,
    /// relative humidity tracking alert
    pub rh_tracking_alert: bool,
    /// temperature tracking alert
    pub t_tracking_alert: bool,
    /// reset (power-on, soft reset or reset pin) detected since last clear of status register
    pub reset_detected: bool,
    /// last command was not processed
    pub command_failed: bool,
    /// checksum of the last write transfer failed
    pub write_checksum_failed: bool,
}
impl From<u16> for StatusBits {
    fn from(raw: u16) -> Self {
        let bit = |lsbit: u16| (raw >> lsbit) & 1 != 0;
        Self {
            raw,
            alert_pending: bit(STATUS_FIELD_LSBIT_ALERT_PENDING),
            heater_on: bit(STATUS_FIELD_LSBIT_HEATER_ON),
            rh_tracking_alert: bit(STATUS_FIELD_LSBIT_RH_TRACKING_ALERT),
            t_tracking_alert: bit(STATUS_FIELD_LSBIT_T_TRACKING_ALERT),
            reset_detected: bit(STATUS_FIELD_LSBIT_RESET_DETECTED),
            command_failed: bit(STATUS_FIELD_LSBIT_COMMAND_FAILED),
            write_checksum_failed: bit(STATUS_FIELD_LSBIT_WRITE_CHECKSUM_FAILED),
        }
    }
}
impl StatusBits {
    /// Get the raw status bits
    pub fn raw(&self) -> u16 {
        self.raw
    }
}
impl fmt::Display for StatusBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusBits {{ 0x{:04x}; ", self.raw)?;
        if self.alert_pending {
            write!(f, "alert_pending ")?;
        }
        if self.heater_on {
            write!(f, "heater_on ")?;
        }
        if self.rh_tracking_alert {
            write!(f, "rh_tracking_alert ")?;
        }
        if self.t_tracking_alert {
            write!(f, "t_tracking_alert ")?;
        }
        if self.reset_detected {
            write!(f, "reset_detected ")?;
        }
        if self.command_failed {
            write!(f, "command_failed ")?;
        }
        if self.write_checksum_failed {
            write!(f, "write_checksum_failed ")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

    #[derive(Debug)]
    struct Kind(ErrorKind);
    impl embedded_hal::i2c::Error for Kind {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    #[test]
    fn test_raw_frame_fields() {
        let frame = RawFrame::from([0xBE, 0xEF, 0x92, 0x12, 0x34, 0x37]);
        assert_eq!(frame.raw_temperature(), 0xBEEF);
        assert_eq!(frame.temperature_crc(), 0x92);
        assert_eq!(frame.raw_humidity(), 0x1234);
        assert_eq!(frame.humidity_crc(), 0x37);
    }

    #[test]
    fn test_status_bits() {
        let status = StatusBits::from(0b1010_0000_0001_0010);
        assert!(status.alert_pending);
        assert!(status.heater_on);
        assert!(!status.rh_tracking_alert);
        assert!(!status.t_tracking_alert);
        assert!(status.reset_detected);
        assert!(status.command_failed);
        assert!(!status.write_checksum_failed);
        assert_eq!(status.raw(), 0xA012);

        let idle = StatusBits::from(0);
        assert_eq!(std::format!("{idle}"), "StatusBits { 0x0000; }");
    }

    #[test]
    fn test_nack_detection() {
        let nack: Error<Kind> = Error::I2c(Kind(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
        let bus: Error<Kind> = Error::I2c(Kind(ErrorKind::Bus));
        assert!(nack.is_nack());
        assert!(!bus.is_nack());
        assert!(!Error::<Kind>::InvalidParameter.is_nack());
    }

    #[test]
    fn test_error_display() {
        let err: Error<()> = Error::InvalidState(StateError::ModeNotSet);
        assert_eq!(std::format!("{err}"), "mode not set");
        let err: Error<()> = Error::InvalidState(StateError::WrongModeForFetch);
        assert_eq!(std::format!("{err}"), "wrong mode for fetch");
    }
}
