//! Conversion of raw measurement frames into calibrated values.
//!
//! Every function here is pure.  A corrupted frame still decodes: the checksum result is reported
//! through the validity flags of [`Measurement`], never as an error.

use crate::types::{Measurement, RawFrame};

use crc::{Crc, CRC_8_NRSC_5};

// poly 0x31, init 0xFF, no reflection, no final xor
const CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

/// CRC-8 as computed by the sensor over each 16-bit word
pub fn crc8(bytes: &[u8]) -> u8 {
    CRC.checksum(bytes)
}

/// Convert a raw temperature word to degrees centigrade
pub fn raw_temp_to_centigrade(raw: u16) -> f32 {
    -45.0 + 175.0 * (raw as f32) / 65536.0
}

/// Convert a raw humidity word to percent relative humidity.
///
/// This is the plain linear mapping onto [-49, 266); values outside [0, 100] are returned as is.
pub fn raw_rel_humid_to_percent(raw: u16) -> f32 {
    -49.0 + 315.0 * (raw as f32) / 65536.0
}

/// Decode a frame into a [`Measurement`], checking each word against its checksum independently
pub fn decode(frame: &RawFrame) -> Measurement {
    Measurement {
        humidity: raw_rel_humid_to_percent(frame.raw_humidity()),
        temperature: raw_temp_to_centigrade(frame.raw_temperature()),
        humidity_valid: crc8(&frame.humidity_bytes()) == frame.humidity_crc(),
        temperature_valid: crc8(&frame.temperature_bytes()) == frame.temperature_crc(),
    }
}
