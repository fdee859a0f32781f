//! AHT10 Messwert-Dekodierung
//!
//! Der Sensor liefert 6 Bytes: Status, 20 Bit Feuchte, 20 Bit Temperatur.
//! Die I²C-Transfers selbst liegen in der Firmware.

use crate::traits::{ClimateSample, SensorError};

/// Status-Bit: Messung läuft noch
pub const AHT10_STATUS_BUSY: u8 = 0x80;

/// Status-Bit: Kalibrierung geladen
pub const AHT10_STATUS_CALIBRATED: u8 = 0x08;

const FULL_SCALE: f32 = (1u32 << 20) as f32;

/// Dekodiert einen 6-Byte-Messwert des AHT10
pub fn decode_aht10(raw: &[u8; 6]) -> Result<ClimateSample, SensorError> {
    let status = raw[0];
    if status & AHT10_STATUS_BUSY != 0 {
        return Err(SensorError::Busy);
    }
    if status & AHT10_STATUS_CALIBRATED == 0 {
        return Err(SensorError::NotCalibrated);
    }

    let humidity_raw =
        (u32::from(raw[1]) << 12) | (u32::from(raw[2]) << 4) | (u32::from(raw[3]) >> 4);
    let temperature_raw =
        ((u32::from(raw[3]) & 0x0F) << 16) | (u32::from(raw[4]) << 8) | u32::from(raw[5]);

    Ok(ClimateSample {
        temperature_c: temperature_raw as f32 * 200.0 / FULL_SCALE - 50.0,
        humidity_pct: humidity_raw as f32 * 100.0 / FULL_SCALE,
    })
}
