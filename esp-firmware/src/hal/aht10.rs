// AHT10 Temperatur-/Feuchtesensor über I²C
//
// Nicht-blockierend: jeder read() holt das Ergebnis der zuvor angestoßenen
// Messung ab und startet sofort die nächste. Die ~80 ms Messzeit liegen
// damit zwischen zwei Abtastungen statt im Render-Loop.

use embassy_time::Timer;
use esp_hal::Blocking;
use esp_hal::i2c::master::I2c;

use esp_core::{ClimateSample, ClimateSensor, SensorError, decode_aht10};

/// Feste I²C-Adresse
const AHT10_ADDRESS: u8 = 0x38;

/// Kalibrierung laden
const CMD_INITIALIZE: [u8; 3] = [0xE1, 0x08, 0x00];

/// Messung anstoßen
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

/// Anlaufzeit nach dem Einschalten
const POWER_ON_DELAY_MS: u64 = 40;

pub struct Aht10Sensor<'d> {
    i2c: I2c<'d, Blocking>,
    measurement_pending: bool,
}

impl<'d> Aht10Sensor<'d> {
    pub fn new(i2c: I2c<'d, Blocking>) -> Self {
        Self {
            i2c,
            measurement_pending: false,
        }
    }

    /// Lädt die Kalibrierung und stößt die erste Messung an
    pub async fn init(&mut self) -> Result<(), SensorError> {
        Timer::after_millis(POWER_ON_DELAY_MS).await;
        self.i2c
            .write(AHT10_ADDRESS, &CMD_INITIALIZE)
            .map_err(|_| SensorError::BusError)?;
        Timer::after_millis(10).await;

        self.trigger()?;
        self.measurement_pending = true;
        Ok(())
    }

    fn trigger(&mut self) -> Result<(), SensorError> {
        self.i2c
            .write(AHT10_ADDRESS, &CMD_TRIGGER)
            .map_err(|_| SensorError::BusError)
    }
}

impl ClimateSensor for Aht10Sensor<'_> {
    fn read(&mut self) -> Result<ClimateSample, SensorError> {
        if !self.measurement_pending {
            self.trigger()?;
            self.measurement_pending = true;
            return Err(SensorError::Busy);
        }

        let mut raw = [0u8; 6];
        self.i2c
            .read(AHT10_ADDRESS, &mut raw)
            .map_err(|_| SensorError::BusError)?;

        let result = decode_aht10(&raw);
        if matches!(result, Err(SensorError::Busy)) {
            return result;
        }

        // Nächste Messung; schlägt das fehl, holt es der nächste read() nach
        self.measurement_pending = self.trigger().is_ok();
        result
    }
}
