//! Hardware Abstraction Traits
//!
//! Diese Traits definieren die Schnittstellen zu Display und Sensor
//! ohne konkrete Implementierung.

use crate::frame::Frame;

/// Fehler-Typ für Display-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    WriteFailed,
}

/// Trait für die Ausgabe eines kompletten Frames
///
/// Ein Aufruf = ein atomarer Bildwechsel (clear → draw → present),
/// damit nie ein halb gezeichneter Frame sichtbar wird.
///
/// # Implementierungen
/// - **Production:** Gc9a01Display (SPI-Panel + LEDC-Backlight)
/// - **Testing:** MockPresenter (in-memory Mock)
///
/// `present` ist async, damit die Bus-Übertragung andere Tasks nicht blockiert.
#[allow(async_fn_in_trait)]
pub trait FramePresenter {
    /// Zeichnet den Frame und setzt die Hintergrundbeleuchtung
    ///
    /// # Fehlerbehandlung
    /// Gibt `DisplayError::WriteFailed` zurück wenn der Bus-Transfer fehlschlägt
    async fn present(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

/// Ein Messwert des Klima-Sensors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Fehler-Typ für Sensor-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Messung läuft noch
    Busy,
    /// Sensor meldet fehlende Kalibrierung
    NotCalibrated,
    /// I²C-Transfer fehlgeschlagen
    BusError,
}

/// Trait für Temperatur-/Feuchtesensoren
///
/// # Implementierungen
/// - **Production:** Aht10Sensor (I²C)
/// - **Testing:** MockSensor
pub trait ClimateSensor {
    /// Liefert einen Messwert
    fn read(&mut self) -> Result<ClimateSample, SensorError>;
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClimateSample {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ClimateSample {{ temperature: {}C, humidity: {}% }}",
            self.temperature_c,
            self.humidity_pct
        )
    }
}
