//! Frame Orchestrator - ein kompletter Render-Tick
//!
//! Pro Tick: Zeit einmal abtasten, Animation fortschreiben, Geometrie
//! projizieren, Temperatur-Label anhängen und den fertigen Frame in einem
//! Schritt an den Presenter übergeben (clear → draw → present).

use core::f32::consts::TAU;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor};
use micromath::F32Ext;

use crate::animation::tick;
use crate::gauge::DisplayState;
use crate::geometry::{LabelText, Primitive, PrimitiveList, project};
use crate::traits::{DisplayError, FramePresenter};

/// Position des Temperatur-Labels (unterhalb des Zeigers)
pub const TEMPERATURE_LABEL_POS: Point = Point::new(120, 200);
pub const TEMPERATURE_LABEL_COLOR: Rgb565 = Rgb565::WHITE;

/// Platzhalter bis zum ersten Sensorwert
pub const NO_TEMPERATURE: &str = "--.-C";

// Hintergrundbeleuchtung: langsamer Sinus um 78 % (≈ 200/255)
pub const BACKLIGHT_BASE_PCT: f32 = 78.0;
pub const BACKLIGHT_AMPLITUDE_PCT: f32 = 12.0;
pub const BACKLIGHT_PERIOD_MS: u64 = 8_000;

/// Ein fertig zusammengesetzter Frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub primitives: PrimitiveList,
    /// Helligkeit der Hintergrundbeleuchtung in Prozent (0-100)
    pub backlight_pct: u8,
}

/// Helligkeit zum Zeitpunkt `now_ms`, unabhängig von der Gauge-Animation
pub fn ambient_brightness(now_ms: u64) -> u8 {
    let phase = (now_ms % BACKLIGHT_PERIOD_MS) as f32 / BACKLIGHT_PERIOD_MS as f32;
    let pct = BACKLIGHT_BASE_PCT + BACKLIGHT_AMPLITUDE_PCT * (phase * TAU).sin();
    pct.round().clamp(0.0, 100.0) as u8
}

/// Text des Temperatur-Labels, z.B. `"23.4C"`
pub fn temperature_label(temperature_c: Option<f32>) -> LabelText {
    let mut text = LabelText::new();
    match temperature_c {
        Some(t) => {
            let _ = core::fmt::write(&mut text, format_args!("{:.1}C", t));
        }
        None => {
            let _ = text.push_str(NO_TEMPERATURE);
        }
    }
    text
}

/// Schritt 1-3: Animation, Projektion, Label
pub fn compose_frame(state: &mut DisplayState, now_ms: u64, temperature_c: Option<f32>) -> Frame {
    tick(state, now_ms);

    let mut primitives = PrimitiveList::new();
    project(state, &mut primitives);
    primitives
        .push(Primitive::Label {
            anchor: TEMPERATURE_LABEL_POS,
            text: temperature_label(temperature_c),
            color: TEMPERATURE_LABEL_COLOR,
        })
        .ok();

    Frame {
        primitives,
        backlight_pct: ambient_brightness(now_ms),
    }
}

/// Kompletter Tick inklusive Übergabe an den Presenter
///
/// # Trait-basierte Abstraktion
/// `P: FramePresenter` ist auf dem ESP32 das GC9A01-Panel, in Tests ein Mock.
pub async fn render_frame<P: FramePresenter>(
    state: &mut DisplayState,
    presenter: &mut P,
    now_ms: u64,
    temperature_c: Option<f32>,
) -> Result<(), DisplayError> {
    let frame = compose_frame(state, now_ms, temperature_c);
    presenter.present(&frame).await
}
