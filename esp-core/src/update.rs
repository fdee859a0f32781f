//! Update Merger - Dekodierung und Anwendung von Teil-Updates
//!
//! Eingehende Payloads durchlaufen eine feste Pipeline:
//!
//! 1. Strukturiert: JSON-Objekt mit optionalen Feldern
//!    (`value`, `min`, `max`, `width`, `color`, `animation`)
//! 2. Skalar: die gesamte Payload als Zahl (`"42.5"`)
//! 3. Ungültig: wie `{"value": 0}`
//!
//! Nur vorhandene Felder werden angewendet. Ein Update mit nur `value` lässt
//! Bereich und Stil unverändert.

use serde::Deserialize;

use crate::color::parse_hex_color;
use crate::gauge::{DisplayState, GaugeSlot};

/// Größte erlaubte Strichstärke (= Radius des Displays)
pub const MAX_ARC_WIDTH: i32 = 120;

/// Polymorphes `animation`-Feld
///
/// - `true`/`false` schaltet die Animation global ein/aus
/// - Zahl = Dauer in ms, `0` deaktiviert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationSetting {
    Toggle(bool),
    Duration(u32),
}

impl From<bool> for AnimationSetting {
    fn from(enabled: bool) -> Self {
        Self::Toggle(enabled)
    }
}

impl From<f32> for AnimationSetting {
    fn from(ms: f32) -> Self {
        // `as` sättigt: negative Werte und NaN → 0
        Self::Duration(ms as u32)
    }
}

/// Dünn besetztes Teil-Update für ein Gauge
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaugeUpdate<'a> {
    pub value: Option<f32>,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub width: Option<i32>,
    pub color: Option<&'a str>,
    pub animation: Option<AnimationSetting>,
}

impl GaugeUpdate<'_> {
    /// Update, das nur den Zielwert setzt
    pub fn value_only(value: f32) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }
}

/// Woher das Update stammt (für Logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadKind {
    Structured,
    Scalar,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedUpdate<'a> {
    pub update: GaugeUpdate<'a>,
    pub kind: PayloadKind,
}

/// Fehler der einzelnen Pipeline-Stufen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Kein gültiges JSON-Objekt der erwarteten Form
    Malformed,
    /// Keine Zahl am Anfang der Payload
    NotNumeric,
}

// Wire-Format: `animation` ist generisch, damit dieselbe Struktur einmal mit
// bool und einmal mit Zahl dekodiert werden kann (serde-json-core kann kein
// deserialize_any).
#[derive(Deserialize)]
struct WireUpdate<'a, A> {
    #[serde(default)]
    value: Option<f32>,
    #[serde(default)]
    min: Option<f32>,
    #[serde(default)]
    max: Option<f32>,
    #[serde(default)]
    width: Option<i32>,
    #[serde(default, borrow)]
    color: Option<&'a str>,
    #[serde(default)]
    animation: Option<A>,
}

impl<'a, A: Into<AnimationSetting>> From<WireUpdate<'a, A>> for GaugeUpdate<'a> {
    fn from(wire: WireUpdate<'a, A>) -> Self {
        Self {
            value: wire.value,
            min: wire.min,
            max: wire.max,
            width: wire.width,
            color: wire.color,
            animation: wire.animation.map(Into::into),
        }
    }
}

fn decode_with<'a, A>(payload: &'a [u8]) -> Result<GaugeUpdate<'a>, DecodeError>
where
    A: Deserialize<'a> + Into<AnimationSetting> + Default,
{
    serde_json_core::from_slice::<WireUpdate<'a, A>>(payload)
        .map(|(wire, _)| wire.into())
        .map_err(|_| DecodeError::Malformed)
}

/// Stufe 1: strukturierte JSON-Nachricht
pub fn decode_structured(payload: &[u8]) -> Result<GaugeUpdate<'_>, DecodeError> {
    decode_with::<bool>(payload).or_else(|_| decode_with::<f32>(payload))
}

/// Stufe 2: nackte Zahl mit `atof`-Semantik
///
/// Führende Leerzeichen werden übersprungen, der längste numerische Präfix
/// wird geparst, der Rest ignoriert (`"12.5abc"` → 12.5). Ein Überlauf
/// sättigt auf `f32::MAX`/`f32::MIN` und wird später auf `max`/`min` geklemmt.
pub fn parse_scalar(payload: &[u8]) -> Result<f32, DecodeError> {
    let text = core::str::from_utf8(payload).map_err(|_| DecodeError::NotNumeric)?;
    let text = text.trim_start();
    let len = numeric_prefix_len(text.as_bytes());
    if len == 0 {
        return Err(DecodeError::NotNumeric);
    }
    match text[..len].parse::<f32>() {
        Ok(value) if !value.is_nan() => Ok(value.clamp(f32::MIN, f32::MAX)),
        _ => Err(DecodeError::NotNumeric),
    }
}

/// Komplette Pipeline: strukturiert → skalar → 0
pub fn decode_update(payload: &[u8]) -> DecodedUpdate<'_> {
    if let Ok(update) = decode_structured(payload) {
        return DecodedUpdate {
            update,
            kind: PayloadKind::Structured,
        };
    }
    match parse_scalar(payload) {
        Ok(value) => DecodedUpdate {
            update: GaugeUpdate::value_only(value),
            kind: PayloadKind::Scalar,
        },
        Err(_) => DecodedUpdate {
            update: GaugeUpdate::value_only(0.0),
            kind: PayloadKind::Invalid,
        },
    }
}

/// Wendet ein Teil-Update auf ein Gauge an
///
/// Reihenfolge: `animation` → `min`/`max` → `width`/`color` → `value`.
/// So animiert `{"value":100,"animation":1000}` bereits mit der neuen Dauer.
///
/// `animation` wirkt prozessweit, egal über welchen Kanal es kommt.
pub fn apply_update(state: &mut DisplayState, slot: GaugeSlot, update: &GaugeUpdate<'_>, now_ms: u64) {
    if let Some(setting) = update.animation {
        state.animation_mut().apply(setting);
    }

    let gauge = state.gauge_mut(slot);

    let mut bounds_changed = false;
    if let Some(min) = update.min.filter(|v| v.is_finite()) {
        gauge.min = min;
        bounds_changed = true;
    }
    if let Some(max) = update.max.filter(|v| v.is_finite()) {
        gauge.max = max;
        bounds_changed = true;
    }
    if bounds_changed {
        gauge.display = gauge.clamp_to_bounds(gauge.display);
    }

    if let Some(width) = update.width {
        gauge.width = width.min(MAX_ARC_WIDTH);
    }
    if let Some(color) = update.color {
        gauge.color = parse_hex_color(color);
    }

    if let Some(value) = update.value {
        state.set_target(slot, value, now_ms);
    }
}

// Länge des längsten Präfix der Form [+-]digits[.digits][(e|E)[+-]digits]
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let mut pos = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = count_digits(&bytes[pos + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp_pos = pos + 1;
        if matches!(bytes.get(exp_pos), Some(b'+' | b'-')) {
            exp_pos += 1;
        }
        let exp_digits = count_digits(&bytes[exp_pos..]);
        if exp_digits > 0 {
            pos = exp_pos + exp_digits;
        }
    }

    pos
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
