//! Value Model - Gauge-Zustand und Display-Aggregat
//!
//! Ein [`Gauge`] unterscheidet strikt zwischen dem angeforderten Zielwert
//! (`value`) und dem aktuell gezeichneten Wert (`display`). Geschrieben wird
//! der Zielwert ausschließlich über `set_target`; geklemmt wird erst beim
//! Animieren bzw. Zeichnen.
//!
//! [`DisplayState`] besitzt alle vier Gauges und die prozessweite
//! [`AnimationPolicy`]. Es gibt genau eine Instanz, die vom Display-Task
//! gehalten und per Referenz weitergereicht wird.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;

use crate::update::AnimationSetting;

/// Anzahl der konzentrischen Ringe
pub const ARC_COUNT: usize = 3;

/// Standard-Wertebereich beim Start
pub const DEFAULT_MIN: f32 = 0.0;
pub const DEFAULT_MAX: f32 = 100.0;

/// Standard-Strichstärke eines Rings in Pixel
pub const DEFAULT_ARC_WIDTH: i32 = 8;

/// Standard-Animationsdauer beim Start (ms)
pub const DEFAULT_ANIMATION_MS: u32 = 500;

/// Adressierbare Anzeige-Elemente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GaugeSlot {
    Arc1,
    Arc2,
    Arc3,
    Dial,
}

impl GaugeSlot {
    pub const ALL: [GaugeSlot; 4] = [Self::Arc1, Self::Arc2, Self::Arc3, Self::Dial];

    /// Letztes Topic-Segment, unter dem das Element erreichbar ist
    pub const fn topic_suffix(self) -> &'static str {
        match self {
            Self::Arc1 => "arc1",
            Self::Arc2 => "arc2",
            Self::Arc3 => "arc3",
            Self::Dial => "dial",
        }
    }

    /// Index in `DisplayState::arcs()`, `None` für den Zeiger
    pub const fn arc_index(self) -> Option<usize> {
        match self {
            Self::Arc1 => Some(0),
            Self::Arc2 => Some(1),
            Self::Arc3 => Some(2),
            Self::Dial => None,
        }
    }
}

/// Ein animiertes Anzeige-Element (Ring oder Zeiger)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    pub(crate) value: f32,
    pub(crate) display: f32,
    pub(crate) anim_start: f32,
    pub(crate) anim_start_ms: u64,
    pub(crate) min: f32,
    pub(crate) max: f32,
    pub(crate) width: i32,
    pub(crate) color: Rgb565,
}

impl Gauge {
    /// Erstellt ein Gauge mit Standard-Bereich 0-100 und gegebenem Stil
    pub const fn with_style(width: i32, color: Rgb565) -> Self {
        Self {
            value: DEFAULT_MIN,
            display: DEFAULT_MIN,
            anim_start: DEFAULT_MIN,
            anim_start_ms: 0,
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            width,
            color,
        }
    }

    /// Zuletzt angeforderter Zielwert (ungeklemmt)
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Aktuell gezeichneter Wert
    pub fn display(&self) -> f32 {
        self.display
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn color(&self) -> Rgb565 {
        self.color
    }

    /// Wert und Zeitpunkt, an denen die laufende Animation begonnen hat
    pub fn animation_anchor(&self) -> (f32, u64) {
        (self.anim_start, self.anim_start_ms)
    }

    /// Spannweite für die Normalisierung; `max <= min` wird als
    /// Einheitsbereich behandelt
    pub fn range(&self) -> f32 {
        let range = self.max - self.min;
        if range > 0.0 { range } else { 1.0 }
    }

    /// Grenzen für `display`: `(min, max)`, bei `max <= min` fest auf `min`
    pub fn bounds(&self) -> (f32, f32) {
        if self.max > self.min {
            (self.min, self.max)
        } else {
            (self.min, self.min)
        }
    }

    /// Klemmt einen Wert in die Grenzen (NaN → min)
    pub fn clamp_to_bounds(&self, value: f32) -> f32 {
        let (lo, hi) = self.bounds();
        if value.is_nan() {
            lo
        } else {
            value.clamp(lo, hi)
        }
    }

    /// Normalisierter Anzeigewert in [0, 1]
    pub fn normalized(&self) -> f32 {
        ((self.display - self.min) / self.range()).clamp(0.0, 1.0)
    }

    /// Setzt einen neuen Zielwert und verankert die Animation am
    /// aktuell sichtbaren Wert.
    pub fn set_target(&mut self, value: f32, now_ms: u64) {
        self.anim_start = self.display;
        self.anim_start_ms = now_ms;
        self.value = value;
    }

    /// Springt ohne Animation auf den (geklemmten) Zielwert
    pub fn snap_to_target(&mut self) {
        self.display = self.clamp_to_bounds(self.value);
        self.anim_start = self.display;
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self::with_style(DEFAULT_ARC_WIDTH, Rgb565::WHITE)
    }
}

/// Prozessweite Animations-Einstellung
///
/// `duration_ms == 0` ist gleichbedeutend mit deaktiviert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationPolicy {
    pub enabled: bool,
    pub duration_ms: u32,
}

impl AnimationPolicy {
    pub const fn new(enabled: bool, duration_ms: u32) -> Self {
        Self {
            enabled,
            duration_ms,
        }
    }

    /// true wenn tatsächlich interpoliert wird
    pub fn is_active(&self) -> bool {
        self.enabled && self.duration_ms > 0
    }

    /// Übernimmt das `animation`-Feld einer Update-Nachricht
    pub fn apply(&mut self, setting: AnimationSetting) {
        match setting {
            AnimationSetting::Toggle(enabled) => self.enabled = enabled,
            AnimationSetting::Duration(ms) => {
                self.duration_ms = ms;
                self.enabled = ms > 0;
            }
        }
    }
}

impl Default for AnimationPolicy {
    fn default() -> Self {
        Self::new(true, DEFAULT_ANIMATION_MS)
    }
}

/// Gesamter Anzeige-Zustand: drei Ringe, ein Zeiger, eine Animations-Policy
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    arcs: [Gauge; ARC_COUNT],
    dial: Gauge,
    animation: AnimationPolicy,
}

impl DisplayState {
    pub fn new() -> Self {
        Self {
            arcs: [Gauge::default(); ARC_COUNT],
            // Zeiger rot wie auf klassischen Instrumenten, Strichstärke ungenutzt
            dial: Gauge::with_style(0, Rgb565::RED),
            animation: AnimationPolicy::default(),
        }
    }

    pub fn gauge(&self, slot: GaugeSlot) -> &Gauge {
        match slot.arc_index() {
            Some(idx) => &self.arcs[idx],
            None => &self.dial,
        }
    }

    pub(crate) fn gauge_mut(&mut self, slot: GaugeSlot) -> &mut Gauge {
        match slot.arc_index() {
            Some(idx) => &mut self.arcs[idx],
            None => &mut self.dial,
        }
    }

    pub fn arcs(&self) -> &[Gauge; ARC_COUNT] {
        &self.arcs
    }

    pub fn dial(&self) -> &Gauge {
        &self.dial
    }

    pub fn animation(&self) -> AnimationPolicy {
        self.animation
    }

    pub(crate) fn animation_mut(&mut self) -> &mut AnimationPolicy {
        &mut self.animation
    }

    /// Alle Gauges in Zeichenreihenfolge (außen nach innen, dann Zeiger)
    pub(crate) fn gauges_mut(&mut self) -> impl Iterator<Item = &mut Gauge> {
        self.arcs.iter_mut().chain(core::iter::once(&mut self.dial))
    }

    /// Einziger Schreibzugriff auf Zielwerte
    ///
    /// Bei inaktiver Animation springt `display` sofort auf den Zielwert,
    /// damit kein Zwischenzustand bis zum nächsten Tick sichtbar ist.
    pub fn set_target(&mut self, slot: GaugeSlot, value: f32, now_ms: u64) {
        let active = self.animation.is_active();
        let gauge = self.gauge_mut(slot);
        gauge.set_target(value, now_ms);
        if !active {
            gauge.snap_to_target();
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = DisplayState::new();
        for gauge in state.arcs() {
            assert_eq!(gauge.min(), 0.0);
            assert_eq!(gauge.max(), 100.0);
            assert_eq!(gauge.width(), DEFAULT_ARC_WIDTH);
            assert_eq!(gauge.color(), Rgb565::WHITE);
        }
        assert_eq!(state.dial().color(), Rgb565::RED);
        assert!(state.animation().is_active());
    }

    #[test]
    fn test_set_target_captures_anchor() {
        let mut gauge = Gauge::default();
        gauge.display = 30.0;
        gauge.set_target(80.0, 1234);
        assert_eq!(gauge.value(), 80.0);
        assert_eq!(gauge.display(), 30.0);
        assert_eq!(gauge.animation_anchor(), (30.0, 1234));
    }

    #[test]
    fn test_set_target_accepts_out_of_range() {
        let mut gauge = Gauge::default();
        gauge.set_target(-500.0, 0);
        assert_eq!(gauge.value(), -500.0);
    }

    #[test]
    fn test_degenerate_bounds_pin_to_min() {
        let mut gauge = Gauge::default();
        gauge.min = 10.0;
        gauge.max = 10.0;
        assert_eq!(gauge.range(), 1.0);
        assert_eq!(gauge.bounds(), (10.0, 10.0));
        assert_eq!(gauge.clamp_to_bounds(50.0), 10.0);
        assert_eq!(gauge.clamp_to_bounds(-50.0), 10.0);

        gauge.max = 5.0;
        assert_eq!(gauge.range(), 1.0);
        assert_eq!(gauge.clamp_to_bounds(7.0), 10.0);
        assert_eq!(gauge.normalized(), 0.0);
    }

    #[test]
    fn test_clamp_nan_to_min() {
        let gauge = Gauge::default();
        assert_eq!(gauge.clamp_to_bounds(f32::NAN), 0.0);
    }

    #[test]
    fn test_policy_duration_implies_enabled() {
        let mut policy = AnimationPolicy::new(false, 0);
        policy.apply(AnimationSetting::Duration(750));
        assert_eq!(policy, AnimationPolicy::new(true, 750));

        policy.apply(AnimationSetting::Duration(0));
        assert!(!policy.enabled);
        assert!(!policy.is_active());
    }

    #[test]
    fn test_policy_toggle_keeps_duration() {
        let mut policy = AnimationPolicy::new(true, 300);
        policy.apply(AnimationSetting::Toggle(false));
        assert_eq!(policy.duration_ms, 300);
        assert!(!policy.is_active());
    }

    #[test]
    fn test_state_set_target_snaps_when_disabled() {
        let mut state = DisplayState::new();
        state.animation_mut().apply(AnimationSetting::Toggle(false));
        state.set_target(GaugeSlot::Arc2, 42.0, 10);
        assert_eq!(state.gauge(GaugeSlot::Arc2).display(), 42.0);
    }

    #[test]
    fn test_state_set_target_waits_when_enabled() {
        let mut state = DisplayState::new();
        state.set_target(GaugeSlot::Dial, 42.0, 10);
        assert_eq!(state.dial().display(), 0.0);
        assert_eq!(state.dial().value(), 42.0);
    }
}
