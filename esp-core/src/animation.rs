//! Animation Clock - zeitbasierte Interpolation mit Smoothstep
//!
//! Der Fortschritt wird immer aus der absoluten Zeit seit Animationsstart
//! berechnet, nie aus aufsummierten Deltas. Unregelmäßige Tick-Abstände
//! (z.B. nach einem MQTT-Reconnect) verschieben die Animation daher nicht.

use crate::gauge::{AnimationPolicy, DisplayState, Gauge};

/// Smoothstep `t² · (3 − 2t)`, `t` wird vorher auf [0, 1] geklemmt
///
/// # Beispiele
///
/// ```
/// # use esp_core::ease;
/// assert_eq!(ease(0.0), 0.0);
/// assert_eq!(ease(0.5), 0.5);
/// assert_eq!(ease(1.0), 1.0);
/// ```
pub fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fortschritt seit `start_ms` relativ zu `duration_ms` (nicht geklemmt)
pub fn progress(start_ms: u64, now_ms: u64, duration_ms: u32) -> f32 {
    if duration_ms == 0 {
        return 1.0;
    }
    now_ms.saturating_sub(start_ms) as f32 / duration_ms as f32
}

impl Gauge {
    /// Berechnet `display` für den Zeitpunkt `now_ms` neu
    pub(crate) fn advance(&mut self, now_ms: u64, policy: AnimationPolicy) {
        if !policy.is_active() {
            self.display = self.clamp_to_bounds(self.value);
            return;
        }

        let t = progress(self.anim_start_ms, now_ms, policy.duration_ms);
        let raw = if t >= 1.0 {
            self.value
        } else {
            self.anim_start + (self.value - self.anim_start) * ease(t)
        };
        self.display = self.clamp_to_bounds(raw);
    }
}

/// Ein Frame-Tick: aktualisiert `display` aller Gauges
pub fn tick(state: &mut DisplayState, now_ms: u64) {
    let policy = state.animation();
    for gauge in state.gauges_mut() {
        gauge.advance(now_ms, policy);
    }
}
