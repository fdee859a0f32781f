//! Channel Router - MQTT-Topic → Gauge
//!
//! Topics haben die Form `<prefix>/arc1`, `<prefix>/arc2`, `<prefix>/arc3`,
//! `<prefix>/dial`. Unbekannte Topics werden still ignoriert.

use crate::gauge::{DisplayState, GaugeSlot};
use crate::update::{PayloadKind, apply_update, decode_update};

/// Ergebnis einer gerouteten Nachricht (für Logging im Firmware-Task)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RoutedUpdate {
    pub slot: GaugeSlot,
    pub kind: PayloadKind,
}

/// Ordnet ein Topic einem Gauge zu
///
/// # Beispiele
///
/// ```
/// # use esp_core::{channel_for_topic, GaugeSlot};
/// assert_eq!(channel_for_topic("ha_display/dial", "ha_display"), Some(GaugeSlot::Dial));
/// assert_eq!(channel_for_topic("ha_display/temperature", "ha_display"), None);
/// ```
pub fn channel_for_topic(topic: &str, prefix: &str) -> Option<GaugeSlot> {
    let suffix = topic.strip_prefix(prefix)?.strip_prefix('/')?;
    GaugeSlot::ALL
        .into_iter()
        .find(|slot| slot.topic_suffix() == suffix)
}

/// Dekodiert die Payload und wendet sie auf das adressierte Gauge an
///
/// Gibt `None` zurück, wenn das Topic keinem Gauge gehört.
pub fn route_message(
    state: &mut DisplayState,
    prefix: &str,
    topic: &str,
    payload: &[u8],
    now_ms: u64,
) -> Option<RoutedUpdate> {
    let slot = channel_for_topic(topic, prefix)?;
    let decoded = decode_update(payload);
    apply_update(state, slot, &decoded.update, now_ms);
    Some(RoutedUpdate {
        slot,
        kind: decoded.kind,
    })
}
