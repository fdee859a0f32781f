//! Core Types für die Task-Kommunikation
//!
//! Datenstrukturen ohne Hardware-Dependencies. Beide Nachrichten besitzen
//! ihre Daten (heapless), damit sie über Embassy Channels reisen können.

use heapless::{String, Vec};

use crate::frame::temperature_label;

/// Maximale Topic-Länge in Bytes
pub const TOPIC_CAPACITY: usize = 64;

/// Maximale Payload-Länge eingehender Updates in Bytes
pub const PAYLOAD_CAPACITY: usize = 256;

/// Maximale Länge einer Status-Payload (`"-40.0C"`)
pub const STATUS_CAPACITY: usize = 16;

/// Eingehende MQTT-Nachricht (MQTT Task → Display Task)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub topic: String<TOPIC_CAPACITY>,
    pub payload: Vec<u8, PAYLOAD_CAPACITY>,
}

impl InboundUpdate {
    /// Kopiert Topic und Payload aus dem Empfangspuffer des MQTT-Clients
    ///
    /// Gibt `None` zurück wenn eines davon nicht in die festen Puffer passt;
    /// abgeschnittene Payloads würden sonst falsch dekodiert.
    pub fn copy_from(topic: &str, payload: &[u8]) -> Option<Self> {
        let topic = String::try_from(topic).ok()?;
        let payload = Vec::from_slice(payload).ok()?;
        Some(Self { topic, payload })
    }
}

/// Ausgehender Status (Display Task → MQTT Task)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub payload: String<STATUS_CAPACITY>,
}

impl StatusMessage {
    /// Temperatur mit einer Nachkommastelle und Einheit, z.B. `"23.4C"`
    pub fn temperature(temperature_c: f32) -> Self {
        let mut payload = String::new();
        let _ = payload.push_str(temperature_label(Some(temperature_c)).as_str());
        Self { payload }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for InboundUpdate {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "InboundUpdate {{ topic: {}, payload: {} bytes }}",
            self.topic.as_str(),
            self.payload.len()
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusMessage {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "StatusMessage {{ {} }}", self.payload.as_str())
    }
}
