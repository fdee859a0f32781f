// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von esp-core
pub use esp_core::{
    ClimateSensor, DisplayError, DisplayState, FramePresenter, InboundUpdate, SensorError,
    StatusMessage,
};

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

use crate::config::{STATUS_QUEUE_DEPTH, UPDATE_QUEUE_DEPTH};

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Diese Type-Aliase vereinfachen die Lesbarkeit der Funktionssignaturen.
// Statt:  Sender<'static, NoopRawMutex, InboundUpdate, 4>
// Nutze:  UpdateSender

/// Channel für eingehende Gauge-Updates (MQTT Task → Display Task)
/// Dient gleichzeitig als Transportpuffer: der MQTT Task kopiert Topic und
/// Payload aus seinem Empfangspuffer, bevor er das nächste Paket liest.
pub type UpdateChannel = Channel<NoopRawMutex, InboundUpdate, UPDATE_QUEUE_DEPTH>;

/// Sender für Gauge-Updates (MQTT Task)
pub type UpdateSender = Sender<'static, NoopRawMutex, InboundUpdate, UPDATE_QUEUE_DEPTH>;

/// Receiver für Gauge-Updates (Display Task)
pub type UpdateReceiver = Receiver<'static, NoopRawMutex, InboundUpdate, UPDATE_QUEUE_DEPTH>;

/// Channel für Status-Meldungen (Display Task → MQTT Task)
pub type StatusChannel = Channel<NoopRawMutex, StatusMessage, STATUS_QUEUE_DEPTH>;

/// Sender für Status-Meldungen (Display Task)
pub type StatusSender = Sender<'static, NoopRawMutex, StatusMessage, STATUS_QUEUE_DEPTH>;

/// Receiver für Status-Meldungen (MQTT Task)
pub type StatusReceiver = Receiver<'static, NoopRawMutex, StatusMessage, STATUS_QUEUE_DEPTH>;
