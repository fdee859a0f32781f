//! ESP Core - Platform-agnostic Gauge Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert die animierte Gauge-State-Machine (drei Ringe + Zeiger),
//! die Dekodierung der MQTT-Payloads, die Geometrie, die Dekodierung der
//! AHT10-Messwerte und die Traits für Display und Sensor.
//!
//! Datenfluss pro Nachricht:
//! `router` → `update` (Decode-Pipeline + Merge) → `gauge` (Value Model)
//!
//! Datenfluss pro Frame:
//! `frame` → `animation::tick` → `geometry::project` → `FramePresenter`

#![no_std]

pub mod animation;
pub mod color;
pub mod frame;
pub mod gauge;
pub mod geometry;
pub mod render;
pub mod router;
pub mod sensor;
pub mod traits;
pub mod types;
pub mod update;

// Re-exports für einfachen Zugriff
pub use animation::{ease, tick};
pub use color::{parse_hex_color, parse_hex_rgb, rgb565_to_rgb, rgb_to_rgb565};
pub use frame::{Frame, ambient_brightness, compose_frame, render_frame};
pub use gauge::{AnimationPolicy, DisplayState, Gauge, GaugeSlot};
pub use geometry::{Primitive, PrimitiveList};
pub use router::{RoutedUpdate, channel_for_topic, route_message};
pub use sensor::decode_aht10;
pub use traits::{ClimateSample, ClimateSensor, DisplayError, FramePresenter, SensorError};
pub use types::{InboundUpdate, StatusMessage};
pub use update::{AnimationSetting, DecodeError, DecodedUpdate, GaugeUpdate, PayloadKind};
pub use update::{apply_update, decode_update};
