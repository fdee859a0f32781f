// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks kommunizieren über Embassy Channels (MQTT → Display, Display → MQTT).

pub mod gauge;
pub mod mqtt;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use gauge::{GaugePeripherals, gauge_display_logic, gauge_display_task};
pub use mqtt::mqtt_task;
pub use wifi::{connection_task, dhcp_task, net_task};
