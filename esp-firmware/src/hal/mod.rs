// Hardware Abstraction Layer (HAL) Module
//
// Konkrete Implementierungen der esp-core Traits für die Zielhardware.
// Die Logik selbst kennt nur `FramePresenter` und `ClimateSensor`.

pub mod aht10;
pub mod gc9a01;

pub use aht10::Aht10Sensor;
pub use gc9a01::{Backlight, Framebuffer, Gc9a01Display};
