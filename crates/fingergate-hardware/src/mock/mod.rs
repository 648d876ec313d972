//! Mock devices for tests and development without hardware.

pub mod panel;
pub mod sensor;

pub use panel::{MockPanel, MockPanelHandle, PanelEvent};
pub use sensor::{MockSensor, MockSensorHandle, SensorEvent};
