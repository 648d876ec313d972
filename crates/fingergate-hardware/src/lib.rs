//! Device collaborators for the door client.
//!
//! - [`FingerprintSensor`]: the optical scanner.
//! - [`AccessActuator`]: the lock relay and the two-line LCD.
//! - [`IdentityProvider`]: where the hardware id comes from.
//!
//! Real vendor drivers live outside this workspace. What ships here are the
//! traits, the vendor status code taxonomy, a sysfs identity reader, a replay
//! sensor for running the pipeline from a file, a log-only panel, and
//! channel-driven mocks for tests.

pub mod console;
pub mod error;
pub mod identity;
pub mod mock;
pub mod replay;
pub mod sensor_error;
pub mod traits;

pub use console::LogPanel;
pub use error::{HardwareError, Result};
pub use identity::{StaticIdentity, SysfsIdentity};
pub use replay::ReplaySensor;
pub use sensor_error::SensorErrorCode;
pub use traits::{AccessActuator, FingerprintSensor, IdentityProvider, ImageSize};
