//! Device collaborator traits.
//!
//! The access pipeline talks to three external collaborators: the
//! fingerprint scanner, the door panel (lock output plus a two-line text
//! display), and the source of the device's hardware identifier.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT).
//! They are not object-safe; the pipeline takes them as generic parameters.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::sensor_error::SensorErrorCode;
use fingergate_core::HardwareId;

/// Frame geometry reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    /// Buffer size the driver expects for one frame. At least
    /// `width * height`.
    pub byte_count: usize,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            byte_count: width as usize * height as usize,
        }
    }

    pub fn with_byte_count(mut self, byte_count: usize) -> Self {
        self.byte_count = byte_count;
        self
    }
}

/// Fingerprint scanner.
///
/// # Examples
///
/// ```no_run
/// use fingergate_hardware::{FingerprintSensor, Result};
///
/// async fn grab<S: FingerprintSensor>(sensor: &mut S) -> Result<Option<Vec<u8>>> {
///     sensor.open().await?;
///     let size = sensor.image_size().await?;
///     let mut buf = vec![0u8; size.byte_count];
///     while !sensor.is_finger_present().await? {}
///     if sensor.get_frame(&mut buf).await? {
///         Ok(Some(buf))
///     } else {
///         println!("capture failed: {}", sensor.last_error());
///         Ok(None)
///     }
/// }
/// ```
pub trait FingerprintSensor: Send + Sync {
    /// Acquire the device handle.
    async fn open(&mut self) -> Result<()>;

    /// Release the device handle.
    async fn close(&mut self) -> Result<()>;

    async fn image_size(&mut self) -> Result<ImageSize>;

    /// Whether a finger is on the glass right now. Does not block.
    async fn is_finger_present(&mut self) -> Result<bool>;

    /// Capture one frame into `buffer`.
    ///
    /// Returns `Ok(false)` when the scanner refused the sample; the reason is
    /// then available from [`last_error`](Self::last_error).
    ///
    /// # Errors
    ///
    /// Returns an error only when the device itself is unusable, for example
    /// `HardwareError::Disconnected`.
    async fn get_frame(&mut self, buffer: &mut [u8]) -> Result<bool>;

    /// Code of the most recent failed capture.
    fn last_error(&self) -> SensorErrorCode;
}

/// Door lock output and two-line text display.
pub trait AccessActuator: Send + Sync {
    /// Drive the lock: `true` releases it, `false` locks it.
    async fn set_lock(&mut self, open: bool) -> Result<()>;

    /// Replace display line `line` (0 or 1) with `text`.
    async fn display_line(&mut self, text: &str, line: u8) -> Result<()>;
}

/// Source of the per-device identifier.
pub trait IdentityProvider: Send + Sync {
    async fn hardware_id(&self, interface: &str) -> Result<HardwareId>;
}
