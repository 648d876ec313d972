//! Sensor that replays a raw frame from disk.

use crate::{
    HardwareError, Result,
    sensor_error::SensorErrorCode,
    traits::{FingerprintSensor, ImageSize},
};
use std::path::Path;
use tracing::info;

/// Serves the same grayscale frame on every capture.
///
/// A finger is always present. With a limit set, the sensor reports itself
/// disconnected once that many frames have been served, which ends the
/// pipeline loop.
#[derive(Debug, Clone)]
pub struct ReplaySensor {
    frame: Vec<u8>,
    size: ImageSize,
    limit: Option<usize>,
    served: usize,
    open: bool,
}

impl ReplaySensor {
    /// # Errors
    ///
    /// `InvalidData` if `frame` is shorter than `width * height`.
    pub fn new(frame: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let size = ImageSize::new(width, height);
        if width == 0 || height == 0 || frame.len() < size.byte_count {
            return Err(HardwareError::invalid_data(format!(
                "replay frame has {} bytes, {}x{} needs {}",
                frame.len(),
                width,
                height,
                size.byte_count
            )));
        }
        Ok(Self {
            frame,
            size,
            limit: None,
            served: 0,
            open: false,
        })
    }

    /// Load a headerless 8-bit frame.
    pub fn from_file(path: &Path, width: u32, height: u32) -> Result<Self> {
        let frame = std::fs::read(path)?;
        info!(path = %path.display(), width, height, "loaded replay frame");
        Self::new(frame, width, height)
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.served >= limit)
    }

    fn check(&self) -> Result<()> {
        if !self.open {
            return Err(HardwareError::initialization_failed("sensor is not open"));
        }
        if self.exhausted() {
            return Err(HardwareError::disconnected("replay frames exhausted"));
        }
        Ok(())
    }
}

impl FingerprintSensor for ReplaySensor {
    async fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    async fn image_size(&mut self) -> Result<ImageSize> {
        if !self.open {
            return Err(HardwareError::initialization_failed("sensor is not open"));
        }
        Ok(self.size)
    }

    async fn is_finger_present(&mut self) -> Result<bool> {
        self.check()?;
        Ok(true)
    }

    async fn get_frame(&mut self, buffer: &mut [u8]) -> Result<bool> {
        self.check()?;
        let n = self.frame.len().min(buffer.len());
        buffer[..n].copy_from_slice(&self.frame[..n]);
        self.served += 1;
        Ok(true)
    }

    fn last_error(&self) -> SensorErrorCode {
        SensorErrorCode::Ok
    }
}
