//! Mock fingerprint scanner driven over a channel.

use crate::{
    HardwareError, Result,
    sensor_error::SensorErrorCode,
    traits::{FingerprintSensor, ImageSize},
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Scripted outcome of the next capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorEvent {
    /// A finger is placed and this frame is captured.
    Frame(Vec<u8>),
    /// A finger is placed but the capture fails with this code.
    Error(SensorErrorCode),
    /// One presence poll sees no finger.
    NoFinger,
}

/// Mock fingerprint scanner for tests and development.
///
/// Presence polls return `false` while nothing is queued. Once the handle is
/// dropped and the queue is drained, every call fails with
/// `HardwareError::Disconnected`.
///
/// # Examples
///
/// ```
/// use fingergate_hardware::mock::MockSensor;
/// use fingergate_hardware::FingerprintSensor;
///
/// #[tokio::main]
/// async fn main() -> fingergate_hardware::Result<()> {
///     let (mut sensor, handle) = MockSensor::new(2, 2);
///     handle.present_frame(vec![1, 2, 3, 4]).await?;
///
///     sensor.open().await?;
///     assert!(sensor.is_finger_present().await?);
///
///     let mut buf = [0u8; 4];
///     assert!(sensor.get_frame(&mut buf).await?);
///     assert_eq!(buf, [1, 2, 3, 4]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockSensor {
    event_rx: mpsc::Receiver<SensorEvent>,
    pending: Option<SensorEvent>,
    size: ImageSize,
    last_error: SensorErrorCode,
    open: bool,
    frames_served: usize,
}

impl MockSensor {
    /// Create a scanner that reports `width` × `height` frames.
    pub fn new(width: u32, height: u32) -> (Self, MockSensorHandle) {
        Self::with_size(ImageSize::new(width, height))
    }

    pub fn with_size(size: ImageSize) -> (Self, MockSensorHandle) {
        let (event_tx, event_rx) = mpsc::channel(64);

        let sensor = Self {
            event_rx,
            pending: None,
            size,
            last_error: SensorErrorCode::Ok,
            open: false,
            frames_served: 0,
        };

        (sensor, MockSensorHandle { event_tx })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Number of successful captures so far.
    pub fn frames_served(&self) -> usize {
        self.frames_served
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(HardwareError::initialization_failed("sensor is not open"))
        }
    }

    fn closed() -> HardwareError {
        HardwareError::disconnected("Mock sensor event channel closed")
    }
}

impl FingerprintSensor for MockSensor {
    async fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    async fn image_size(&mut self) -> Result<ImageSize> {
        self.ensure_open()?;
        Ok(self.size)
    }

    async fn is_finger_present(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.pending.is_some() {
            return Ok(true);
        }
        match self.event_rx.try_recv() {
            Ok(SensorEvent::NoFinger) | Err(TryRecvError::Empty) => Ok(false),
            Ok(event) => {
                self.pending = Some(event);
                Ok(true)
            }
            Err(TryRecvError::Disconnected) => Err(Self::closed()),
        }
    }

    async fn get_frame(&mut self, buffer: &mut [u8]) -> Result<bool> {
        self.ensure_open()?;
        let event = match self.pending.take() {
            Some(event) => event,
            None => self.event_rx.recv().await.ok_or_else(Self::closed)?,
        };

        match event {
            SensorEvent::Frame(data) => {
                let n = data.len().min(buffer.len());
                buffer[..n].copy_from_slice(&data[..n]);
                self.last_error = SensorErrorCode::Ok;
                self.frames_served += 1;
                Ok(true)
            }
            SensorEvent::Error(code) => {
                self.last_error = code;
                Ok(false)
            }
            SensorEvent::NoFinger => {
                self.last_error = SensorErrorCode::EmptyFrame;
                Ok(false)
            }
        }
    }

    fn last_error(&self) -> SensorErrorCode {
        self.last_error
    }
}

/// Handle for scripting a [`MockSensor`].
#[derive(Debug, Clone)]
pub struct MockSensorHandle {
    event_tx: mpsc::Sender<SensorEvent>,
}

impl MockSensorHandle {
    /// Queue an arbitrary event.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor has been dropped.
    pub async fn send(&self, event: SensorEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| MockSensor::closed())
    }

    /// Place a finger that yields `frame`.
    pub async fn present_frame(&self, frame: Vec<u8>) -> Result<()> {
        self.send(SensorEvent::Frame(frame)).await
    }

    /// Place a finger whose capture fails with `code`.
    pub async fn fail_with(&self, code: SensorErrorCode) -> Result<()> {
        self.send(SensorEvent::Error(code)).await
    }

    /// Make one presence poll see an empty scanner.
    pub async fn lift_finger(&self) -> Result<()> {
        self.send(SensorEvent::NoFinger).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_open() {
        let (mut sensor, _handle) = MockSensor::new(4, 4);
        assert!(sensor.image_size().await.is_err());
        sensor.open().await.unwrap();
        assert_eq!(sensor.image_size().await.unwrap(), ImageSize::new(4, 4));
        sensor.close().await.unwrap();
        assert!(!sensor.is_open());
    }

    #[tokio::test]
    async fn test_empty_queue_means_no_finger() {
        let (mut sensor, _handle) = MockSensor::new(1, 1);
        sensor.open().await.unwrap();
        assert!(!sensor.is_finger_present().await.unwrap());
    }

    #[tokio::test]
    async fn test_error_then_frame() {
        let (mut sensor, handle) = MockSensor::new(1, 2);
        sensor.open().await.unwrap();
        handle.fail_with(SensorErrorCode::MovableFinger).await.unwrap();
        handle.present_frame(vec![7, 8]).await.unwrap();

        let mut buf = [0u8; 2];
        assert!(sensor.is_finger_present().await.unwrap());
        assert!(!sensor.get_frame(&mut buf).await.unwrap());
        assert_eq!(sensor.last_error(), SensorErrorCode::MovableFinger);

        assert!(sensor.get_frame(&mut buf).await.unwrap());
        assert_eq!(buf, [7, 8]);
        assert_eq!(sensor.last_error(), SensorErrorCode::Ok);
        assert_eq!(sensor.frames_served(), 1);
    }

    #[tokio::test]
    async fn test_lift_finger_consumes_one_poll() {
        let (mut sensor, handle) = MockSensor::new(1, 1);
        sensor.open().await.unwrap();
        handle.lift_finger().await.unwrap();
        handle.present_frame(vec![1]).await.unwrap();

        assert!(!sensor.is_finger_present().await.unwrap());
        assert!(sensor.is_finger_present().await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_handle_disconnects() {
        let (mut sensor, handle) = MockSensor::new(1, 1);
        sensor.open().await.unwrap();
        drop(handle);

        let err = sensor.is_finger_present().await.unwrap_err();
        assert!(err.is_disconnected());
        let err = sensor.get_frame(&mut [0u8; 1]).await.unwrap_err();
        assert!(err.is_disconnected());
    }
}
