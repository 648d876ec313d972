//! The access cycle orchestrator.

use crate::display::Screen;
use crate::error::{PipelineError, Result};
use crate::outcome::{CycleOutcome, DenialReason};
use crate::state_machine::{PipelineState, StateMachine};
use fingergate_core::{DecisionText, DeviceConfig, FingerType, HardwareId};
use fingergate_crypto::encrypt_file;
use fingergate_hardware::{AccessActuator, FingerprintSensor, ImageSize, SensorErrorCode};
use fingergate_imaging::{RawImage, encode};
use fingergate_network::EnrollmentTransport;
use fingergate_protocol::{DecisionParser, EnrollmentRequest, MarkerScanParser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::time::{Instant, sleep};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Runs capture → encode → encrypt → transmit → decide → actuate cycles.
///
/// One cycle runs to completion before the next starts. Failures that only
/// spoil the current cycle come back as a [`CycleOutcome`]; only a dead
/// sensor or a failing lock output stop the pipeline.
///
/// The random generator used for finger selection and IVs is owned here and
/// seeded once, from `config.rng_seed` when set.
///
/// # Examples
///
/// ```no_run
/// use fingergate_core::{DeviceConfig, HardwareId, SharedSecret};
/// use fingergate_hardware::{LogPanel, ReplaySensor};
/// use fingergate_network::{HttpClientConfig, HttpEnrollmentClient};
/// use fingergate_pipeline::AccessPipeline;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DeviceConfig::new(
///     "http://10.0.0.5:8080/api/v1/enrollments",
///     SharedSecret::new("YourSecretKey123"),
/// );
/// let sensor = ReplaySensor::from_file("frame.raw".as_ref(), 320, 480)?;
/// let transport = HttpEnrollmentClient::new(HttpClientConfig::from(&config))?;
/// let id = HardwareId::new("B8:27:EB:12:AB:CD")?;
///
/// let mut pipeline = AccessPipeline::new(sensor, LogPanel::new(), transport, config, id);
/// let outcome = pipeline.run_cycle().await?;
/// println!("{outcome}");
/// # Ok(())
/// # }
/// ```
pub struct AccessPipeline<S, A, T, P = MarkerScanParser> {
    sensor: S,
    actuator: A,
    transport: T,
    parser: P,
    config: DeviceConfig,
    hardware_id: HardwareId,
    rng: StdRng,
    machine: StateMachine,
    image_size: Option<ImageSize>,
    frame: Vec<u8>,
    cycles: u64,
}

impl<S, A, T> AccessPipeline<S, A, T, MarkerScanParser>
where
    S: FingerprintSensor,
    A: AccessActuator,
    T: EnrollmentTransport,
{
    /// Create a pipeline using the marker-scan decision parser.
    ///
    /// `hardware_id` is resolved once by the caller and reused for every
    /// request.
    pub fn new(
        sensor: S,
        actuator: A,
        transport: T,
        config: DeviceConfig,
        hardware_id: HardwareId,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            sensor,
            actuator,
            transport,
            parser: MarkerScanParser,
            config,
            hardware_id,
            rng,
            machine: StateMachine::new(),
            image_size: None,
            frame: Vec::new(),
            cycles: 0,
        }
    }
}

impl<S, A, T, P> AccessPipeline<S, A, T, P>
where
    S: FingerprintSensor,
    A: AccessActuator,
    T: EnrollmentTransport,
    P: DecisionParser,
{
    /// Swap the decision parser.
    pub fn with_parser<Q: DecisionParser>(self, parser: Q) -> AccessPipeline<S, A, T, Q> {
        AccessPipeline {
            sensor: self.sensor,
            actuator: self.actuator,
            transport: self.transport,
            parser,
            config: self.config,
            hardware_id: self.hardware_id,
            rng: self.rng,
            machine: self.machine,
            image_size: self.image_size,
            frame: self.frame,
            cycles: self.cycles,
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.machine.current_state()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn hardware_id(&self) -> &HardwareId {
        &self.hardware_id
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of cycles that reached a decision.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    /// Open the sensor, read its geometry and prepare the work directory.
    ///
    /// Called by [`run_cycle`](Self::run_cycle) when needed; calling it again
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// `WorkDir` if the directory cannot be created, `SensorUnavailable` if
    /// the sensor cannot be opened.
    pub async fn start(&mut self) -> Result<()> {
        if self.image_size.is_some() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.config.work_dir).map_err(PipelineError::WorkDir)?;

        self.sensor
            .open()
            .await
            .map_err(PipelineError::SensorUnavailable)?;
        let size = self
            .sensor
            .image_size()
            .await
            .map_err(PipelineError::SensorUnavailable)?;

        let pixels = size.width as usize * size.height as usize;
        self.frame = vec![0; size.byte_count.max(pixels)];
        self.image_size = Some(size);

        info!(
            width = size.width,
            height = size.height,
            byte_count = size.byte_count,
            hardware_id = %self.hardware_id,
            "sensor ready"
        );
        Ok(())
    }

    /// Lock the door and release the sensor.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.set_lock(false).await?;
        if self.image_size.take().is_some() {
            self.sensor
                .close()
                .await
                .map_err(PipelineError::SensorUnavailable)?;
        }
        self.machine.reset();
        Ok(())
    }

    /// Run cycles until the sensor disappears or the lock fails.
    ///
    /// After a hardware fault the next cycle waits `fault_backoff_ms`.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.run_cycle().await {
                Ok(CycleOutcome::HardwareFault { code }) => {
                    warn!(code = %code, "waiting before next cycle");
                    sleep(self.config.fault_backoff_duration()).await;
                }
                Ok(outcome) => debug!(%outcome, "cycle finished"),
                Err(e) => {
                    error!(error = %e, "pipeline stopped");
                    return Err(e);
                }
            }
        }
    }

    /// Run one access cycle.
    ///
    /// # Errors
    ///
    /// `SensorUnavailable` when the sensor fails outright, `Actuator` when the
    /// lock output fails.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let span = info_span!("cycle", id = %Uuid::new_v4());
        self.cycle().instrument(span).await
    }

    async fn cycle(&mut self) -> Result<CycleOutcome> {
        self.start().await?;
        self.enter_capture()?;

        let width = self.config.display_width;
        let finger = FingerType::random(&mut self.rng);
        info!(finger = %finger, "requesting finger");
        self.show(Screen::prompt(finger, width)).await;

        if !self.wait_for_finger().await? {
            debug!("no finger within presence timeout");
            self.enter(PipelineState::Idle)?;
            return Ok(CycleOutcome::NoFinger);
        }

        if let Some(outcome) = self.capture(finger).await? {
            return Ok(outcome);
        }

        // Encoding
        self.enter(PipelineState::Encoding)?;
        let image_path = match self.encode_frame() {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, "encoding failed");
                return self.local_failure(PipelineState::Encoding).await;
            }
        };

        // Encrypting
        self.enter(PipelineState::Encrypting)?;
        let encrypted_path = encrypted_path_for(&image_path);
        let encrypted = encrypt_file(
            &image_path,
            &encrypted_path,
            &self.config.shared_secret,
            &mut self.rng,
        );
        if !self.config.keep_plaintext_images {
            remove_artifact(&image_path);
        }
        if let Err(e) = encrypted {
            error!(error = %e, "encryption failed");
            remove_artifact(&encrypted_path);
            return self.local_failure(PipelineState::Encrypting).await;
        }

        // Transmitting
        self.enter(PipelineState::Transmitting)?;
        let request = EnrollmentRequest::new(&encrypted_path, finger, self.hardware_id.clone());
        let submitted = self.transport.submit(&request).await;
        remove_artifact(&encrypted_path);
        let response = match submitted {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "enrollment request failed");
                self.show(Screen::transport_failure(width)).await;
                self.enter(PipelineState::CaptureRequested)?;
                return Ok(CycleOutcome::TransportFailed);
            }
        };

        // Deciding
        self.enter(PipelineState::Deciding)?;
        let decision = self.parser.parse(&response.body);
        info!(
            status = response.status,
            success = decision.success,
            message = %decision.message,
            "server decision"
        );

        // Actuating
        self.enter(PipelineState::Actuating)?;
        let outcome = if decision.is_granted() {
            self.grant(decision.subject_name).await?
        } else {
            let reason = if decision.verdict_present {
                DenialReason::Rejected
            } else {
                warn!(status = response.status, "response carried no verdict, denying");
                DenialReason::MissingVerdict
            };
            self.deny(reason).await?
        };

        self.enter(PipelineState::Idle)?;
        self.cycles += 1;
        Ok(outcome)
    }

    fn enter_capture(&mut self) -> Result<()> {
        match self.state() {
            PipelineState::CaptureRequested => {}
            PipelineState::Idle => {
                self.enter(PipelineState::CaptureRequested)?;
            }
            other => {
                warn!(state = %other, "previous cycle did not finish, resetting");
                self.machine.reset();
                self.enter(PipelineState::CaptureRequested)?;
            }
        }
        Ok(())
    }

    /// Move the state machine, logging how long the previous stage took.
    fn enter(&mut self, state: PipelineState) -> Result<()> {
        let spent = self.machine.time_in_current_state();
        let transition = self.machine.transition_to(state)?;
        debug!(
            from = %transition.from,
            to = %transition.to,
            spent_ms = spent.as_millis() as u64,
            "stage change"
        );
        Ok(())
    }

    /// Poll for a finger. `false` means the presence timeout ran out.
    async fn wait_for_finger(&mut self) -> Result<bool> {
        let deadline = self
            .config
            .presence_timeout_duration()
            .map(|timeout| Instant::now() + timeout);
        let poll = self.config.poll_interval_duration();

        loop {
            if self
                .sensor
                .is_finger_present()
                .await
                .map_err(PipelineError::SensorUnavailable)?
            {
                return Ok(true);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(false);
            }
            sleep(poll).await;
        }
    }

    /// Read frames until one succeeds. `Some` ends the cycle early.
    async fn capture(&mut self, finger: FingerType) -> Result<Option<CycleOutcome>> {
        let width = self.config.display_width;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let captured = self
                .sensor
                .get_frame(&mut self.frame)
                .await
                .map_err(PipelineError::SensorUnavailable)?;
            if captured {
                debug!(attempts, "frame captured");
                return Ok(None);
            }

            let code = self.sensor.last_error();
            if code.is_fatal() {
                error!(code = %code, "sensor fault");
                self.show(Screen::sensor_fault(code, width)).await;
                self.enter(PipelineState::Idle)?;
                return Ok(Some(CycleOutcome::HardwareFault { code }));
            }
            match code {
                SensorErrorCode::Unknown(_) => warn!(code = %code, attempts, "unknown sensor code"),
                _ => debug!(code = %code, attempts, "capture failed, retrying"),
            }
            self.show(Screen::sensor_retry(finger, code, width)).await;

            if self
                .config
                .capture_retry_limit
                .is_some_and(|limit| attempts >= limit)
            {
                warn!(attempts, "giving up on capture");
                self.show(Screen::local_failure(width)).await;
                return Ok(Some(CycleOutcome::LocalFailure {
                    stage: PipelineState::CaptureRequested,
                }));
            }
            self.enter(PipelineState::CaptureRequested)?;
            sleep(self.config.capture_backoff_duration()).await;
        }
    }

    fn encode_frame(&self) -> fingergate_imaging::Result<PathBuf> {
        let size = self.image_size.ok_or(fingergate_imaging::ImagingError::InvalidDimensions {
            width: 0,
            height: 0,
        })?;
        let image = RawImage::new(size.width, size.height, self.frame.clone())?;
        encode(&image)?.write_to(&self.config.work_dir)
    }

    async fn local_failure(&mut self, stage: PipelineState) -> Result<CycleOutcome> {
        self.show(Screen::local_failure(self.config.display_width))
            .await;
        self.enter(PipelineState::CaptureRequested)?;
        Ok(CycleOutcome::LocalFailure { stage })
    }

    async fn grant(&mut self, subject: DecisionText) -> Result<CycleOutcome> {
        let screen = Screen::granted(
            &self.config.greeting_prefix,
            subject.as_str(),
            self.config.display_width,
        );
        let display_text = screen.top.trim_end().to_string();
        self.show(screen).await;

        info!(subject = %subject, "access granted");
        self.set_lock(true).await?;
        sleep(self.config.unlock_dwell_duration()).await;
        self.set_lock(false).await?;

        Ok(CycleOutcome::Granted {
            subject,
            display_text,
        })
    }

    async fn deny(&mut self, reason: DenialReason) -> Result<CycleOutcome> {
        let screen = Screen::denied(&self.config.denial_message, self.config.display_width);
        self.show(screen).await;

        info!(reason = ?reason, "access denied");
        self.set_lock(false).await?;
        Ok(CycleOutcome::Denied { reason })
    }

    async fn set_lock(&mut self, open: bool) -> Result<()> {
        self.actuator
            .set_lock(open)
            .await
            .map_err(PipelineError::Actuator)
    }

    /// Display problems are logged, never fatal.
    async fn show(&mut self, screen: Screen) {
        for (line, text) in [(0u8, screen.top), (1u8, screen.bottom)] {
            if let Err(e) = self.actuator.display_line(&text, line).await {
                warn!(line, error = %e, "display write failed");
            }
        }
    }
}

fn encrypted_path_for(image_path: &Path) -> PathBuf {
    let mut name = image_path.as_os_str().to_owned();
    name.push(".enc");
    PathBuf::from(name)
}

fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove file"),
    }
}
