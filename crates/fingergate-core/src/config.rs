//! Device configuration.
//!
//! A single [`DeviceConfig`] describes one door unit: where to send
//! enrollment requests, the shared secret, timing of the capture loop and the
//! lock, and the display texts. It can be built in code with the setter
//! methods or loaded from a JSON file. Fields missing from the file take the
//! values from [`DeviceConfig::default`].
//!
//! ```json
//! {
//!   "endpoint_url": "http://10.100.123.34:8080/api/v1/enrollments",
//!   "shared_secret": "YourSecretKey123",
//!   "network_interface": "wlan0",
//!   "request_timeout_ms": 15000
//! }
//! ```

use crate::constants::{
    DEFAULT_CAPTURE_BACKOFF_MS, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DISPLAY_WIDTH,
    DEFAULT_FAULT_BACKOFF_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_UNLOCK_DWELL_MS,
};
use crate::{Error, Result, SharedSecret};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one door unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Enrollment endpoint (POST, multipart/form-data).
    pub endpoint_url: String,

    /// Secret shared with the server, used only for key derivation.
    pub shared_secret: SharedSecret,

    /// Network interface whose physical address identifies the device.
    pub network_interface: String,

    /// Directory for the per-cycle image and encrypted files.
    pub work_dir: PathBuf,

    /// Upper bound for one enrollment request, connect included.
    pub request_timeout_ms: u64,

    /// Upper bound for establishing the connection.
    pub connect_timeout_ms: u64,

    /// How long the lock stays open after a grant.
    pub unlock_dwell_ms: u64,

    /// Interval between finger-presence polls.
    pub poll_interval_ms: u64,

    /// Pause between frame attempts after a transient sensor error.
    pub capture_backoff_ms: u64,

    /// Maximum frame attempts per cycle. `None` retries until a frame arrives.
    pub capture_retry_limit: Option<u32>,

    /// Give up waiting for a finger after this long. `None` waits forever.
    pub presence_timeout_ms: Option<u64>,

    /// Pause before the next cycle after a fatal hardware error.
    pub fault_backoff_ms: u64,

    /// Characters per display line.
    pub display_width: usize,

    /// Text placed before the user's name on a grant.
    pub greeting_prefix: String,

    /// Text shown on a denial.
    pub denial_message: String,

    /// Keep the unencrypted image files in `work_dir`.
    pub keep_plaintext_images: bool,

    /// Fixed seed for the random generator. Only meant for tests and replays.
    pub rng_seed: Option<u64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:8080/api/v1/enrollments".to_string(),
            shared_secret: SharedSecret::default(),
            network_interface: "wlan0".to_string(),
            work_dir: PathBuf::from("fingers"),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            unlock_dwell_ms: DEFAULT_UNLOCK_DWELL_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            capture_backoff_ms: DEFAULT_CAPTURE_BACKOFF_MS,
            capture_retry_limit: None,
            presence_timeout_ms: None,
            fault_backoff_ms: DEFAULT_FAULT_BACKOFF_MS,
            display_width: DEFAULT_DISPLAY_WIDTH,
            greeting_prefix: "Hello ".to_string(),
            denial_message: "Access denied".to_string(),
            keep_plaintext_images: false,
            rng_seed: None,
        }
    }
}

impl DeviceConfig {
    /// Create a configuration for the given endpoint and secret.
    pub fn new(endpoint_url: impl Into<String>, shared_secret: SharedSecret) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            shared_secret,
            ..Default::default()
        }
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, `Error::ConfigParse` if
    /// it is not valid JSON for this structure, and `Error::Config` if
    /// validation fails.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config = Self::parse_json(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file without validating it.
    ///
    /// For callers that layer overrides (the secret from the environment,
    /// say) on top of the file and call [`validate`](Self::validate) after.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_json(&text)
    }

    /// Parse JSON text without validating it.
    pub fn parse_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check the invariants the pipeline relies on.
    ///
    /// # Errors
    /// Returns `Error::MissingConfig` for an empty secret or interface, and
    /// `Error::Config` for a non-HTTP endpoint, a zero request timeout, or a
    /// display too narrow for the greeting prefix.
    pub fn validate(&self) -> Result<()> {
        if self.shared_secret.is_empty() {
            return Err(Error::MissingConfig("shared_secret".to_string()));
        }
        if self.network_interface.is_empty() {
            return Err(Error::MissingConfig("network_interface".to_string()));
        }
        if !(self.endpoint_url.starts_with("http://") || self.endpoint_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "endpoint_url must be an http(s) URL, got {:?}",
                self.endpoint_url
            )));
        }
        // A hung connection would otherwise block the door forever.
        if self.request_timeout_ms == 0 {
            return Err(Error::Config(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout_ms == 0 || self.connect_timeout_ms > self.request_timeout_ms {
            return Err(Error::Config(format!(
                "connect_timeout_ms must be in 1..={}, got {}",
                self.request_timeout_ms, self.connect_timeout_ms
            )));
        }
        if self.display_width <= self.greeting_prefix.chars().count() {
            return Err(Error::Config(format!(
                "display_width {} leaves no room after greeting prefix {:?}",
                self.display_width, self.greeting_prefix
            )));
        }
        if self.capture_retry_limit == Some(0) {
            return Err(Error::Config(
                "capture_retry_limit must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = url.into();
        self
    }

    pub fn network_interface(mut self, interface: impl Into<String>) -> Self {
        self.network_interface = interface.into();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn unlock_dwell(mut self, dwell: Duration) -> Self {
        self.unlock_dwell_ms = dwell.as_millis() as u64;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn capture_backoff(mut self, backoff: Duration) -> Self {
        self.capture_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn capture_retry_limit(mut self, limit: Option<u32>) -> Self {
        self.capture_retry_limit = limit;
        self
    }

    pub fn presence_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.presence_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn fault_backoff(mut self, backoff: Duration) -> Self {
        self.fault_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn display_width(mut self, width: usize) -> Self {
        self.display_width = width;
        self
    }

    pub fn greeting_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.greeting_prefix = prefix.into();
        self
    }

    pub fn keep_plaintext_images(mut self, keep: bool) -> Self {
        self.keep_plaintext_images = keep;
        self
    }

    pub fn rng_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn unlock_dwell_duration(&self) -> Duration {
        Duration::from_millis(self.unlock_dwell_ms)
    }

    pub fn poll_interval_duration(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn capture_backoff_duration(&self) -> Duration {
        Duration::from_millis(self.capture_backoff_ms)
    }

    pub fn presence_timeout_duration(&self) -> Option<Duration> {
        self.presence_timeout_ms.map(Duration::from_millis)
    }

    pub fn fault_backoff_duration(&self) -> Duration {
        Duration::from_millis(self.fault_backoff_ms)
    }
}
