//! `reqwest` implementation of [`EnrollmentTransport`].

use crate::error::{Result, TransportError};
use crate::transport::{EnrollmentTransport, TransportResponse};
use fingergate_core::DeviceConfig;
use fingergate_core::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS, ENCRYPTED_CONTENT_TYPE, FIELD_FILE,
};
use fingergate_protocol::EnrollmentRequest;
use reqwest::multipart::{Form, Part};
use reqwest::redirect;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for [`HttpEnrollmentClient`].
///
/// # Example
///
/// ```
/// use fingergate_network::HttpClientConfig;
/// use std::time::Duration;
///
/// let config = HttpClientConfig {
///     endpoint: "http://10.0.0.5:8080/api/v1/enrollments".to_string(),
///     timeout: Duration::from_secs(10),
///     connect_timeout: Duration::from_secs(3),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Full URL the form is posted to.
    pub endpoint: String,

    /// Bound on the whole request, connect included. Must be finite.
    pub timeout: Duration,

    /// Bound on establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/api/v1/enrollments".to_string(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

impl From<&DeviceConfig> for HttpClientConfig {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            endpoint: config.endpoint_url.clone(),
            timeout: config.request_timeout_duration(),
            connect_timeout: config.connect_timeout_duration(),
        }
    }
}

/// Posts enrollment forms over HTTP(S).
///
/// Redirects are never followed: a 3xx comes back as a plain response so the
/// encrypted sample is not replayed to whatever host the server points at.
#[derive(Debug, Clone)]
pub struct HttpEnrollmentClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpEnrollmentClient {
    /// # Errors
    ///
    /// `TransportError::Init` if the TLS backend cannot be initialized.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::Init(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.config.timeout.as_millis() as u64)
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }

    async fn build_form(request: &EnrollmentRequest) -> Result<Form> {
        let contents = tokio::fs::read(&request.encrypted_file)
            .await
            .map_err(|source| TransportError::ReadFile {
                path: request.encrypted_file.clone(),
                source,
            })?;
        let size = contents.len();

        let file = Part::bytes(contents)
            .file_name(request.file_name())
            .mime_str(ENCRYPTED_CONTENT_TYPE)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let mut form = Form::new().part(FIELD_FILE, file);
        for (name, value) in request.text_fields() {
            form = form.text(name, value);
        }
        debug!(bytes = size, "built enrollment form");
        Ok(form)
    }
}

impl EnrollmentTransport for HttpEnrollmentClient {
    async fn submit(&self, request: &EnrollmentRequest) -> Result<TransportResponse> {
        let form = Self::build_form(request).await?;

        info!(
            endpoint = %self.config.endpoint,
            finger = %request.finger_type,
            hardware_id = %request.hardware_id,
            "submitting enrollment"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let body = String::from_utf8_lossy(&body).into_owned();

        if (200..300).contains(&status) {
            debug!(status, bytes = body.len(), "enrollment response");
        } else {
            warn!(status, bytes = body.len(), "enrollment response with non-success status");
        }
        Ok(TransportResponse { status, body })
    }
}
