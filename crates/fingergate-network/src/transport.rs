#![allow(async_fn_in_trait)]

use crate::error::Result;
use fingergate_protocol::EnrollmentRequest;

/// HTTP status and body of an enrollment response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Submits one enrollment request.
///
/// Implementations read the encrypted file but never delete it.
pub trait EnrollmentTransport: Send + Sync {
    async fn submit(&self, request: &EnrollmentRequest) -> Result<TransportResponse>;
}
