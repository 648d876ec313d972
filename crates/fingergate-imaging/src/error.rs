use std::path::PathBuf;

/// Result type alias for imaging operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    /// Width or height is zero or too large for the container.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The pixel buffer holds fewer bytes than width × height.
    #[error("pixel buffer too small: expected {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    /// The destination file could not be created or written.
    #[error("cannot write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes handed to the decoder are not a container this crate writes.
    #[error("malformed image: {0}")]
    Malformed(String),
}

impl ImagingError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
