use fingergate_core::constants::{FIELD_HARDWARE_ID, FIELD_TYPE};
use fingergate_core::{FingerType, HardwareId};
use std::path::PathBuf;

/// One enrollment/verification submission.
///
/// The encrypted file is referenced by path and read by the transport. The
/// caller owns the file and removes it after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRequest {
    pub encrypted_file: PathBuf,
    pub finger_type: FingerType,
    pub hardware_id: HardwareId,
}

impl EnrollmentRequest {
    pub fn new(
        encrypted_file: impl Into<PathBuf>,
        finger_type: FingerType,
        hardware_id: HardwareId,
    ) -> Self {
        Self {
            encrypted_file: encrypted_file.into(),
            finger_type,
            hardware_id,
        }
    }

    /// Plain-text form fields in submission order.
    pub fn text_fields(&self) -> [(&'static str, String); 2] {
        [
            (FIELD_TYPE, self.finger_type.as_str().to_string()),
            (FIELD_HARDWARE_ID, self.hardware_id.as_str().to_string()),
        ]
    }

    /// File name sent with the file part.
    pub fn file_name(&self) -> String {
        self.encrypted_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "finger.bmp.enc".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_fields() {
        let request = EnrollmentRequest::new(
            "/tmp/finger_20240101_120000.bmp.enc",
            FingerType::Thumb,
            HardwareId::from_mac([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]),
        );
        let fields = request.text_fields();
        assert_eq!(fields[0], ("type", "THUMB".to_string()));
        assert_eq!(fields[1], ("hardwareId", "DE:AD:BE:EF:00:01".to_string()));
        assert_eq!(request.file_name(), "finger_20240101_120000.bmp.enc");
    }
}
