//! Vendor status codes reported by the fingerprint scanner.

use std::fmt;

const EMPTY_FRAME: u32 = 4306;
const MOVABLE_FINGER: u32 = 0x2000_0001;
const NO_FRAME: u32 = 0x2000_0002;
const HARDWARE_INCOMPATIBLE: u32 = 0x2000_0004;
const FIRMWARE_INCOMPATIBLE: u32 = 0x2000_0005;
const INVALID_AUTHORIZATION_CODE: u32 = 0x2000_0006;

/// Last error reported by the sensor driver.
///
/// Transient codes mean "try again": the finger moved, the frame came back
/// empty, or the scanner rejected the sample as fake. Fatal codes mean the
/// device cannot produce frames at all and retrying is pointless until an
/// operator intervenes. Codes this crate does not recognize are treated as
/// transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorErrorCode {
    Ok,
    EmptyFrame,
    MovableFinger,
    NoFrame,
    HardwareIncompatible,
    FirmwareIncompatible,
    InvalidAuthorizationCode,
    Unknown(u32),
}

impl SensorErrorCode {
    pub fn from_raw(code: u32) -> Self {
        match code {
            0 => Self::Ok,
            EMPTY_FRAME => Self::EmptyFrame,
            MOVABLE_FINGER => Self::MovableFinger,
            NO_FRAME => Self::NoFrame,
            HARDWARE_INCOMPATIBLE => Self::HardwareIncompatible,
            FIRMWARE_INCOMPATIBLE => Self::FirmwareIncompatible,
            INVALID_AUTHORIZATION_CODE => Self::InvalidAuthorizationCode,
            other => Self::Unknown(other),
        }
    }

    pub fn as_raw(&self) -> u32 {
        match self {
            Self::Ok => 0,
            Self::EmptyFrame => EMPTY_FRAME,
            Self::MovableFinger => MOVABLE_FINGER,
            Self::NoFrame => NO_FRAME,
            Self::HardwareIncompatible => HARDWARE_INCOMPATIBLE,
            Self::FirmwareIncompatible => FIRMWARE_INCOMPATIBLE,
            Self::InvalidAuthorizationCode => INVALID_AUTHORIZATION_CODE,
            Self::Unknown(code) => *code,
        }
    }

    /// Retrying the capture may succeed.
    pub fn is_transient(&self) -> bool {
        !self.is_fatal() && *self != Self::Ok
    }

    /// The device cannot capture until someone fixes it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::HardwareIncompatible | Self::FirmwareIncompatible | Self::InvalidAuthorizationCode
        )
    }

    /// Short text for the door display.
    pub fn display_text(&self) -> String {
        match self {
            Self::Ok => "OK".to_string(),
            Self::EmptyFrame => "- Empty frame -".to_string(),
            Self::MovableFinger => "- Movable finger -".to_string(),
            Self::NoFrame => "- Fake finger -".to_string(),
            Self::HardwareIncompatible => "- Incompatible hardware -".to_string(),
            Self::FirmwareIncompatible => "- Incompatible firmware -".to_string(),
            Self::InvalidAuthorizationCode => "- Invalid authorization code -".to_string(),
            Self::Unknown(code) => format!("Unknown code {code}"),
        }
    }
}

impl fmt::Display for SensorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.display_text(), self.as_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, SensorErrorCode::Ok)]
    #[case(4306, SensorErrorCode::EmptyFrame)]
    #[case(0x2000_0001, SensorErrorCode::MovableFinger)]
    #[case(0x2000_0002, SensorErrorCode::NoFrame)]
    #[case(0x2000_0004, SensorErrorCode::HardwareIncompatible)]
    #[case(0x2000_0005, SensorErrorCode::FirmwareIncompatible)]
    #[case(0x2000_0006, SensorErrorCode::InvalidAuthorizationCode)]
    #[case(77, SensorErrorCode::Unknown(77))]
    fn test_raw_mapping(#[case] raw: u32, #[case] code: SensorErrorCode) {
        assert_eq!(SensorErrorCode::from_raw(raw), code);
        assert_eq!(code.as_raw(), raw);
    }

    #[rstest]
    #[case(SensorErrorCode::EmptyFrame, true, false)]
    #[case(SensorErrorCode::MovableFinger, true, false)]
    #[case(SensorErrorCode::NoFrame, true, false)]
    #[case(SensorErrorCode::Unknown(12), true, false)]
    #[case(SensorErrorCode::HardwareIncompatible, false, true)]
    #[case(SensorErrorCode::FirmwareIncompatible, false, true)]
    #[case(SensorErrorCode::InvalidAuthorizationCode, false, true)]
    #[case(SensorErrorCode::Ok, false, false)]
    fn test_classification(
        #[case] code: SensorErrorCode,
        #[case] transient: bool,
        #[case] fatal: bool,
    ) {
        assert_eq!(code.is_transient(), transient);
        assert_eq!(code.is_fatal(), fatal);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(SensorErrorCode::MovableFinger.display_text(), "- Movable finger -");
        assert_eq!(
            SensorErrorCode::MovableFinger.to_string(),
            "- Movable finger - (0x20000001)"
        );
    }
}
