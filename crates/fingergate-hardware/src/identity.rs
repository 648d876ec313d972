//! Hardware identifier sources.

use crate::{HardwareError, Result, traits::IdentityProvider};
use fingergate_core::HardwareId;
use std::path::PathBuf;
use tracing::debug;

const SYSFS_NET: &str = "/sys/class/net";

/// Reads the interface MAC address from sysfs.
///
/// `/sys/class/net/<iface>/address` holds the address as lower-case hex; it
/// is returned upper-cased as `XX:XX:XX:XX:XX:XX`.
#[derive(Debug, Clone)]
pub struct SysfsIdentity {
    root: PathBuf,
}

impl SysfsIdentity {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from(SYSFS_NET),
        }
    }

    /// Read interfaces below `root` instead of `/sys/class/net`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for SysfsIdentity {
    async fn hardware_id(&self, interface: &str) -> Result<HardwareId> {
        if interface.is_empty() || interface.contains('/') || interface == "." || interface == ".." {
            return Err(HardwareError::invalid_data(format!(
                "invalid interface name {interface:?}"
            )));
        }
        let path = self.root.join(interface).join("address");
        let text = tokio::fs::read_to_string(&path).await?;
        let mac = parse_mac(text.trim())?;
        let id = HardwareId::from_mac(mac);
        debug!(interface, hardware_id = %id, "read hardware id");
        Ok(id)
    }
}

fn parse_mac(text: &str) -> Result<[u8; 6]> {
    let invalid = || HardwareError::invalid_data(format!("not a MAC address: {text:?}"));
    let mut mac = [0u8; 6];
    let mut parts = text.split(':');
    for byte in &mut mac {
        let part = parts.next().ok_or_else(invalid)?;
        if part.len() != 2 {
            return Err(invalid());
        }
        *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(mac)
}

/// Always returns the same identifier, whatever interface is asked for.
#[derive(Debug, Clone)]
pub struct StaticIdentity(HardwareId);

impl StaticIdentity {
    pub fn new(id: HardwareId) -> Self {
        Self(id)
    }
}

impl IdentityProvider for StaticIdentity {
    async fn hardware_id(&self, _interface: &str) -> Result<HardwareId> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("b8:27:eb:12:ab:cd", [0xb8, 0x27, 0xeb, 0x12, 0xab, 0xcd])]
    #[case("00:00:00:00:00:00", [0; 6])]
    fn test_parse_mac(#[case] text: &str, #[case] expected: [u8; 6]) {
        assert_eq!(parse_mac(text).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("b8:27:eb:12:ab")]
    #[case("b8:27:eb:12:ab:cd:ef")]
    #[case("b8-27-eb-12-ab-cd")]
    #[case("zz:27:eb:12:ab:cd")]
    #[case("b:827:eb:12:ab:cd")]
    fn test_parse_mac_invalid(#[case] text: &str) {
        assert!(parse_mac(text).is_err());
    }

    #[tokio::test]
    async fn test_sysfs_reads_and_upper_cases() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("wlan0")).unwrap();
        std::fs::write(root.path().join("wlan0/address"), "b8:27:eb:12:ab:cd\n").unwrap();

        let identity = SysfsIdentity::with_root(root.path());
        let id = identity.hardware_id("wlan0").await.unwrap();
        assert_eq!(id.as_str(), "B8:27:EB:12:AB:CD");
        assert!(id.is_mac_formatted());
    }

    #[tokio::test]
    async fn test_sysfs_missing_interface() {
        let root = tempfile::tempdir().unwrap();
        let identity = SysfsIdentity::with_root(root.path());
        assert!(matches!(
            identity.hardware_id("eth9").await,
            Err(HardwareError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_sysfs_rejects_path_traversal() {
        let identity = SysfsIdentity::new();
        assert!(identity.hardware_id("../etc").await.is_err());
    }

    #[tokio::test]
    async fn test_static_identity() {
        let id = HardwareId::new("door-7").unwrap();
        let identity = StaticIdentity::new(id.clone());
        assert_eq!(identity.hardware_id("anything").await.unwrap(), id);
    }
}
