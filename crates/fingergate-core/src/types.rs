use crate::{Result, constants::MAX_DECISION_FIELD_CHARS, error::Error};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finger the user is asked to present during a cycle.
///
/// The canonical text form (`THUMB`, `INDEX`, `MIDDLE`) is used both on the
/// display and as the `type` field of the enrollment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FingerType {
    Thumb,
    Index,
    Middle,
}

impl FingerType {
    /// All finger types, in wire order.
    pub const ALL: [FingerType; 3] = [FingerType::Thumb, FingerType::Index, FingerType::Middle];

    /// Pick a finger uniformly at random.
    ///
    /// The generator is owned by the caller so that tests can seed it.
    ///
    /// # Examples
    ///
    /// ```
    /// use fingergate_core::FingerType;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let finger = FingerType::random(&mut rng);
    /// assert!(FingerType::ALL.contains(&finger));
    /// ```
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Canonical upper-case label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FingerType::Thumb => "THUMB",
            FingerType::Index => "INDEX",
            FingerType::Middle => "MIDDLE",
        }
    }
}

impl fmt::Display for FingerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FingerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "THUMB" => Ok(FingerType::Thumb),
            "INDEX" => Ok(FingerType::Index),
            "MIDDLE" => Ok(FingerType::Middle),
            other => Err(Error::UnknownFingerType(other.to_string())),
        }
    }
}

/// Stable per-device identifier sent with every enrollment request.
///
/// Usually the MAC address of the device's network interface in
/// `XX:XX:XX:XX:XX:XX` form. Computed once per boot and reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareId(String);

impl HardwareId {
    /// Create a hardware identifier with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidHardwareId` if the id is empty, not ASCII, or
    /// contains control characters or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidHardwareId(
                "hardware id must not be empty".to_string(),
            ));
        }
        if !id.is_ascii() || id.chars().any(|c| c.is_ascii_control() || c == ' ') {
            return Err(Error::InvalidHardwareId(format!(
                "hardware id must be printable ASCII without spaces, got {id:?}"
            )));
        }
        Ok(HardwareId(id))
    }

    /// Format a 6-byte physical address as `XX:XX:XX:XX:XX:XX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fingergate_core::HardwareId;
    ///
    /// let id = HardwareId::from_mac([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]);
    /// assert_eq!(id.as_str(), "00:1A:2B:3C:4D:5E");
    /// ```
    #[must_use]
    pub fn from_mac(mac: [u8; 6]) -> Self {
        let text = mac
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":");
        HardwareId(text)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id looks like an upper-case colon-separated MAC address.
    #[must_use]
    pub fn is_mac_formatted(&self) -> bool {
        let parts: Vec<&str> = self.0.split(':').collect();
        parts.len() == 6
            && parts.iter().all(|p| {
                p.len() == 2
                    && p.chars()
                        .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
            })
    }
}

impl fmt::Display for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for HardwareId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HardwareId::new(s)
    }
}

/// Text holding at most `N` characters.
///
/// Input longer than the capacity is cut at exactly `N` characters. There is
/// no error path: truncation is the defined behavior.
///
/// # Examples
///
/// ```
/// use fingergate_core::BoundedText;
///
/// let text = BoundedText::<4>::truncating("Alice");
/// assert_eq!(text.as_str(), "Alic");
/// assert_eq!(text.char_len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BoundedText<const N: usize>(String);

impl<const N: usize> BoundedText<N> {
    /// Maximum number of characters held.
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self(String::new())
    }

    /// Build from `text`, keeping at most `N` characters.
    pub fn truncating(text: &str) -> Self {
        Self(text.chars().take(N).collect())
    }

    /// Append one character.
    ///
    /// Returns `false` and leaves the text unchanged when it is already full.
    pub fn push(&mut self, c: char) -> bool {
        if self.is_full() {
            return false;
        }
        self.0.push(c);
        true
    }

    pub fn is_full(&self) -> bool {
        self.char_len() >= N
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> fmt::Display for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const N: usize> AsRef<str> for BoundedText<N> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Text field of a server decision.
pub type DecisionText = BoundedText<MAX_DECISION_FIELD_CHARS>;

/// The server's verdict for one enrollment/verification request.
///
/// Fields absent from the response keep their defaults: `success = false`
/// and empty strings. `verdict_present` records whether the `success` field
/// was found at all, so callers can tell a real denial from a response that
/// carried no verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerDecision {
    pub success: bool,
    pub message: DecisionText,
    pub subject_name: DecisionText,
    pub verdict_present: bool,
}

impl ServerDecision {
    pub fn new(success: bool, message: &str, subject_name: &str) -> Self {
        Self {
            success,
            message: DecisionText::truncating(message),
            subject_name: DecisionText::truncating(subject_name),
            verdict_present: true,
        }
    }

    /// Whether access should be granted.
    pub fn is_granted(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    #[case(FingerType::Thumb, "THUMB")]
    #[case(FingerType::Index, "INDEX")]
    #[case(FingerType::Middle, "MIDDLE")]
    fn test_finger_type_text(#[case] finger: FingerType, #[case] text: &str) {
        assert_eq!(finger.as_str(), text);
        assert_eq!(finger.to_string(), text);
        assert_eq!(text.parse::<FingerType>().unwrap(), finger);
    }

    #[rstest]
    #[case("thumb")]
    #[case("RING")]
    #[case("")]
    fn test_finger_type_unknown(#[case] input: &str) {
        assert!(matches!(
            input.parse::<FingerType>(),
            Err(Error::UnknownFingerType(_))
        ));
    }

    #[test]
    fn test_finger_type_serde_uses_canonical_text() {
        let json = serde_json::to_string(&FingerType::Middle).unwrap();
        assert_eq!(json, "\"MIDDLE\"");
    }

    #[test]
    fn test_finger_type_random_covers_all_values() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(FingerType::random(&mut rng));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_finger_type_random_is_reproducible_with_seed() {
        let a: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(9);
            (0..10).map(|_| FingerType::random(&mut rng)).collect()
        };
        let b: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(9);
            (0..10).map(|_| FingerType::random(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    #[rstest]
    #[case("00:1A:2B:3C:4D:5E", true)]
    #[case("12345", false)]
    #[case("00:1a:2b:3c:4d:5e", false)]
    fn test_hardware_id_mac_format(#[case] input: &str, #[case] is_mac: bool) {
        let id = HardwareId::new(input).unwrap();
        assert_eq!(id.is_mac_formatted(), is_mac);
    }

    #[rstest]
    #[case("")]
    #[case("has space")]
    #[case("tab\there")]
    fn test_hardware_id_invalid(#[case] input: &str) {
        assert!(HardwareId::new(input).is_err());
    }

    #[test]
    fn test_bounded_text_push_stops_at_capacity() {
        let mut text = BoundedText::<3>::new();
        assert!(text.push('a'));
        assert!(text.push('b'));
        assert!(text.push('c'));
        assert!(!text.push('d'));
        assert_eq!(text.as_str(), "abc");
        assert!(text.is_full());
    }

    #[test]
    fn test_bounded_text_counts_characters_not_bytes() {
        let text = BoundedText::<3>::truncating("żółw");
        assert_eq!(text.as_str(), "żół");
    }

    #[test]
    fn test_server_decision_default_denies() {
        let decision = ServerDecision::default();
        assert!(!decision.is_granted());
        assert!(decision.message.is_empty());
        assert!(decision.subject_name.is_empty());
        assert!(!decision.verdict_present);
    }

    proptest! {
        #[test]
        fn prop_bounded_text_never_exceeds_capacity(s in ".{0,600}") {
            let text = DecisionText::truncating(&s);
            prop_assert!(text.char_len() <= MAX_DECISION_FIELD_CHARS);
            prop_assert!(s.starts_with(text.as_str()));
        }
    }
}
