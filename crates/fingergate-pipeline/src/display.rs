//! Text layout for the two-line door display.
//!
//! The LCD has a fixed number of columns and no wrapping, so every line is
//! cleaned of control characters, cut to the display width, and padded with
//! spaces to overwrite what was shown before.

use fingergate_core::FingerType;
use fingergate_hardware::SensorErrorCode;

pub const PROMPT_TEXT: &str = "Put finger:";
pub const LOCAL_FAILURE_TEXT: &str = "Error, try again";
pub const TRANSPORT_FAILURE_TEXT: &str = "Server error";
pub const FAULT_TEXT: &str = "Scanner fault";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Both lines of the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub top: String,
    pub bottom: String,
}

impl Screen {
    fn new(top: &str, bottom: &str, width: usize) -> Self {
        Self {
            top: fit_line(top, width),
            bottom: fit_line(bottom, width),
        }
    }

    /// Prompt for the finger chosen for this cycle.
    pub fn prompt(finger: FingerType, width: usize) -> Self {
        Self::new(PROMPT_TEXT, finger.as_str(), width)
    }

    /// Greeting after a grant.
    pub fn granted(prefix: &str, subject: &str, width: usize) -> Self {
        Self::new(&compose_greeting(prefix, subject, width), "", width)
    }

    pub fn denied(message: &str, width: usize) -> Self {
        Self::new(message, "", width)
    }

    /// Capture went wrong but will be retried.
    pub fn sensor_retry(finger: FingerType, code: SensorErrorCode, width: usize) -> Self {
        Self::new(finger.as_str(), &code.display_text(), width)
    }

    /// Scanner is unusable.
    pub fn sensor_fault(code: SensorErrorCode, width: usize) -> Self {
        Self::new(FAULT_TEXT, &code.display_text(), width)
    }

    pub fn local_failure(width: usize) -> Self {
        Self::new(LOCAL_FAILURE_TEXT, "", width)
    }

    pub fn transport_failure(width: usize) -> Self {
        Self::new(TRANSPORT_FAILURE_TEXT, LOCAL_FAILURE_TEXT, width)
    }
}

/// `prefix` followed by the subject's name, cut to `width` characters.
///
/// # Examples
///
/// ```
/// use fingergate_pipeline::compose_greeting;
///
/// assert_eq!(compose_greeting("Hello ", "Bob", 16), "Hello Bob");
/// assert_eq!(compose_greeting("Hello ", "Bartholomew Smith", 16), "Hello Bartholome");
/// ```
pub fn compose_greeting(prefix: &str, subject: &str, width: usize) -> String {
    let greeting = format!("{}{}", prefix, sanitize_text(subject));
    truncate_text(&greeting, width)
}

/// Clean, cut and left-align `text` to exactly `width` characters.
pub fn fit_line(text: &str, width: usize) -> String {
    align_text(&sanitize_text(text), width, Alignment::Left)
}

/// Truncate text to a maximum number of characters.
///
/// # Examples
///
/// ```
/// use fingergate_pipeline::truncate_text;
///
/// assert_eq!(truncate_text("Access denied", 6), "Access");
/// assert_eq!(truncate_text("Short", 10), "Short");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Align text within a fixed width, padding with spaces.
///
/// # Examples
///
/// ```
/// use fingergate_pipeline::{align_text, Alignment};
///
/// assert_eq!(align_text("INDEX", 10, Alignment::Left), "INDEX     ");
/// assert_eq!(align_text("INDEX", 10, Alignment::Center), "  INDEX   ");
/// assert_eq!(align_text("INDEX", 10, Alignment::Right), "     INDEX");
/// ```
pub fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let char_count = text.chars().count();

    if char_count >= width {
        return truncate_text(text, width);
    }

    let padding = width - char_count;

    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
        }
    }
}

/// Drop control characters. Names come from the server and may carry
/// anything.
fn sanitize_text(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hello ", "Bob", "Hello Bob")]
    #[case("Hello ", "", "Hello ")]
    #[case("Hello ", "Bartholomew Smith", "Hello Bartholome")]
    #[case("Hello ", "Ann\r\nMarie", "Hello AnnMarie")]
    #[case("Witaj ", "Zażółć Gęślą", "Witaj Zażółć Gęś")]
    fn test_compose_greeting(#[case] prefix: &str, #[case] name: &str, #[case] expected: &str) {
        let greeting = compose_greeting(prefix, name, 16);
        assert_eq!(greeting, expected);
        assert!(greeting.chars().count() <= 16);
    }

    #[test]
    fn test_fit_line_pads_to_width() {
        assert_eq!(fit_line("THUMB", 8), "THUMB   ");
        assert_eq!(fit_line("- Movable finger -", 16), "- Movable finger");
    }

    #[test]
    fn test_prompt_screen() {
        let screen = Screen::prompt(FingerType::Middle, 16);
        assert_eq!(screen.top, "Put finger:     ");
        assert_eq!(screen.bottom, "MIDDLE          ");
    }

    #[test]
    fn test_fault_screen() {
        let screen = Screen::sensor_fault(SensorErrorCode::FirmwareIncompatible, 16);
        assert_eq!(screen.top.trim_end(), FAULT_TEXT);
        assert_eq!(screen.bottom, "- Incompatible f");
    }

    #[test]
    fn test_denied_screen_clears_second_line() {
        let screen = Screen::denied("Access denied", 16);
        assert_eq!(screen.top, "Access denied   ");
        assert_eq!(screen.bottom, " ".repeat(16));
    }

    #[rstest]
    #[case(Alignment::Left, "AB  ")]
    #[case(Alignment::Center, " AB ")]
    #[case(Alignment::Right, "  AB")]
    fn test_align_text(#[case] alignment: Alignment, #[case] expected: &str) {
        assert_eq!(align_text("AB", 4, alignment), expected);
    }
}
