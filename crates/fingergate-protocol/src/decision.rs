//! Server decision parsing.
//!
//! # Marker scan rules
//!
//! - `"success":` may be followed by spaces or tabs; the verdict is `true`
//!   only if the literal `true` comes next.
//! - `"message":"` and `"nameOfUser":"` must appear exactly like that, with
//!   no whitespace around the colon. The value is copied up to the first `"`
//!   or 255 characters, whichever comes first. Escape sequences are not
//!   interpreted, so `\"` ends the value at the quote.
//! - Each marker is searched independently from the start of the payload.
//!   Order and surrounding structure are ignored.
//! - A missing marker leaves the field at its default.

use fingergate_core::{DecisionText, ServerDecision};

const SUCCESS_MARKER: &str = "\"success\":";
const MESSAGE_MARKER: &str = "\"message\":\"";
const NAME_MARKER: &str = "\"nameOfUser\":\"";

/// Turns a raw response body into a decision.
///
/// Implementations never fail: anything they cannot read leaves the
/// corresponding field at its default, and the default denies access.
pub trait DecisionParser: Send + Sync {
    fn parse(&self, raw: &str) -> ServerDecision;
}

/// Textual marker scanner. The default parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerScanParser;

impl DecisionParser for MarkerScanParser {
    fn parse(&self, raw: &str) -> ServerDecision {
        parse_decision(raw)
    }
}

/// Scan `raw` with the marker rules described at module level.
///
/// # Examples
///
/// ```
/// use fingergate_protocol::parse_decision;
///
/// let decision = parse_decision(r#"{"success":true,"message":"ok","nameOfUser":"Alice"}"#);
/// assert!(decision.success);
/// assert_eq!(decision.message.as_str(), "ok");
/// assert_eq!(decision.subject_name.as_str(), "Alice");
/// ```
pub fn parse_decision(raw: &str) -> ServerDecision {
    let mut decision = ServerDecision::default();

    if let Some(rest) = after_marker(raw, SUCCESS_MARKER) {
        decision.verdict_present = true;
        decision.success = rest
            .trim_start_matches(|c: char| c == ' ' || c == '\t')
            .starts_with("true");
    }
    if let Some(rest) = after_marker(raw, MESSAGE_MARKER) {
        decision.message = copy_until_quote(rest);
    }
    if let Some(rest) = after_marker(raw, NAME_MARKER) {
        decision.subject_name = copy_until_quote(rest);
    }

    decision
}

fn after_marker<'a>(raw: &'a str, marker: &str) -> Option<&'a str> {
    raw.find(marker).map(|at| &raw[at + marker.len()..])
}

fn copy_until_quote(rest: &str) -> DecisionText {
    let mut text = DecisionText::new();
    for c in rest.chars() {
        if c == '"' || !text.push(c) {
            break;
        }
    }
    text
}
