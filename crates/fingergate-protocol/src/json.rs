//! `serde_json` backed decision parser.

use crate::decision::DecisionParser;
use fingergate_core::{DecisionText, ServerDecision};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct DecisionBody {
    success: Option<bool>,
    message: Option<String>,
    #[serde(rename = "nameOfUser")]
    name_of_user: Option<String>,
}

/// Parses the response as a JSON object.
///
/// Unlike [`MarkerScanParser`](crate::MarkerScanParser) it understands
/// escapes and whitespace, and only reads top-level fields. A body that is not
/// a JSON object with these field types yields the default decision. Text
/// fields are cut to 255 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecisionParser;

impl DecisionParser for JsonDecisionParser {
    fn parse(&self, raw: &str) -> ServerDecision {
        let body: DecisionBody = match serde_json::from_str(raw) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "response is not a decision object");
                return ServerDecision::default();
            }
        };

        ServerDecision {
            success: body.success.unwrap_or(false),
            message: DecisionText::truncating(body.message.as_deref().unwrap_or_default()),
            subject_name: DecisionText::truncating(
                body.name_of_user.as_deref().unwrap_or_default(),
            ),
            verdict_present: body.success.is_some(),
        }
    }
}
