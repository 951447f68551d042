use serde::{Deserialize, Serialize};

use crate::{response::SafetyRating, Content};

/// One alternative completion for a prompt.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated [`Content`]. Missing when the candidate was blocked before
    /// producing anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Why generation stopped. Missing while a candidate is still being
    /// generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Safety ratings for this candidate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<SafetyRating>,
    /// Index of the candidate in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl Candidate {
    /// The [`Content`] parts. Empty if there is no content.
    pub fn parts(&self) -> &[crate::Part] {
        self.content
            .as_ref()
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// The finish reason, [`FinishReason::Unspecified`] if missing.
    pub fn finish_reason(&self) -> FinishReason {
        self.finish_reason.unwrap_or_default()
    }
}

/// Reason the model stopped generating tokens. Displayed by its wire name.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[derive(derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stopping point or a stop sequence.
    #[display("STOP")]
    Stop,
    /// Maximum tokens reached.
    #[display("MAX_TOKENS")]
    MaxTokens,
    /// Flagged for safety reasons.
    #[display("SAFETY")]
    Safety,
    /// Flagged for recitation.
    #[display("RECITATION")]
    Recitation,
    /// Unsupported language.
    #[display("LANGUAGE")]
    Language,
    /// Other reason.
    #[display("OTHER")]
    Other,
    /// Contains forbidden terms.
    #[display("BLOCKLIST")]
    Blocklist,
    /// Potentially prohibited content.
    #[display("PROHIBITED_CONTENT")]
    ProhibitedContent,
    /// Potentially sensitive personally identifiable information.
    #[display("SPII")]
    Spii,
    /// Invalid function call generated.
    #[display("MALFORMED_FUNCTION_CALL")]
    MalformedFunctionCall,
    /// Not set, or a value this crate does not know yet.
    #[default]
    #[serde(rename = "FINISH_REASON_UNSPECIFIED", other)]
    #[display("FINISH_REASON_UNSPECIFIED")]
    Unspecified,
}
