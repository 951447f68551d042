//! [`Response`] types for the `generateContent` method.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::NotText;

pub(crate) mod candidate;
pub use candidate::{Candidate, FinishReason};

/// Successful reply from `generateContent`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Completions. Empty if the prompt itself was blocked.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Feedback about the prompt, for example why it was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
    /// Token counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    /// Model version that generated the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl Response {
    /// The first [`Candidate`], if any.
    pub fn candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Returns true if the first [`Candidate`] has at least one [`Part`].
    ///
    /// [`Part`]: crate::Part
    pub fn has_content(&self) -> bool {
        self.candidate().is_some_and(|c| !c.parts().is_empty())
    }

    /// Concatenated text of the first [`Candidate`]'s parts. Fails if there
    /// is nothing to concatenate (see [`Self::has_content`]) or a part is not
    /// text.
    pub fn text(&self) -> Result<String, TextError> {
        let candidate = self.candidate().ok_or(TextError::NoCandidates)?;
        match &candidate.content {
            Some(content) if !content.is_empty() => Ok(content.text()?),
            _ => Err(TextError::NoParts),
        }
    }

    /// [`PromptFeedback`] or an empty one. This is what is displayed when
    /// there is no content.
    pub fn prompt_feedback(&self) -> PromptFeedback {
        self.prompt_feedback.clone().unwrap_or_default()
    }
}

/// Error for a [`Response`] that has no text.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// There are no [`Candidate`]s.
    #[error("The response has no candidates.")]
    NoCandidates,
    /// The first [`Candidate`] has no content parts.
    #[error("The candidate has no content parts.")]
    NoParts,
    /// A part is not text.
    #[error(transparent)]
    NotText(#[from] NotText),
}

/// Feedback about the prompt.
///
/// [`Display`]s in protobuf text format, for example:
/// ```text
/// block_reason: SAFETY
/// safety_ratings {
///   category: HARM_CATEGORY_HARASSMENT
///   probability: HIGH
///   blocked: true
/// }
/// ```
/// The `blocked` line is only present on ratings that caused the block.
/// An empty feedback displays as an empty string.
///
/// [`Display`]: std::fmt::Display
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set if the prompt was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<BlockReason>,
    /// Safety ratings for the prompt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<SafetyRating>,
}

impl fmt::Display for PromptFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(reason) = &self.block_reason {
            write!(f, "block_reason: {}", reason)?;
            sep = "\n";
        }

        for rating in &self.safety_ratings {
            write!(
                f,
                "{sep}safety_ratings {{\n  category: {}\n  probability: {}\n",
                rating.category, rating.probability
            )?;
            if rating.blocked {
                f.write_str("  blocked: true\n")?;
            }
            f.write_str("}")?;
            sep = "\n";
        }

        Ok(())
    }
}

/// Why a prompt was blocked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[derive(derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockReason {
    /// Blocked for safety reasons.
    #[display("SAFETY")]
    Safety,
    /// Blocked for other reasons.
    #[display("OTHER")]
    Other,
    /// Contains terms from the terminology blocklist.
    #[display("BLOCKLIST")]
    Blocklist,
    /// Prohibited content.
    #[display("PROHIBITED_CONTENT")]
    ProhibitedContent,
    /// Unsafe image generation content.
    #[display("IMAGE_SAFETY")]
    ImageSafety,
    /// Not set, or a value this crate does not know yet.
    #[serde(rename = "BLOCK_REASON_UNSPECIFIED", other)]
    #[display("BLOCK_REASON_UNSPECIFIED")]
    Unspecified,
}

/// Safety rating for one [`HarmCategory`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct SafetyRating {
    /// The category.
    pub category: HarmCategory,
    /// How likely the content is harmful in this category.
    pub probability: HarmProbability,
    /// Set if this rating caused the block.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
}

/// Harm category for [`SafetyRating`]s and [`SafetySetting`]s.
///
/// [`SafetySetting`]: crate::request::SafetySetting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[derive(derive_more::Display)]
pub enum HarmCategory {
    /// Harassment.
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    #[display("HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech.
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    #[display("HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    /// Sexually explicit content.
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    #[display("HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    /// Dangerous content.
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    #[display("HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    /// Civic integrity.
    #[serde(rename = "HARM_CATEGORY_CIVIC_INTEGRITY")]
    #[display("HARM_CATEGORY_CIVIC_INTEGRITY")]
    CivicIntegrity,
    /// Not set, or a category this crate does not know yet.
    #[serde(rename = "HARM_CATEGORY_UNSPECIFIED", other)]
    #[display("HARM_CATEGORY_UNSPECIFIED")]
    Unspecified,
}

/// Probability that content is harmful.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[derive(derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmProbability {
    /// Negligible.
    #[display("NEGLIGIBLE")]
    Negligible,
    /// Low.
    #[display("LOW")]
    Low,
    /// Medium.
    #[display("MEDIUM")]
    Medium,
    /// High.
    #[display("HIGH")]
    High,
    /// Not set, or a value this crate does not know yet.
    #[serde(rename = "HARM_PROBABILITY_UNSPECIFIED", other)]
    #[display("HARM_PROBABILITY_UNSPECIFIED")]
    Unspecified,
}

/// Token counts for a request.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Tokens across all candidates.
    #[serde(default)]
    pub candidates_token_count: u32,
    /// Total tokens, including any reasoning.
    #[serde(default)]
    pub total_token_count: u32,
}
