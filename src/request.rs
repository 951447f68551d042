//! [`Request`] types for the `generateContent` method.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::{response::HarmCategory, Content};

/// Request body for `models/{model}:generateContent`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// The conversation so far. A single [`User`] turn for one-shot use.
    ///
    /// [`User`]: crate::content::Role::User
    pub contents: Vec<Content>,
    /// System instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Safety thresholds. Empty means the service defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
    /// Sampling and length settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Sampling and length settings. Unset fields use the model's defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature for sampling. Higher values mean more randomness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top P nucleus sampling. The probabilities of each token are added in
    /// order from most to least likely until the probability mass exceeds
    /// `top_p`. A token is then sampled from this reduced distribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top K tokens to consider for each token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<NonZeroU32>,
    /// Number of candidates to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<NonZeroU32>,
    /// Max tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<NonZeroU32>,
    /// If the model generates any of these sequences, generation stops with
    /// [`FinishReason::Stop`].
    ///
    /// [`FinishReason::Stop`]: crate::response::FinishReason::Stop
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl GenerationConfig {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.top_p.is_none()
            && self.top_k.is_none()
            && self.candidate_count.is_none()
            && self.max_output_tokens.is_none()
            && self.stop_sequences.is_empty()
    }
}

/// Safety threshold for one [`HarmCategory`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetySetting {
    /// Category the threshold applies to.
    pub category: HarmCategory,
    /// Block at and above this probability.
    pub threshold: HarmBlockThreshold,
}

/// Probability at and above which content is blocked.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    /// Service default.
    #[serde(rename = "HARM_BLOCK_THRESHOLD_UNSPECIFIED")]
    Unspecified,
    /// Block low probability and above.
    BlockLowAndAbove,
    /// Block medium probability and above.
    BlockMediumAndAbove,
    /// Block only high probability.
    BlockOnlyHigh,
    /// Block nothing.
    BlockNone,
    /// Turn the safety filter off.
    Off,
}
