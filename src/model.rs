//! [`Model`] to use for inference and the [`GenerativeModel`] handle that binds
//! a [`Model`] and its generation settings to a [`Client`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    client,
    request::{GenerationConfig, SafetySetting},
    Client, Content, Request, Response,
};

/// Model to use for inference. Known model ids parse to named variants. Any
/// other well-formed id is kept as [`Model::Custom`] so new models can be used
/// without a new release of this crate.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Model {
    /// Gemini 1.5 Pro (latest). This is the default model.
    #[default]
    Gemini15ProLatest,
    /// Gemini 1.5 Pro (stable)
    Gemini15Pro,
    /// Gemini 1.5 Flash (latest)
    Gemini15FlashLatest,
    /// Gemini 1.5 Flash (stable)
    Gemini15Flash,
    /// Gemini 1.5 Flash 8B
    Gemini15Flash8B,
    /// Gemini 2.0 Flash
    Gemini20Flash,
    /// Gemini 2.0 Flash Lite
    Gemini20FlashLite,
    /// Gemini 2.5 Pro
    Gemini25Pro,
    /// Gemini 2.5 Flash
    Gemini25Flash,
    /// Any other model id, without the `models/` prefix.
    Custom(String),
}

/// Error for a model id that can't name a model.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidModel {
    /// The id is empty (or just `models/`).
    #[error("model name is empty")]
    Empty,
    /// The id contains a character that can't appear in a model resource
    /// name.
    #[error("invalid character {found:?} in model name `{id}`")]
    Malformed {
        /// The rejected id.
        id: String,
        /// The first bad character.
        found: char,
    },
}

impl Model {
    /// Resource prefix accepted (and stripped) when parsing.
    pub const PREFIX: &'static str = "models/";

    /// Get the model id as sent to the API.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini15ProLatest => "gemini-1.5-pro-latest",
            Self::Gemini15Pro => "gemini-1.5-pro",
            Self::Gemini15FlashLatest => "gemini-1.5-flash-latest",
            Self::Gemini15Flash => "gemini-1.5-flash",
            Self::Gemini15Flash8B => "gemini-1.5-flash-8b",
            Self::Gemini20Flash => "gemini-2.0-flash",
            Self::Gemini20FlashLite => "gemini-2.0-flash-lite",
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Custom(id) => id,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = InvalidModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        if id.is_empty() {
            return Err(InvalidModel::Empty);
        }

        if let Some(found) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_')))
        {
            return Err(InvalidModel::Malformed {
                id: s.to_string(),
                found,
            });
        }

        Ok(match id {
            "gemini-1.5-pro-latest" => Self::Gemini15ProLatest,
            "gemini-1.5-pro" => Self::Gemini15Pro,
            "gemini-1.5-flash-latest" => Self::Gemini15FlashLatest,
            "gemini-1.5-flash" => Self::Gemini15Flash,
            "gemini-1.5-flash-8b" => Self::Gemini15Flash8B,
            "gemini-2.0-flash" => Self::Gemini20Flash,
            "gemini-2.0-flash-lite" => Self::Gemini20FlashLite,
            "gemini-2.5-pro" => Self::Gemini25Pro,
            "gemini-2.5-flash" => Self::Gemini25Flash,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl TryFrom<String> for Model {
    type Error = InvalidModel;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        match model {
            Model::Custom(id) => id,
            known => known.as_str().to_string(),
        }
    }
}

/// A [`Model`] bound to a [`Client`] together with the settings sent with
/// every request. Create one with [`Client::model`] or [`Self::new`].
#[derive(Debug, Clone)]
pub struct GenerativeModel {
    client: Client,
    /// The model requests go to.
    pub model: Model,
    /// Sampling and length settings.
    pub generation_config: Option<GenerationConfig>,
    /// Safety thresholds. Empty means the service defaults.
    pub safety_settings: Vec<SafetySetting>,
    /// System instruction, if any.
    pub system_instruction: Option<Content>,
}

impl GenerativeModel {
    /// Create a handle for the model named `id`. `id` may carry the `models/`
    /// prefix.
    pub fn new(client: Client, id: &str) -> Result<Self, InvalidModel> {
        let model = id.parse()?;

        #[cfg(feature = "log")]
        log::debug!("Model handle created for `{}`", model);

        Ok(Self {
            client,
            model,
            generation_config: None,
            safety_settings: Vec::new(),
            system_instruction: None,
        })
    }

    /// Set the [`GenerationConfig`].
    pub fn generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    /// Set the [`SafetySetting`]s.
    pub fn safety_settings(
        mut self,
        settings: impl IntoIterator<Item = SafetySetting>,
    ) -> Self {
        self.safety_settings = settings.into_iter().collect();
        self
    }

    /// Set the system instruction.
    pub fn system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::system(text));
        self
    }

    /// The [`Client`] requests are sent with.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Build a single-turn [`Request`] for `prompt` with this model's
    /// settings.
    pub fn request(&self, prompt: impl Into<String>) -> Request {
        Request {
            contents: vec![Content::user(prompt)],
            system_instruction: self.system_instruction.clone(),
            safety_settings: self.safety_settings.clone(),
            generation_config: self.generation_config.clone(),
        }
    }

    /// Send `prompt` to the model and wait for the whole [`Response`].
    pub async fn generate_content(
        &self,
        prompt: impl Into<String>,
    ) -> client::Result<Response> {
        let request = self.request(prompt);
        self.client.generate_content(&self.model, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        assert_eq!(
            "gemini-1.5-pro-latest".parse::<Model>().unwrap(),
            Model::Gemini15ProLatest
        );
        assert_eq!(
            "models/gemini-2.0-flash".parse::<Model>().unwrap(),
            Model::Gemini20Flash
        );
        assert_eq!(Model::default().as_str(), "gemini-1.5-pro-latest");
    }

    #[test]
    fn test_parse_custom() {
        let model: Model = "gemini-exp-1206".parse().unwrap();
        assert_eq!(model, Model::Custom("gemini-exp-1206".into()));
        assert_eq!(model.to_string(), "gemini-exp-1206");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!("".parse::<Model>(), Err(InvalidModel::Empty));
        assert_eq!("models/".parse::<Model>(), Err(InvalidModel::Empty));

        let err = "gemini pro".parse::<Model>().unwrap_err();
        assert_eq!(
            err,
            InvalidModel::Malformed {
                id: "gemini pro".into(),
                found: ' '
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid character ' ' in model name `gemini pro`"
        );

        // A slash would change the request path.
        assert!("tunedModels/foo".parse::<Model>().is_err());
    }

    #[test]
    fn test_serde() {
        assert_eq!(
            serde_json::to_string(&Model::Gemini15Flash).unwrap(),
            r#""gemini-1.5-flash""#
        );
        let model: Model = serde_json::from_str(r#""gemini-2.5-pro""#).unwrap();
        assert_eq!(model, Model::Gemini25Pro);
        assert!(serde_json::from_str::<Model>(r#""a/b""#).is_err());
    }

    #[test]
    fn test_request() {
        let client = Client::new("AIzaSyFake".to_string()).unwrap();
        let model = client
            .model("gemini-1.5-flash")
            .unwrap()
            .system_instruction("Be brief.")
            .generation_config(GenerationConfig {
                temperature: Some(0.5),
                ..Default::default()
            });

        let json = serde_json::to_value(model.request("hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "systemInstruction": {"parts": [{"text": "Be brief."}]},
                "generationConfig": {"temperature": 0.5},
            })
        );
    }
}
