//! [`Content`] and [`Part`] types shared by [`Request`]s and [`Response`]s.
//!
//! [`Request`]: crate::Request
//! [`Response`]: crate::Response

use serde::{Deserialize, Serialize};

/// Role of the [`Content`] author.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// From the user.
    User,
    /// From the model.
    Model,
}

impl Role {
    /// Get the string representation of the role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a conversation: who wrote it and the [`Part`]s it is made of.
///
/// The service omits `parts` for candidates that were blocked before any
/// output, so both fields default when missing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct Content {
    /// Author. Not set for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// The fragments of this turn.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// User [`Content`] with a single text [`Part`].
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some(Role::User),
            parts: vec![Part::text(text)],
        }
    }

    /// Role-less [`Content`] with a single text [`Part`], as used for system
    /// instructions.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Returns true if there are no [`Part`]s.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Concatenated text of all [`Part`]s. Fails on the first part that is
    /// not text, such as a function call.
    pub fn text(&self) -> Result<String, NotText> {
        self.parts
            .iter()
            .map(|part| part.as_text().ok_or_else(|| NotText::from(part)))
            .collect()
    }
}

/// Error for a [`Part`] that can't be converted to text.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("Could not convert `part.{kind}` to text.")]
pub struct NotText {
    /// Which field the part holds instead, for example `function_call`.
    pub kind: &'static str,
}

impl From<&Part> for NotText {
    fn from(part: &Part) -> Self {
        let kind = if part.function_call.is_some() {
            "function_call"
        } else if part.inline_data.is_some() {
            "inline_data"
        } else {
            "empty"
        };

        Self { kind }
    }
}

/// A fragment of [`Content`]. Exactly one field is normally set. A struct of
/// options is used rather than an enum because the service adds fields (like
/// `thought`) next to the data.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline media, base64 encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    /// A function call predicted by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Set on parts that are model reasoning rather than the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// A text [`Part`].
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// The text, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl From<&str> for Part {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Part {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

/// Inline media.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// MIME type, such as `image/png`.
    pub mime_type: String,
    /// Base64 encoded bytes.
    pub data: String,
}

/// A function call predicted by the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Arguments as a JSON object.
    #[serde(default)]
    pub args: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_content_serialize() {
        let json = serde_json::to_string(&Content::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","parts":[{"text":"hi"}]}"#);
    }

    #[test]
    fn test_content_deserialize_without_parts() {
        let content: Content = serde_json::from_str(r#"{"role":"model"}"#)
            .unwrap();
        assert_eq!(content.role, Some(Role::Model));
        assert!(content.is_empty());
    }

    #[test]
    fn test_text_concatenates_parts() {
        let content = Content {
            role: Some(Role::Model),
            parts: vec!["Hello".into(), ", world!".into()],
        };
        assert_eq!(content.text().unwrap(), "Hello, world!");
    }

    #[test]
    fn test_text_rejects_other_parts() {
        let content: Content = serde_json::from_str(
            r#"{
                "role": "model",
                "parts": [
                    {"text": "Hello"},
                    {"functionCall": {"name": "f", "args": {}}},
                    {"text": ", world!"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(content.parts.len(), 3);
        assert_eq!(content.parts[1].function_call.as_ref().unwrap().name, "f");

        let err = content.text().unwrap_err();
        assert_eq!(err, NotText { kind: "function_call" });
        assert_eq!(
            err.to_string(),
            "Could not convert `part.function_call` to text."
        );

        let image = Part {
            inline_data: Some(Blob {
                mime_type: "image/png".into(),
                data: "AAAA".into(),
            }),
            ..Default::default()
        };
        assert_eq!(NotText::from(&image).kind, "inline_data");
        assert_eq!(NotText::from(&Part::default()).kind, "empty");
    }

    #[test]
    fn test_part_unknown_fields_ignored() {
        let part: Part =
            serde_json::from_str(r#"{"text":"x","thoughtSignature":"abc"}"#)
                .unwrap();
        assert_eq!(part, Part::text("x"));
    }
}
