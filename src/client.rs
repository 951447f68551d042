//! [`Client`] for the Google Generative Language API and related types.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{key, model, GenerativeModel, Key, Model, Request, Response};

/// Result type for the client. See also [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Client for the Google Generative Language (Gemini) API.
///
/// See [`Self::new`] or [`Self::from_env`] for creating a new client and
/// [`Self::model`] to get a [`GenerativeModel`] handle.
#[derive(Clone, Debug)]
pub struct Client {
    /// Inner [`reqwest::Client`]. It is **not necessary** to set the API key on
    /// a custom client.
    ///
    /// ## Note:
    /// - The API [`Key`] is **set automatically on requests**. Set
    ///   [`Self::key`] to change the [`Key`].
    /// - **Do not use** `client.inner.post` directly. Use [`Self::post`]
    ///   instead to safely set the API [`Key`] as sensitive.
    pub inner: reqwest::Client,
    /// API [`Key`]. It can be set to a new [`Key`] to change the key used for
    /// requests.
    pub key: Arc<Key>,
    base_url: String,
    timeout: Option<Duration>,
}

impl Client {
    /// Our user agent.
    pub const USER_AGENT: &'static str =
        concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
    /// Default base URL. Methods are appended to this.
    pub const DEFAULT_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta";
    /// Header the API key is sent in.
    pub const KEY_HEADER: &'static str = "x-goog-api-key";

    /// Create a new client from any type that can be converted into a [`Key`].
    ///
    /// ## Note:
    /// - It's safest to use a [`String`]. If you use a [`&str`] you must
    ///   zeroize it after creating the client.
    pub fn new<K>(key: K) -> std::result::Result<Self, key::InvalidKey>
    where
        K: TryInto<Key, Error = key::InvalidKey>,
    {
        Ok(Self::from_key(key.try_into()?))
    }

    /// Create a new client with a [`Key`] from the environment. See
    /// [`key::from_env`].
    pub fn from_env() -> std::result::Result<Self, key::EnvError> {
        Ok(Self::from_key(key::from_env()?))
    }

    /// Create a new client with the given key.
    pub fn from_key(key: Key) -> Self {
        #[cfg(feature = "log")]
        {
            log::info!(concat!(
                "Creating ",
                env!("CARGO_PKG_NAME"),
                " client..."
            ));
            log::debug!(concat!("Crate version: ", env!("CARGO_PKG_VERSION")));
        }

        Self {
            inner: reqwest::Client::new(),
            key: Arc::new(key),
            base_url: Self::DEFAULT_URL.to_string(),
            timeout: None,
        }
    }

    /// Send requests to `url` instead of [`Self::DEFAULT_URL`]. This is useful
    /// for testing or for a proxy. A trailing `/` is ignored.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        self.base_url = url;
        self
    }

    /// Give up on requests after `timeout`. There is no timeout by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a [`GenerativeModel`] handle for the model named `id`.
    pub fn model(
        &self,
        id: &str,
    ) -> std::result::Result<GenerativeModel, model::InvalidModel> {
        GenerativeModel::new(self.clone(), id)
    }

    /// Create a [`reqwest::RequestBuilder`] with the API key set as a sensitive
    /// header value.
    pub fn request_raw<U>(
        &self,
        method: reqwest::Method,
        url: U,
    ) -> Result<reqwest::RequestBuilder>
    where
        U: reqwest::IntoUrl,
    {
        #[cfg(feature = "log")]
        log::debug!("{} request to {}", method, url.as_str());

        // Zeroized on drop
        let val = key_header(self.key.read().as_ref())?;

        let mut builder = self
            .inner
            .request(method, url)
            .header(reqwest::header::USER_AGENT, Self::USER_AGENT)
            .header(Self::KEY_HEADER, val);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder)
    }

    /// Send a POST request with the API key set as a sensitive header value
    /// and `body` as JSON.
    pub async fn post<U, B>(
        &self,
        url: U,
        body: &B,
    ) -> Result<reqwest::Response>
    where
        U: reqwest::IntoUrl,
        B: Serialize + ?Sized,
    {
        let req = self.request_raw(reqwest::Method::POST, url)?;

        #[cfg(feature = "log")]
        {
            if let Ok(json) = serde_json::to_string_pretty(body) {
                log::debug!("Sending body:\n{}", json);
            } else {
                log::warn!("Could not serialize body. Request will fail.");
            }
        }

        Ok(req.json(body).send().await?)
    }

    /// Call `generateContent` on `model` with `request` and wait for the whole
    /// [`Response`].
    ///
    /// Non-success replies are returned as [`Error::Api`] when the body is a
    /// Google error and [`Error::UnexpectedResponse`] otherwise.
    pub async fn generate_content(
        &self,
        model: &Model,
        request: &Request,
    ) -> Result<Response> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self.post(url, request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = match serde_json::from_str::<ApiErrorWrapper>(&body) {
                // Error was sucessfully parsed from the API.
                Ok(wrapper) => Error::Api(wrapper.error),
                Err(_) => Error::UnexpectedResponse {
                    status: status.as_u16(),
                    body,
                },
            };

            #[cfg(feature = "log")]
            log::warn!("generateContent failed: {}", error);

            return Err(error);
        }

        #[cfg(feature = "log")]
        log::debug!("Received body:\n{}", body);

        Ok(serde_json::from_str(&body)?)
    }
}

/// Sensitive header value for `key`. The key is checked first so a bad one
/// is reported with the offset of the offending byte.
fn key_header(key: &[u8]) -> Result<reqwest::header::HeaderValue> {
    key::validate(key)?;
    let mut val = reqwest::header::HeaderValue::from_bytes(key)?;
    val.set_sensitive(true);

    Ok(val)
}

/// [`Client`] error type.
#[derive(Debug, thiserror::Error, derive_more::IsVariant)]
pub enum Error {
    /// HTTP error.
    #[error("HTTP error: {0}")]
    HTTP(#[from] reqwest::Error),
    /// Data could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Error reported by the API.
    #[error("Google API error: {0}")]
    Api(#[from] ApiError),
    /// The key can't be sent in a header.
    #[error("Invalid API key: {0}")]
    Key(#[from] key::InvalidKey),
    /// The key is not a valid header value.
    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
    /// Non-success reply that is not a Google error, for example from a proxy.
    #[error("Unexpected response ({status}): {body}")]
    #[allow(missing_docs)]
    UnexpectedResponse { status: u16, body: String },
}

/// Error reported by the API. The [`Status`] is the canonical Google RPC
/// code and `code` the HTTP status.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[error("{status} ({code}): {message}")]
pub struct ApiError {
    /// HTTP status code.
    pub code: u16,
    /// Human readable message.
    pub message: String,
    /// Canonical status.
    #[serde(default)]
    pub status: Status,
}

/// Canonical Google RPC status of an [`ApiError`].
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Malformed request (400).
    #[display("INVALID_ARGUMENT")]
    InvalidArgument,
    /// The request can't be served, for example in an unsupported region
    /// (400).
    #[display("FAILED_PRECONDITION")]
    FailedPrecondition,
    /// Missing or invalid credential (401).
    #[display("UNAUTHENTICATED")]
    Unauthenticated,
    /// Key lacks permission (403).
    #[display("PERMISSION_DENIED")]
    PermissionDenied,
    /// Unknown model or resource (404).
    #[display("NOT_FOUND")]
    NotFound,
    /// Rate limit or quota (429).
    #[display("RESOURCE_EXHAUSTED")]
    ResourceExhausted,
    /// Server error (500).
    #[display("INTERNAL")]
    Internal,
    /// Overloaded or down (503).
    #[display("UNAVAILABLE")]
    Unavailable,
    /// Took too long (504).
    #[display("DEADLINE_EXCEEDED")]
    DeadlineExceeded,
    // Google can add more codes.
    /// Missing or unknown status.
    #[default]
    #[serde(other)]
    #[display("UNKNOWN")]
    Unknown,
}

// The API wraps errors in an `error` field.
#[derive(Deserialize)]
pub(crate) struct ApiErrorWrapper {
    pub(crate) error: ApiError,
}

static_assertions::assert_impl_all!(Client: Send, Sync, Clone);
