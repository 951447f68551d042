#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! `gemini_relay` sends a prompt to the [Gemini API] and prints the reply.
//!
//! The library side is a small client: create a [`Client`] with your API key
//! (or [`Client::from_env`]), get a [`GenerativeModel`] with [`Client::model`]
//! and call [`GenerativeModel::generate_content`]. The API will return a
//! [`Response`] with zero or more [`response::Candidate`]s.
//!
//! The [`relay`] module drives the one-shot interactive flow used by the
//! `gemini-relay` binary.
//!
//! [Gemini API]: <https://ai.google.dev/api/generate-content>

pub mod key;
pub use key::Key;

pub mod client;
pub use client::Client;

pub mod model;
pub use model::{GenerativeModel, Model};

pub mod content;
pub use content::{Content, NotText, Part};

pub mod request;
pub use request::Request;

pub mod response;
pub use response::{Response, TextError};

pub mod relay;
pub use relay::Relay;

/// Re-exports of commonly used crates to avoid version conflicts and reduce
/// dependency bloat.
pub mod exports {
    #[cfg(feature = "log")]
    pub use log;
    #[cfg(feature = "memsecurity")]
    pub use memsecurity;
    pub use reqwest;
    pub use serde;
    pub use serde_json;
}
