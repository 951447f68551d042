//! [`Key`] is a wrapper around a Google Generative Language API key.

#[cfg(feature = "memsecurity")]
mod encrypted;
#[cfg(feature = "memsecurity")]
pub use encrypted::Key;
#[cfg(not(feature = "memsecurity"))]
mod unencrypted;
#[cfg(not(feature = "memsecurity"))]
pub use unencrypted::Key;

/// Environment variables checked by [`from_env`], in order.
pub const ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Error for when a key can't be used as a key.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidKey {
    /// The key is empty.
    #[error("API key is empty")]
    Empty,
    /// The key contains a byte that is not printable ASCII. This is usually
    /// trailing whitespace from a file or a copy-paste.
    #[error("API key contains an invalid byte at position {position}")]
    Malformed {
        /// Byte offset of the first bad byte.
        position: usize,
    },
}

/// Error for when a [`Key`] can't be loaded from the environment.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EnvError {
    /// None of [`ENV_VARS`] are set.
    #[error("API key not found. Set one of: {}", ENV_VARS.join(", "))]
    Missing,
    /// A variable was set but the value is not usable.
    #[error("API key from `{var}` is invalid: {error}")]
    Invalid {
        /// Name of the variable.
        var: &'static str,
        /// What's wrong with it.
        error: InvalidKey,
    },
}

/// Check that `key` can be sent as an HTTP header value.
pub(crate) fn validate(key: &[u8]) -> Result<(), InvalidKey> {
    if key.is_empty() {
        return Err(InvalidKey::Empty);
    }

    match key.iter().position(|b| !b.is_ascii_graphic()) {
        Some(position) => Err(InvalidKey::Malformed { position }),
        None => Ok(()),
    }
}

/// Load a [`Key`] from the first of [`ENV_VARS`] that is set. The
/// intermediate [`String`] is consumed and zeroized.
pub fn from_env() -> Result<Key, EnvError> {
    for var in ENV_VARS {
        if let Ok(value) = std::env::var(var) {
            return Key::try_from(value)
                .map_err(|error| EnvError::Invalid { var, error });
        }
    }

    Err(EnvError::Missing)
}
