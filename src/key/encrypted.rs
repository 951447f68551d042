//! Encrypted [`Key`] management for Google API keys.

// TODO: Remove this dependency for wasm32 and find an alternative. This is
// the only thing that prevents this from building on wasm32.
use memsecurity::zeroize::Zeroizing;

use super::{validate, InvalidKey};

/// Stores a Google API key securely. The API key is encrypted in memory.
/// The object features a [`Display`] implementation that can be used to write
/// out the key. **Be sure to zeroize whatever you write it to**. Prefer
/// [`Key::read`] if you want a return value that will automatically zeroize
/// the key on drop.
///
/// [`Display`]: std::fmt::Display
pub struct Key {
    mem: memsecurity::EncryptedMem,
}

impl Key {
    /// Read the key. The key is zeroized on drop.
    pub fn read(&self) -> memsecurity::ZeroizeBytes {
        // Can only fail if decryption is broken, which is a catastrophic
        // failure.
        self.mem.decrypt().expect("in-memory key decryption failed")
    }
}

impl TryFrom<String> for Key {
    type Error = InvalidKey;

    /// Create a new key from a string securely. The string is zeroized after
    /// conversion.
    fn try_from(s: String) -> Result<Self, Self::Error> {
        // This just unwraps the internal Vec<u8> so the data can still be
        // zeroized.
        let v = Zeroizing::new(s.into_bytes());
        validate(&v)?;

        let mut mem = memsecurity::EncryptedMem::new();

        // Can only fail if encryption is broken, which is a catastrophic
        // failure.
        mem.encrypt(&v).expect("in-memory key encryption failed");

        Ok(Self { mem })
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Key(<encrypted>)")
    }
}

impl std::fmt::Display for Key {
    /// Write out the key. Make sure to zeroize whatever you write it to if at
    /// all possible.
    ///
    /// Prefer [`Self::read`] if you want a return value that will automatically
    /// zeroize the key on drop.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Zeroized on drop
        let key = self.read();
        // A Key only holds printable ASCII.
        let key_str = String::from_utf8_lossy(key.as_ref());
        f.write_str(&key_str)
    }
}
