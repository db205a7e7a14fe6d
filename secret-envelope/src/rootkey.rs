//! Root key material and the keyring that allows decrypt-only rotation.

use std::collections::HashMap;
use std::fmt;

use zeroize::Zeroizing;

/// 32 bytes of root key material, scrubbed from memory on drop. `Debug`
/// never prints the bytes — only the key id, so logs stay safe even if a
/// `RootKey` ends up inside a larger struct that gets `{:?}`-logged.
pub struct RootKey {
    kid: String,
    bytes: Zeroizing<[u8; 32]>,
}

impl RootKey {
    pub fn new(kid: impl Into<String>, bytes: [u8; 32]) -> Self {
        Self {
            kid: kid.into(),
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub(crate) fn bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl fmt::Debug for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootKey").field("kid", &self.kid).finish_non_exhaustive()
    }
}

/// The current root key plus any retired root keys still needed to decrypt
/// content written before a rotation. Encryption always uses `current`;
/// decryption looks the envelope's `kid` up in the full set.
pub struct RootKeyring {
    current: RootKey,
    retired: HashMap<String, RootKey>,
}

impl RootKeyring {
    pub fn new(current: RootKey) -> Self {
        Self {
            current,
            retired: HashMap::new(),
        }
    }

    /// Rotate to a new current root key, retiring the previous one for
    /// decrypt-only use.
    pub fn rotate(&mut self, new_current: RootKey) {
        let old = std::mem::replace(&mut self.current, new_current);
        self.retired.insert(old.kid().to_string(), old);
    }

    /// Installs `key` as decrypt-only, without disturbing the current key.
    /// Used when reconstructing a keyring from persisted current+retired
    /// key configuration, as opposed to a live rotation event.
    pub fn add_retired(&mut self, key: RootKey) {
        self.retired.insert(key.kid().to_string(), key);
    }

    pub fn current(&self) -> &RootKey {
        &self.current
    }

    pub fn find(&self, kid: &str) -> Option<&RootKey> {
        if kid == self.current.kid() {
            Some(&self.current)
        } else {
            self.retired.get(kid)
        }
    }
}

impl fmt::Debug for RootKeyring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootKeyring")
            .field("current_kid", &self.current.kid())
            .field("retired_kids", &self.retired.keys().collect::<Vec<_>>())
            .finish()
    }
}
