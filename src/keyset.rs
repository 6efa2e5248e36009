//! Ordered, rotating collection of keys.
//!
//! Index 0 is the current key, used for every new encryption. Older keys
//! follow in retirement order and remain usable for decryption until they
//! expire.

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::{AuthenticatedCipher, XChaCha20Poly1305Cipher};
use crate::error::{Error, Result};
use crate::key::{Key, KeyMetadata, unix_now};

/// A thread-safe keyset supporting rotation and multi-key decryption.
///
/// `encrypt`/`decrypt` share a read lock; `rotate_in`/`purge` take the write
/// lock. Nothing runs in the background: expired keys linger until the
/// caller purges them.
pub struct Keyset<C = XChaCha20Poly1305Cipher> {
    keys: RwLock<Vec<Key>>,
    type_id: i32,
    cipher: C,
}

impl Keyset<XChaCha20Poly1305Cipher> {
    /// Empty keyset using XChaCha20-Poly1305.
    pub fn new() -> Self {
        Self::with_cipher(XChaCha20Poly1305Cipher::new())
    }

    /// Keyset whose only (and current) key is `key`.
    pub fn with_key(key: Key) -> Self {
        Self::from_keys(vec![key])
    }

    /// Keyset holding `keys` in the given order, newest first.
    pub fn from_keys(keys: Vec<Key>) -> Self {
        Self::from_keys_with_cipher(keys, XChaCha20Poly1305Cipher::new())
    }
}

impl Default for Keyset<XChaCha20Poly1305Cipher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: AuthenticatedCipher> Keyset<C> {
    /// Empty keyset sealing through `cipher`.
    pub fn with_cipher(cipher: C) -> Self {
        Self::from_keys_with_cipher(Vec::new(), cipher)
    }

    /// Keyset holding `keys`, newest first, sealing through `cipher`.
    pub fn from_keys_with_cipher(keys: Vec<Key>, cipher: C) -> Self {
        Self {
            keys: RwLock::new(keys),
            type_id: 0,
            cipher,
        }
    }

    /// Tag the keyset with a caller-defined type. Carries no behavior.
    pub fn with_type_id(mut self, type_id: i32) -> Self {
        self.type_id = type_id;
        self
    }

    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }

    /// Timestamps of every key, newest first.
    pub fn key_metadata(&self) -> Vec<KeyMetadata> {
        self.keys.read().iter().map(Key::metadata).collect()
    }

    /// Encrypt with the current key.
    ///
    /// Never falls back to an older key: an expired current key is an
    /// operational error to fix by rotating in a fresh one.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let keys = self.keys.read();

        let current = keys.first().ok_or(Error::EmptyKeyset)?;
        if current.is_expired(unix_now()) {
            warn!(
                expires_at = current.expires_at(),
                "current key expired; rotate in a fresh key"
            );
            return Err(Error::NoValidKey);
        }

        self.cipher.seal(plaintext, current.value())
    }

    /// Decrypt with the first unexpired key that authenticates `ciphertext`.
    ///
    /// Per-key failures are swallowed; only the aggregate failure is
    /// reported, so errors reveal nothing about which keys exist.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let keys = self.keys.read();
        let now = unix_now();

        for key in keys.iter().filter(|k| !k.is_expired(now)) {
            if let Ok(plaintext) = self.cipher.open(ciphertext, key.value()) {
                return Ok(plaintext);
            }
        }

        debug!("no unexpired key could decrypt the ciphertext");
        Err(Error::NoValidDecryptionKey)
    }

    /// Make `key` the current key.
    ///
    /// The previous current key, if any, now expires `expire_after` from now,
    /// replacing any expiry it already had. A zero duration keeps it valid
    /// to the end of this second; a negative one retires it immediately.
    /// Keys retired earlier keep their own expiries.
    pub fn rotate_in(&self, key: Key, expire_after: Duration) {
        let mut keys = self.keys.write();

        if let Some(previous) = keys.first_mut() {
            let expires_at = retirement_time(expire_after);
            previous.set_expires_at(expires_at);
            debug!(expires_at, "retiring previous current key");
        }

        keys.insert(0, key);
        debug!(keys = keys.len(), "rotated in new key");
    }

    /// Drop every expired key, keeping the survivors in order.
    ///
    /// Returns how many keys were removed.
    pub fn purge(&self) -> usize {
        let mut keys = self.keys.write();
        let now = unix_now();

        let before = keys.len();
        keys.retain(|k| !k.is_expired(now));
        let removed = before - keys.len();

        if removed > 0 {
            debug!(removed, remaining = keys.len(), "purged expired keys");
        }
        removed
    }

    /// Replace the whole key list, newest first.
    pub fn replace_keys(&self, keys: Vec<Key>) {
        *self.keys.write() = keys;
    }

    /// Copy of every key, newest first.
    pub(crate) fn snapshot(&self) -> Vec<Key> {
        self.keys.read().clone()
    }
}

/// Unix second at which a key retired now with `expire_after` grace expires.
fn retirement_time(expire_after: Duration) -> i64 {
    let now = Utc::now();
    let negative = expire_after < Duration::zero();

    let at = match now.checked_add_signed(expire_after) {
        Some(t) => t.timestamp(),
        None if negative => i64::MIN,
        None => i64::MAX,
    };
    // a negative grace must already be expired within the current second
    let at = if negative {
        at.min(now.timestamp() - 1)
    } else {
        at
    };
    // 0 would read as "never expires"
    at.max(1)
}

impl<C> std::fmt::Debug for Keyset<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyset")
            .field("type_id", &self.type_id)
            .field("keys", &self.keys.read().len())
            .finish_non_exhaustive()
    }
}
