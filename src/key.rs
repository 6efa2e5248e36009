use std::fmt;

use chrono::Utc;
use zeroize::Zeroizing;

use crate::crypto::{KEY_LEN, OsRandom, SecureRandomSource, hash_for_string};
use crate::error::Result;

/// Expiry sentinel meaning "never expires".
pub const NEVER_EXPIRES: i64 = 0;

/// Current time in unix seconds.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// A symmetric key held by a [`Keyset`](crate::Keyset).
///
/// The key material is wiped on drop and only ever handed to the cipher.
#[derive(Clone)]
pub struct Key {
    value: Zeroizing<Vec<u8>>,
    created_at: i64,
    expires_at: i64,
}

/// Timestamps of a key, without its material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMetadata {
    pub created_at: i64,
    pub expires_at: i64,
}

impl Key {
    /// Fresh 256-bit key from the operating system's CSPRNG.
    pub fn random() -> Result<Self> {
        Self::random_from(&OsRandom)
    }

    /// Fresh 256-bit key from `rng`.
    pub fn random_from<R: SecureRandomSource + ?Sized>(rng: &R) -> Result<Self> {
        let mut value = Zeroizing::new(vec![0u8; KEY_LEN]);
        rng.fill(&mut value)?;
        Ok(Self::from_zeroizing(value))
    }

    /// Wrap caller-supplied key material.
    ///
    /// The length is not checked here; material of the wrong size is
    /// rejected by the cipher on first use.
    pub fn from_material(material: impl Into<Vec<u8>>) -> Self {
        Self::from_zeroizing(Zeroizing::new(material.into()))
    }

    /// Key derived from a high-entropy secret string via [`hash_for_string`].
    pub fn from_passphrase(secret: &str) -> Self {
        let hash = hash_for_string(secret);
        Self::from_material(hash.to_vec())
    }

    fn from_zeroizing(value: Zeroizing<Vec<u8>>) -> Self {
        Self {
            value,
            created_at: unix_now(),
            expires_at: NEVER_EXPIRES,
        }
    }

    /// Set an explicit expiry, in unix seconds.
    pub fn expiring_at(mut self, expires_at: i64) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub(crate) fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn metadata(&self) -> KeyMetadata {
        KeyMetadata {
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }

    /// Whether the key had expired by `now` (unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at != NEVER_EXPIRES && self.expires_at < now
    }

    pub(crate) fn value(&self) -> &[u8] {
        &self.value
    }

    pub(crate) fn set_expires_at(&mut self, expires_at: i64) {
        self.expires_at = expires_at;
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("value", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
