//! Named keyset storage, sealed at rest under a prime keyset.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Error, Result};
use crate::key::Key;
use crate::keyset::Keyset;

/// Storage for keysets by name.
///
/// Implementations are expected to keep keysets encrypted at rest,
/// typically under a prime key derived from a secret they never persist.
pub trait CryptoKeyStore: Send + Sync {
    fn get_keyset(&self, name: &str) -> Result<Keyset>;
    fn put_keyset(&self, name: &str, keyset: &Keyset) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct StoredKeyset {
    type_id: i32,
    keys: Vec<StoredKey>,
}

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct StoredKey {
    value: Vec<u8>,
    created_at: i64,
    expires_at: i64,
}

impl StoredKeyset {
    fn capture(keyset: &Keyset) -> Self {
        let keys = keyset
            .snapshot()
            .iter()
            .map(|k| StoredKey {
                value: k.value().to_vec(),
                created_at: k.created_at(),
                expires_at: k.expires_at(),
            })
            .collect();

        Self {
            type_id: keyset.type_id(),
            keys,
        }
    }

    /// Worst-case JSON size of one key: 32 three-digit bytes, two i64s, field names.
    const ENCODED_KEY_MAX: usize = 256;
    const ENCODED_HEADER_MAX: usize = 64;

    /// Serialize into a buffer sized up front, so encoding never reallocates
    /// and leaves no unwiped copies of key material behind.
    fn encode(&self) -> Result<Zeroizing<Vec<u8>>> {
        let capacity = Self::ENCODED_HEADER_MAX + self.keys.len() * Self::ENCODED_KEY_MAX;
        let mut buf = Zeroizing::new(Vec::with_capacity(capacity));
        serde_json::to_writer(&mut *buf, self)?;
        Ok(buf)
    }

    fn restore(self) -> Keyset {
        let keys = self
            .keys
            .into_iter()
            .map(|mut k| {
                Key::from_material(std::mem::take(&mut k.value))
                    .with_created_at(k.created_at)
                    .expiring_at(k.expires_at)
            })
            .collect();

        Keyset::from_keys(keys).with_type_id(self.type_id)
    }
}

/// In-memory [`CryptoKeyStore`] holding only sealed snapshots.
///
/// Each stored keyset is serialized, encrypted with the prime keyset's
/// current key, and kept as an opaque blob. Rotating the prime keyset and
/// calling [`reseal`](Self::reseal) moves every entry onto the new prime key.
///
/// Encoding writes into a wiped, pre-sized buffer. Decoding goes through
/// `serde_json`, whose growing buffers may leave copies of key material in
/// freed memory; the final key values are wiped on drop.
pub struct MemoryKeyStore {
    prime: Keyset,
    sealed: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyStore {
    pub fn new(prime: Keyset) -> Self {
        Self {
            prime,
            sealed: RwLock::new(HashMap::new()),
        }
    }

    /// Store whose prime key is derived from `secret`.
    pub fn from_secret(secret: &str) -> Self {
        Self::new(Keyset::with_key(Key::from_passphrase(secret)))
    }

    /// The prime keyset, for rotation and purging.
    pub fn prime(&self) -> &Keyset {
        &self.prime
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sealed.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sealed.read().contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        match self.sealed.write().remove(name) {
            Some(_) => Ok(()),
            None => Err(Error::KeysetNotFound(name.to_string())),
        }
    }

    /// Re-encrypt every entry under the prime keyset's current key.
    ///
    /// All-or-nothing: if any entry fails to open or seal, nothing changes.
    pub fn reseal(&self) -> Result<usize> {
        let mut sealed = self.sealed.write();

        let mut resealed = HashMap::with_capacity(sealed.len());
        for (name, blob) in sealed.iter() {
            let plaintext = self.prime.decrypt(blob)?;
            resealed.insert(name.clone(), self.prime.encrypt(&plaintext)?);
        }

        let count = resealed.len();
        *sealed = resealed;
        debug!(count, "resealed stored keysets");
        Ok(count)
    }

    fn seal(&self, keyset: &Keyset) -> Result<Vec<u8>> {
        let snapshot = StoredKeyset::capture(keyset);
        let plaintext = snapshot.encode()?;
        self.prime.encrypt(&plaintext)
    }

    fn open(&self, blob: &[u8]) -> Result<Keyset> {
        let plaintext = self.prime.decrypt(blob)?;
        let snapshot: StoredKeyset = serde_json::from_slice(&plaintext)?;
        Ok(snapshot.restore())
    }
}

impl CryptoKeyStore for MemoryKeyStore {
    fn get_keyset(&self, name: &str) -> Result<Keyset> {
        let sealed = self.sealed.read();
        let blob = sealed
            .get(name)
            .ok_or_else(|| Error::KeysetNotFound(name.to_string()))?;
        self.open(blob)
    }

    fn put_keyset(&self, name: &str, keyset: &Keyset) -> Result<()> {
        let blob = self.seal(keyset)?;
        self.sealed.write().insert(name.to_string(), blob);
        debug!(name, keys = keyset.len(), "stored keyset");
        Ok(())
    }
}
