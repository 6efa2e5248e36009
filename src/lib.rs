//! Rotating symmetric keysets.
//!
//! A [`Keyset`] encrypts with its current key and decrypts with any key that
//! has not yet expired, so new keys can be rotated in while data sealed under
//! recently retired keys stays readable for a grace period.
//!
//! ```
//! use chrono::Duration;
//! use keyset::{Key, Keyset};
//!
//! # fn main() -> keyset::Result<()> {
//! let keyset = Keyset::with_key(Key::random()?);
//! let old = keyset.encrypt(b"written under the first key")?;
//!
//! keyset.rotate_in(Key::random()?, Duration::hours(24));
//! let new = keyset.encrypt(b"written under the second key")?;
//!
//! assert_eq!(keyset.decrypt(&old)?.as_slice(), b"written under the first key");
//! assert_eq!(keyset.decrypt(&new)?.as_slice(), b"written under the second key");
//! # Ok(())
//! # }
//! ```

pub mod crypto;
mod error;
mod key;
mod keyset;
mod store;

pub use crate::crypto::{
    AuthenticatedCipher, OsRandom, SecureRandomSource, XChaCha20Poly1305Cipher,
};
pub use crate::error::{Error, PrimitiveError, Result};
pub use crate::key::{Key, KeyMetadata, NEVER_EXPIRES, unix_now};
pub use crate::keyset::Keyset;
pub use crate::store::{CryptoKeyStore, MemoryKeyStore};
