//! Cryptographic primitives consumed by keysets.
//!
//! Provides the authenticated cipher, the secure random source, and the
//! string-to-key hash.

pub mod aead;
pub mod kdf;
pub mod random;

pub use aead::{AuthenticatedCipher, XChaCha20Poly1305Cipher, open, seal};
pub use kdf::hash_for_string;
pub use random::{OsRandom, SecureRandomSource, generate_random_bytes};

/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the nonce (24 bytes for XChaCha20-Poly1305).
pub const NONCE_LEN: usize = 24;
/// Length of the Poly1305 authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// Smallest well-formed sealed value: a nonce and a tag around an empty plaintext.
pub const MIN_CIPHERTEXT_LEN: usize = NONCE_LEN + TAG_LEN;
