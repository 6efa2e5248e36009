use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use zeroize::Zeroizing;

use super::{KEY_LEN, MIN_CIPHERTEXT_LEN, NONCE_LEN, OsRandom, SecureRandomSource};
use crate::error::{PrimitiveError, Result};

/// Authenticated encryption under a raw symmetric key.
///
/// Sealed output must be self-contained: whatever randomness the
/// construction needs travels inside the ciphertext, next to the tag.
pub trait AuthenticatedCipher: Send + Sync {
    /// Encrypt and authenticate `plaintext` under `key`.
    fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>>;

    /// Verify and decrypt a value produced by [`seal`](Self::seal).
    fn open(&self, ciphertext: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

/// XChaCha20-Poly1305 with a random 24-byte nonce prepended to the output.
///
/// ```text
/// NONCE (24) | CIPHERTEXT | TAG (16)
/// ```
#[derive(Debug, Clone, Default)]
pub struct XChaCha20Poly1305Cipher<R = OsRandom> {
    rng: R,
}

impl XChaCha20Poly1305Cipher<OsRandom> {
    /// Cipher drawing nonces from the operating system.
    pub fn new() -> Self {
        Self { rng: OsRandom }
    }
}

impl<R: SecureRandomSource> XChaCha20Poly1305Cipher<R> {
    /// Cipher drawing nonces from `rng`.
    pub fn with_random_source(rng: R) -> Self {
        Self { rng }
    }
}

fn cipher_for(key: &[u8]) -> Result<XChaCha20Poly1305, PrimitiveError> {
    XChaCha20Poly1305::new_from_slice(key).map_err(|_| PrimitiveError::InvalidKeyLength {
        expected: KEY_LEN,
        actual: key.len(),
    })
}

impl<R: SecureRandomSource> AuthenticatedCipher for XChaCha20Poly1305Cipher<R> {
    fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        let cipher = cipher_for(key)?;

        let mut nonce = [0u8; NONCE_LEN];
        self.rng.fill(&mut nonce)?;

        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| PrimitiveError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn open(&self, ciphertext: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let cipher = cipher_for(key)?;

        if ciphertext.len() < MIN_CIPHERTEXT_LEN {
            return Err(PrimitiveError::CiphertextTooShort {
                len: ciphertext.len(),
                min: MIN_CIPHERTEXT_LEN,
            }
            .into());
        }

        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(XNonce::from_slice(nonce), sealed)
            .map_err(|_| PrimitiveError::AuthenticationFailed)?;
        Ok(Zeroizing::new(plaintext))
    }
}

/// Seal `plaintext` under `key` with the default cipher.
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    XChaCha20Poly1305Cipher::new().seal(plaintext, key)
}

/// Open a value sealed by [`seal`].
pub fn open(ciphertext: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    XChaCha20Poly1305Cipher::new().open(ciphertext, key)
}
