use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by keysets, keys, the cipher and the key store.
///
/// Messages never carry key material, plaintext, or which key of a keyset
/// rejected a ciphertext.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid keyset: empty")]
    EmptyKeyset,

    #[error("no valid key in keyset")]
    NoValidKey,

    #[error("no valid decryption key")]
    NoValidDecryptionKey,

    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    #[error("secure random source unavailable")]
    RandomSource,

    #[error("keyset '{0}' not found")]
    KeysetNotFound(String),

    #[error("keyset snapshot could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by the authenticated cipher itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("ciphertext too short: {len} < {min}")]
    CiphertextTooShort { len: usize, min: usize },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("encryption failed")]
    EncryptionFailed,
}
