use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::KEY_LEN;

/// Hash a string into a 256-bit value usable as a symmetric key.
///
/// This is a single SHA-256 pass, meant for secrets that are already
/// high-entropy. Do not feed it user passwords.
pub fn hash_for_string(s: &str) -> Zeroizing<[u8; KEY_LEN]> {
    let digest = Sha256::digest(s.as_bytes());
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&digest);
    key
}
