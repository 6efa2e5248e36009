use getrandom::fill;

use crate::error::{Error, Result};

/// Source of cryptographically secure random bytes.
pub trait SecureRandomSource: Send + Sync {
    /// Fill `buf` entirely, or fail with [`Error::RandomSource`].
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl SecureRandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        fill(buf).map_err(|_| Error::RandomSource)
    }
}

/// Generate `n` cryptographically secure random bytes.
pub fn generate_random_bytes(n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    OsRandom.fill(&mut buf)?;
    Ok(buf)
}
