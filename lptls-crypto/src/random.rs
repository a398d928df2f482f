//! Cryptographically Secure Random Number Generator (CSPRNG) interface.

use crate::Result;

/// Random number generator trait.
///
/// Provides a cryptographically secure random number generator for hello
/// randoms, premaster secrets and PKCS#1 padding.
///
/// # Security Requirements
///
/// - MUST be cryptographically secure
/// - MUST be properly seeded from an OS entropy source
/// - MUST be thread-safe (Send + Sync)
pub trait Random: Send + Sync {
    /// Fill a buffer with random bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if random generation fails (e.g. OS RNG
    /// unavailable).
    fn fill(&self, dest: &mut [u8]) -> Result<()>;

    /// Generate a random byte vector of specified length.
    fn generate(&self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }
}
