//! # LPTLS Cryptographic Provider Interface
//!
//! This crate defines the cryptographic abstraction layer for LPTLS.
//! It provides trait-based interfaces that allow pluggable cryptographic
//! backends, so the protocol engine never depends on a concrete primitive
//! implementation.
//!
//! ## Design Goals
//!
//! 1. **Pluggable:** Support multiple crypto libraries behind one interface
//! 2. **Object-safe:** All primitive traits are usable through `Box<dyn _>`
//! 3. **Type-safe:** Algorithm enums prevent key/cipher mismatches
//! 4. **Constant-time:** Tag and digest comparisons must not leak timing
//!
//! ## Architecture
//!
//! ```text
//! CryptoProvider (main trait)
//! ├── Hash (MD5, SHA-1 digests)
//! ├── Hmac (keyed-hash authentication)
//! ├── BulkCipher (RC4, DES, 3DES-EDE, AES-CBC, NULL)
//! ├── Rsa (PKCS#1 v1.5 key transport and signatures)
//! └── Random (CSPRNG)
//! ```
//!
//! The algorithm set is deliberately the SSL 3.0 / TLS 1.0 one: the key
//! schedules and record MACs of those protocol versions are defined over
//! MD5 and SHA-1, and the negotiable bulk ciphers are the classic stream
//! and CBC block ciphers. Modern primitives have no use here.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

pub mod cipher;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod random;
pub mod rsa;

pub use cipher::{BulkCipher, BulkCipherAlgorithm, CipherDirection};
pub use error::{Error, Result};
pub use hash::{Hash, HashAlgorithm};
pub use hmac::Hmac;
pub use random::Random;
pub use rsa::Rsa;

/// The main cryptographic provider trait.
///
/// Implementations of this trait provide all cryptographic operations
/// needed by LPTLS. The trait is object-safe, allowing the protocol
/// engine to hold a `&dyn CryptoProvider` without knowing the backend.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one provider instance can
/// serve many sessions.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Create a new instance of the crypto provider.
    fn new() -> Self
    where
        Self: Sized;

    /// Get a hash function instance.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The hash algorithm to use
    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>>;

    /// Get an HMAC instance keyed with `key`.
    ///
    /// HMAC accepts keys of any length; providers must not reject a key
    /// for its size.
    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>>;

    /// Get a stateful bulk cipher configured for one record direction.
    ///
    /// The returned cipher owns its keystream/chaining state: successive
    /// calls continue where the previous record left off, which is exactly
    /// the behavior the SSL 3.0 / TLS 1.0 record layer requires.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The bulk cipher algorithm
    /// * `direction` - Whether this instance encrypts or decrypts
    /// * `key` - Write key (must match `algorithm.key_len()`)
    /// * `iv` - Initial CBC IV; empty for stream and NULL ciphers
    fn bulk_cipher(
        &self,
        algorithm: BulkCipherAlgorithm,
        direction: CipherDirection,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Box<dyn BulkCipher>>;

    /// Get the RSA primitive.
    ///
    /// Covers PKCS#1 v1.5 encryption (key transport) and unprefixed
    /// PKCS#1 v1.5 signatures (TLS-style MD5‖SHA-1 digest signing).
    fn rsa(&self) -> Result<Box<dyn Rsa>>;

    /// Get the random number generator.
    fn random(&self) -> &dyn Random;

    /// Check if the provider supports a specific bulk cipher algorithm.
    ///
    /// This can be used to filter the negotiable cipher suites without
    /// instantiating a cipher.
    fn supports_bulk_cipher(&self, algorithm: BulkCipherAlgorithm) -> bool {
        let key = vec![0u8; algorithm.key_len()];
        let iv = vec![0u8; algorithm.block_size() * usize::from(algorithm.is_block())];
        self.bulk_cipher(algorithm, CipherDirection::Encrypt, &key, &iv)
            .is_ok()
    }

    /// Check if the provider supports a specific hash algorithm.
    fn supports_hash(&self, algorithm: HashAlgorithm) -> bool {
        self.hash(algorithm).is_ok()
    }
}
