//! # RustCrypto-based Cryptography Provider for LPTLS
//!
//! This crate implements the [`lptls_crypto`] provider interface on top of
//! the RustCrypto project crates:
//!
//! - **Hash**: MD5 (`md-5`), SHA-1 (`sha1`)
//! - **HMAC**: `hmac` over either hash
//! - **Bulk ciphers**: RC4 (`rc4`), DES / 3DES-EDE (`des`),
//!   AES-128/256 (`aes`), all CBC modes via `cbc`
//! - **RSA**: PKCS#1 v1.5 encryption and unprefixed signatures (`rsa`)
//! - **RNG**: the operating system CSPRNG (`rand::rngs::OsRng`)
//!
//! MD5, SHA-1, RC4, DES and static-RSA key transport are all broken or
//! deprecated primitives. They are implemented here because the SSL 3.0 /
//! TLS 1.0 wire protocols are defined over them; nothing in this crate is
//! suitable for protecting modern traffic.
//!
//! ## Example Usage
//!
//! ```rust
//! use lptls_crypto::CryptoProvider;
//! use lptls_crypto_rustcrypto::RustCryptoProvider;
//!
//! let provider = RustCryptoProvider::new();
//! let mut md5 = provider.hash(lptls_crypto::HashAlgorithm::Md5).unwrap();
//! md5.update(b"abc");
//! assert_eq!(md5.finalize().len(), 16);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

use lptls_crypto::{
    BulkCipher, BulkCipherAlgorithm, CipherDirection, CryptoProvider, Hash, HashAlgorithm, Hmac,
    Random, Result, Rsa,
};

pub mod cipher;
pub mod hash;
pub mod hmac;
pub mod random;
mod rsa_bridge;

use random::OsRandom;

/// Cryptography provider backed by the RustCrypto crates.
///
/// # Thread Safety
///
/// This provider is `Send + Sync` and can be shared across sessions.
#[derive(Debug, Default)]
pub struct RustCryptoProvider {
    random: OsRandom,
}

impl CryptoProvider for RustCryptoProvider {
    fn new() -> Self {
        Self { random: OsRandom }
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
        hash::create_hash(algorithm)
    }

    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
        hmac::create_hmac(algorithm, key)
    }

    fn bulk_cipher(
        &self,
        algorithm: BulkCipherAlgorithm,
        direction: CipherDirection,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Box<dyn BulkCipher>> {
        cipher::create_bulk_cipher(algorithm, direction, key, iv)
    }

    fn rsa(&self) -> Result<Box<dyn Rsa>> {
        Ok(Box::new(rsa_bridge::RsaBridge))
    }

    fn random(&self) -> &dyn Random {
        &self.random
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_supports_full_suite_set() {
        let provider = RustCryptoProvider::new();
        assert!(provider.supports_hash(HashAlgorithm::Md5));
        assert!(provider.supports_hash(HashAlgorithm::Sha1));
        for algorithm in [
            BulkCipherAlgorithm::Null,
            BulkCipherAlgorithm::Rc4,
            BulkCipherAlgorithm::Des,
            BulkCipherAlgorithm::TripleDes,
            BulkCipherAlgorithm::Aes128,
            BulkCipherAlgorithm::Aes256,
        ] {
            assert!(
                provider.supports_bulk_cipher(algorithm),
                "missing {}",
                algorithm.name()
            );
        }
    }
}
