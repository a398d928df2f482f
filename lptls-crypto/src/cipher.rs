//! Bulk (record) cipher interface.
//!
//! Unlike AEAD-era interfaces, the SSL 3.0 / TLS 1.0 record ciphers are
//! stateful: an RC4 keystream runs continuously across records, and CBC
//! block ciphers chain the last ciphertext block of one record into the
//! first block of the next. The trait therefore hands out a long-lived
//! cipher object per direction rather than a stateless seal/open pair.

use crate::Result;

/// Bulk cipher algorithms negotiable by the supported cipher suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkCipherAlgorithm {
    /// No encryption (integrity-only suites)
    Null,
    /// RC4 stream cipher with a 128-bit state key
    Rc4,
    /// DES in CBC mode (64-bit blocks, 56-bit effective key)
    Des,
    /// Triple-DES EDE in CBC mode (64-bit blocks, 168-bit key)
    TripleDes,
    /// AES-128 in CBC mode
    Aes128,
    /// AES-256 in CBC mode
    Aes256,
}

impl BulkCipherAlgorithm {
    /// Key length in bytes the provider expects.
    ///
    /// For export suites this is the *expanded* key length: the key
    /// schedule expands the short export key material before the cipher
    /// is ever instantiated, so providers only see full-size keys.
    pub const fn key_len(self) -> usize {
        match self {
            BulkCipherAlgorithm::Null => 0,
            BulkCipherAlgorithm::Rc4 => 16,
            BulkCipherAlgorithm::Des => 8,
            BulkCipherAlgorithm::TripleDes => 24,
            BulkCipherAlgorithm::Aes128 => 16,
            BulkCipherAlgorithm::Aes256 => 32,
        }
    }

    /// Block size in bytes; 1 for stream ciphers and NULL.
    pub const fn block_size(self) -> usize {
        match self {
            BulkCipherAlgorithm::Null | BulkCipherAlgorithm::Rc4 => 1,
            BulkCipherAlgorithm::Des | BulkCipherAlgorithm::TripleDes => 8,
            BulkCipherAlgorithm::Aes128 | BulkCipherAlgorithm::Aes256 => 16,
        }
    }

    /// Whether this is a CBC block cipher.
    pub const fn is_block(self) -> bool {
        self.block_size() > 1
    }

    /// Get the algorithm name.
    pub const fn name(self) -> &'static str {
        match self {
            BulkCipherAlgorithm::Null => "NULL",
            BulkCipherAlgorithm::Rc4 => "RC4",
            BulkCipherAlgorithm::Des => "DES-CBC",
            BulkCipherAlgorithm::TripleDes => "3DES-EDE-CBC",
            BulkCipherAlgorithm::Aes128 => "AES-128-CBC",
            BulkCipherAlgorithm::Aes256 => "AES-256-CBC",
        }
    }
}

/// Direction a bulk cipher instance transforms in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherDirection {
    /// Plaintext in, ciphertext out
    Encrypt,
    /// Ciphertext in, plaintext out
    Decrypt,
}

/// Stateful bulk cipher trait.
///
/// One instance serves one record direction for the lifetime of a
/// session; its internal state (keystream position or CBC residue)
/// carries over between calls.
pub trait BulkCipher: Send {
    /// Transform `data` in place.
    ///
    /// For block ciphers the input length must be a multiple of
    /// [`block_size`](Self::block_size); the caller is responsible for
    /// protocol padding. Stream and NULL ciphers accept any length.
    fn process(&mut self, data: &mut [u8]) -> Result<()>;

    /// Block size in bytes; 1 for stream ciphers and NULL.
    fn block_size(&self) -> usize;

    /// Get the algorithm this cipher implements.
    fn algorithm(&self) -> BulkCipherAlgorithm;
}
