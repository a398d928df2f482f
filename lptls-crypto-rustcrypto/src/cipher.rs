//! Bulk cipher implementations backed by `rc4`, `des`, `aes` and `cbc`.
//!
//! The CBC wrappers process one block at a time through a persistent
//! `cbc::Encryptor`/`Decryptor`, so the chaining residue carries across
//! records exactly as the TLS 1.0 record layer expects (the next record's
//! IV is the previous record's final ciphertext block). The RC4 wrapper
//! likewise keeps its keystream position between calls.

use cipher::{Block, BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use lptls_crypto::{BulkCipher, BulkCipherAlgorithm, CipherDirection, Error, Result};
use rc4::StreamCipher;

/// Create a bulk cipher instance for one record direction.
pub fn create_bulk_cipher(
    algorithm: BulkCipherAlgorithm,
    direction: CipherDirection,
    key: &[u8],
    iv: &[u8],
) -> Result<Box<dyn BulkCipher>> {
    if key.len() != algorithm.key_len() {
        return Err(Error::InvalidKeySize {
            expected: algorithm.key_len(),
            actual: key.len(),
        });
    }
    if algorithm.is_block() && iv.len() != algorithm.block_size() {
        return Err(Error::InvalidIvSize {
            expected: algorithm.block_size(),
            actual: iv.len(),
        });
    }

    match algorithm {
        BulkCipherAlgorithm::Null => Ok(Box::new(NullCipher)),
        BulkCipherAlgorithm::Rc4 => Ok(Box::new(Rc4Cipher::new(key)?)),
        BulkCipherAlgorithm::Des => match direction {
            CipherDirection::Encrypt => cbc_encryptor::<des::Des>(algorithm, key, iv),
            CipherDirection::Decrypt => cbc_decryptor::<des::Des>(algorithm, key, iv),
        },
        BulkCipherAlgorithm::TripleDes => match direction {
            CipherDirection::Encrypt => cbc_encryptor::<des::TdesEde3>(algorithm, key, iv),
            CipherDirection::Decrypt => cbc_decryptor::<des::TdesEde3>(algorithm, key, iv),
        },
        BulkCipherAlgorithm::Aes128 => match direction {
            CipherDirection::Encrypt => cbc_encryptor::<aes::Aes128>(algorithm, key, iv),
            CipherDirection::Decrypt => cbc_decryptor::<aes::Aes128>(algorithm, key, iv),
        },
        BulkCipherAlgorithm::Aes256 => match direction {
            CipherDirection::Encrypt => cbc_encryptor::<aes::Aes256>(algorithm, key, iv),
            CipherDirection::Decrypt => cbc_decryptor::<aes::Aes256>(algorithm, key, iv),
        },
    }
}

/// NULL cipher: identity transform for the integrity-only suites.
struct NullCipher;

impl BulkCipher for NullCipher {
    fn process(&mut self, _data: &mut [u8]) -> Result<()> {
        Ok(())
    }

    fn block_size(&self) -> usize {
        1
    }

    fn algorithm(&self) -> BulkCipherAlgorithm {
        BulkCipherAlgorithm::Null
    }
}

/// RC4 stream cipher with a 128-bit state key.
///
/// Encryption and decryption are the same keystream XOR, so one type
/// serves both directions.
struct Rc4Cipher {
    inner: rc4::Rc4<rc4::consts::U16>,
}

impl Rc4Cipher {
    fn new(key: &[u8]) -> Result<Self> {
        let inner = rc4::Rc4::new_from_slice(key).map_err(|_| Error::InvalidKeySize {
            expected: 16,
            actual: key.len(),
        })?;
        Ok(Self { inner })
    }
}

impl BulkCipher for Rc4Cipher {
    fn process(&mut self, data: &mut [u8]) -> Result<()> {
        self.inner.apply_keystream(data);
        Ok(())
    }

    fn block_size(&self) -> usize {
        1
    }

    fn algorithm(&self) -> BulkCipherAlgorithm {
        BulkCipherAlgorithm::Rc4
    }
}

fn cbc_encryptor<C>(
    algorithm: BulkCipherAlgorithm,
    key: &[u8],
    iv: &[u8],
) -> Result<Box<dyn BulkCipher>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit + Send + 'static,
{
    let inner = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::CryptoError("CBC cipher setup failed".into()))?;
    Ok(Box::new(CbcEncrypt { inner, algorithm }))
}

fn cbc_decryptor<C>(
    algorithm: BulkCipherAlgorithm,
    key: &[u8],
    iv: &[u8],
) -> Result<Box<dyn BulkCipher>>
where
    C: BlockCipher + BlockDecryptMut + KeyInit + Send + 'static,
{
    let inner = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::CryptoError("CBC cipher setup failed".into()))?;
    Ok(Box::new(CbcDecrypt { inner, algorithm }))
}

/// CBC encryption half; chaining state persists across `process` calls.
struct CbcEncrypt<C>
where
    C: BlockCipher + BlockEncryptMut,
{
    inner: cbc::Encryptor<C>,
    algorithm: BulkCipherAlgorithm,
}

impl<C> BulkCipher for CbcEncrypt<C>
where
    C: BlockCipher + BlockEncryptMut + Send,
{
    fn process(&mut self, data: &mut [u8]) -> Result<()> {
        let block_size = self.algorithm.block_size();
        if data.len() % block_size != 0 {
            return Err(Error::InvalidLength);
        }
        for chunk in data.chunks_exact_mut(block_size) {
            self.inner
                .encrypt_block_mut(Block::<cbc::Encryptor<C>>::from_mut_slice(chunk));
        }
        Ok(())
    }

    fn block_size(&self) -> usize {
        self.algorithm.block_size()
    }

    fn algorithm(&self) -> BulkCipherAlgorithm {
        self.algorithm
    }
}

/// CBC decryption half; chaining state persists across `process` calls.
struct CbcDecrypt<C>
where
    C: BlockCipher + BlockDecryptMut,
{
    inner: cbc::Decryptor<C>,
    algorithm: BulkCipherAlgorithm,
}

impl<C> BulkCipher for CbcDecrypt<C>
where
    C: BlockCipher + BlockDecryptMut + Send,
{
    fn process(&mut self, data: &mut [u8]) -> Result<()> {
        let block_size = self.algorithm.block_size();
        if data.len() % block_size != 0 {
            return Err(Error::InvalidLength);
        }
        for chunk in data.chunks_exact_mut(block_size) {
            self.inner
                .decrypt_block_mut(Block::<cbc::Decryptor<C>>::from_mut_slice(chunk));
        }
        Ok(())
    }

    fn block_size(&self) -> usize {
        self.algorithm.block_size()
    }

    fn algorithm(&self) -> BulkCipherAlgorithm {
        self.algorithm
    }
}
