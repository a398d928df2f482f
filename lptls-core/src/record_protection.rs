//! Record encryption and decryption.
//!
//! MAC-then-encrypt, as both protocol versions specify: the MAC is
//! computed over the plaintext fragment and appended, block suites then
//! pad to the cipher block boundary, and the whole buffer is encrypted.
//! Decryption runs the inverse and surfaces padding and MAC failures as
//! one uniform authentication error.
//!
//! Each direction owns an independent sequence counter and cipher state.
//! Counters advance only when an operation fully completes; a failed
//! operation leaves the counter untouched and the session unusable.

use lptls_crypto::{BulkCipher, CipherDirection, CryptoProvider};

use crate::cipher::CipherSuite;
use crate::error::{Error, Result};
use crate::key_schedule::SecureKeyInfo;
use crate::protocol::{ContentType, ProtocolVersion, Role};
use crate::record_mac::RecordMac;

fn bad_record() -> Error {
    Error::AuthenticationFailure("bad record MAC".into())
}

/// Outbound record protection for one direction.
pub struct RecordEncryptor {
    version: ProtocolVersion,
    mac: RecordMac,
    cipher: Box<dyn BulkCipher>,
    block_size: usize,
    sequence: u64,
}

impl std::fmt::Debug for RecordEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordEncryptor")
            .field("version", &self.version)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl RecordEncryptor {
    /// Configure protection for records written by `writer`.
    ///
    /// Pulls the writer's MAC secret, write key and IV from the session
    /// key material; called once per session when the ChangeCipherSpec
    /// boundary is crossed.
    pub fn new(
        provider: &dyn CryptoProvider,
        version: ProtocolVersion,
        suite: &CipherSuite,
        keys: &SecureKeyInfo,
        writer: Role,
    ) -> Result<Self> {
        let mac = RecordMac::new(version, suite.mac, keys.mac_secret(writer));
        let cipher = provider.bulk_cipher(
            suite.bulk,
            CipherDirection::Encrypt,
            keys.write_key(writer),
            keys.write_iv(writer),
        )?;
        Ok(Self {
            version,
            mac,
            block_size: suite.block_size(),
            cipher,
            sequence: 0,
        })
    }

    /// Transform a plaintext fragment into a ciphertext fragment.
    pub fn encrypt(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        let tag = self
            .mac
            .compute(provider, self.sequence, content_type, plaintext)?;

        let mut fragment = Vec::with_capacity(plaintext.len() + tag.len() + self.block_size);
        fragment.extend_from_slice(plaintext);
        fragment.extend_from_slice(&tag);

        if self.block_size > 1 {
            // Pad with pad_len+1 bytes, each holding pad_len. TLS 1.0
            // requires exactly this; SSL 3.0 permits arbitrary filler, so
            // the stricter form satisfies both.
            let pad_len = (self.block_size - (fragment.len() + 1) % self.block_size)
                % self.block_size;
            fragment.resize(fragment.len() + pad_len + 1, pad_len as u8);
        }

        self.cipher.process(&mut fragment)?;
        self.sequence += 1;
        Ok(fragment)
    }

    /// Sequence number of the next record to be written.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Inbound record protection for one direction.
pub struct RecordDecryptor {
    version: ProtocolVersion,
    mac: RecordMac,
    cipher: Box<dyn BulkCipher>,
    block_size: usize,
    sequence: u64,
}

impl std::fmt::Debug for RecordDecryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDecryptor")
            .field("version", &self.version)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl RecordDecryptor {
    /// Configure protection for records written by `writer` on the peer
    /// side.
    pub fn new(
        provider: &dyn CryptoProvider,
        version: ProtocolVersion,
        suite: &CipherSuite,
        keys: &SecureKeyInfo,
        writer: Role,
    ) -> Result<Self> {
        let mac = RecordMac::new(version, suite.mac, keys.mac_secret(writer));
        let cipher = provider.bulk_cipher(
            suite.bulk,
            CipherDirection::Decrypt,
            keys.write_key(writer),
            keys.write_iv(writer),
        )?;
        Ok(Self {
            version,
            mac,
            block_size: suite.block_size(),
            cipher,
            sequence: 0,
        })
    }

    /// Transform a ciphertext fragment back into plaintext.
    ///
    /// Records must arrive in the exact order they were written; the
    /// sequence number in the MAC input enforces it.
    pub fn decrypt(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        let mut data = ciphertext.to_vec();

        if self.block_size > 1 && (data.is_empty() || data.len() % self.block_size != 0) {
            return Err(bad_record());
        }

        self.cipher.process(&mut data).map_err(|_| bad_record())?;

        if self.block_size > 1 {
            let pad_len = usize::from(*data.last().ok_or_else(bad_record)?);
            if pad_len + 1 > data.len() {
                return Err(bad_record());
            }
            match self.version {
                ProtocolVersion::Tls10 => {
                    // Every padding byte must equal the padding length.
                    let padding = &data[data.len() - pad_len - 1..];
                    let mut diff = 0u8;
                    for &byte in padding {
                        diff |= byte ^ pad_len as u8;
                    }
                    if diff != 0 {
                        return Err(bad_record());
                    }
                },
                ProtocolVersion::Ssl30 => {
                    // Filler bytes are opaque; the count must fit one block.
                    if pad_len >= self.block_size {
                        return Err(bad_record());
                    }
                },
            }
            data.truncate(data.len() - pad_len - 1);
        }

        let tag_len = self.mac.tag_len();
        if data.len() < tag_len {
            return Err(bad_record());
        }
        let plaintext_len = data.len() - tag_len;
        let (plaintext, tag) = data.split_at(plaintext_len);

        self.mac
            .verify(provider, self.sequence, content_type, plaintext, tag)?;

        self.sequence += 1;
        data.truncate(plaintext_len);
        Ok(data)
    }

    /// Sequence number of the next record expected.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::SUPPORTED_SUITES;
    use crate::key_schedule::{derive, PREMASTER_SECRET_LEN};
    use lptls_crypto::CryptoProvider as _;
    use lptls_crypto_rustcrypto::RustCryptoProvider;
    use zeroize::Zeroizing;

    fn pair(
        provider: &RustCryptoProvider,
        version: ProtocolVersion,
        suite: &CipherSuite,
    ) -> (RecordEncryptor, RecordDecryptor) {
        let premaster = Zeroizing::new(vec![0x42u8; PREMASTER_SECRET_LEN]);
        let keys = derive(provider, version, suite, premaster, [1; 32], [2; 32]).unwrap();
        let enc = RecordEncryptor::new(provider, version, suite, &keys, Role::Client).unwrap();
        let dec = RecordDecryptor::new(provider, version, suite, &keys, Role::Client).unwrap();
        (enc, dec)
    }

    #[test]
    fn test_roundtrip_every_suite_and_version() {
        let provider = RustCryptoProvider::new();
        for suite in SUPPORTED_SUITES {
            for version in [ProtocolVersion::Tls10, ProtocolVersion::Ssl30] {
                let (mut enc, mut dec) = pair(&provider, version, suite);

                // Zero length, one byte, an exact block multiple, and a
                // longer odd size.
                for len in [0usize, 1, suite.block_size().max(2) * 4, 1000] {
                    let plaintext: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
                    let ciphertext = enc
                        .encrypt(&provider, ContentType::ApplicationData, &plaintext)
                        .unwrap();
                    let recovered = dec
                        .decrypt(&provider, ContentType::ApplicationData, &ciphertext)
                        .unwrap();
                    assert_eq!(recovered, plaintext, "{} {:?}", suite.name, version);
                }
            }
        }
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let provider = RustCryptoProvider::new();
        for suite_id in [0x0004u16, 0x002F, 0x0001] {
            let suite = CipherSuite::lookup(suite_id).unwrap();
            let (mut enc, mut dec) = pair(&provider, ProtocolVersion::Tls10, suite);

            let mut ciphertext = enc
                .encrypt(&provider, ContentType::ApplicationData, b"sensitive data")
                .unwrap();
            ciphertext[0] ^= 0x01;
            assert!(
                dec.decrypt(&provider, ContentType::ApplicationData, &ciphertext)
                    .is_err(),
                "{}",
                suite.name
            );
        }
    }

    #[test]
    fn test_sequence_advances_only_on_success() {
        let provider = RustCryptoProvider::new();
        let suite = CipherSuite::lookup(0x0005).unwrap();
        let (mut enc, mut dec) = pair(&provider, ProtocolVersion::Tls10, suite);

        assert_eq!(enc.sequence(), 0);
        let first = enc
            .encrypt(&provider, ContentType::ApplicationData, b"one")
            .unwrap();
        let second = enc
            .encrypt(&provider, ContentType::ApplicationData, b"two")
            .unwrap();
        assert_eq!(enc.sequence(), 2);

        // Deliver out of order: the MAC sequence check rejects, and the
        // failed operation must not advance the read counter.
        assert!(dec
            .decrypt(&provider, ContentType::ApplicationData, &second)
            .is_err());
        assert_eq!(dec.sequence(), 0);

        // In-order delivery still works for the first record.
        assert_eq!(
            dec.decrypt(&provider, ContentType::ApplicationData, &first)
                .unwrap(),
            b"one"
        );
        assert_eq!(dec.sequence(), 1);
    }

    #[test]
    fn test_replay_rejected() {
        let provider = RustCryptoProvider::new();
        let suite = CipherSuite::lookup(0x0004).unwrap();
        let (mut enc, mut dec) = pair(&provider, ProtocolVersion::Ssl30, suite);

        let record = enc
            .encrypt(&provider, ContentType::ApplicationData, b"once only")
            .unwrap();
        dec.decrypt(&provider, ContentType::ApplicationData, &record)
            .unwrap();
        assert!(dec
            .decrypt(&provider, ContentType::ApplicationData, &record)
            .is_err());
    }

    #[test]
    fn test_cbc_padding_is_validated() {
        let provider = RustCryptoProvider::new();
        let suite = CipherSuite::lookup(0x002F).unwrap();
        let (mut enc, mut dec) = pair(&provider, ProtocolVersion::Tls10, suite);

        // Corrupting the final block scrambles the padding after
        // decryption; the error must be indistinguishable from a MAC
        // failure.
        let mut ciphertext = enc
            .encrypt(&provider, ContentType::ApplicationData, b"padded payload")
            .unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;
        let err = dec
            .decrypt(&provider, ContentType::ApplicationData, &ciphertext)
            .unwrap_err();
        assert_eq!(err, bad_record());
    }

    #[test]
    fn test_block_fragment_length_must_align() {
        let provider = RustCryptoProvider::new();
        let suite = CipherSuite::lookup(0x000A).unwrap();
        let (mut enc, mut dec) = pair(&provider, ProtocolVersion::Tls10, suite);

        let ciphertext = enc
            .encrypt(&provider, ContentType::ApplicationData, b"abc")
            .unwrap();
        assert_eq!(ciphertext.len() % suite.block_size(), 0);
        assert!(dec
            .decrypt(&provider, ContentType::ApplicationData, &ciphertext[..ciphertext.len() - 1])
            .is_err());
    }
}
