//! Record authentication codes.
//!
//! Every record is authenticated by a MAC keyed with the writing
//! direction's MAC secret over, in order: the 64-bit sequence number, the
//! content type byte, the protocol version (TLS 1.0 only), the fragment
//! length as two bytes, and the fragment itself. Sequence numbers make
//! replayed or reordered records fail validation.
//!
//! - **TLS 1.0** uses HMAC with the suite's hash (RFC 2246 Section 6.2.3.1).
//! - **SSL 3.0** uses the double-hash construction
//!   `hash(secret ‖ pad1 ‖ seq ‖ type ‖ len ‖ fragment)` then
//!   `hash(secret ‖ pad2 ‖ inner)` with 0x36/0x5C pad fills of 48 (MD5)
//!   or 40 (SHA-1) bytes (RFC 6101 Section 5.2.3.1).

use lptls_crypto::{CryptoProvider, HashAlgorithm};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::prf::{ssl3_pad_len, PAD_ONE, PAD_TWO};
use crate::protocol::{ContentType, ProtocolVersion};

/// MAC manager for one record direction.
pub struct RecordMac {
    version: ProtocolVersion,
    algorithm: HashAlgorithm,
    secret: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for RecordMac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordMac")
            .field("version", &self.version)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl RecordMac {
    /// Create a MAC manager keyed with one direction's MAC secret.
    pub fn new(version: ProtocolVersion, algorithm: HashAlgorithm, secret: &[u8]) -> Self {
        Self {
            version,
            algorithm,
            secret: Zeroizing::new(secret.to_vec()),
        }
    }

    /// Tag length in bytes.
    pub fn tag_len(&self) -> usize {
        self.algorithm.output_size()
    }

    /// Compute the tag for one record.
    pub fn compute(
        &self,
        provider: &dyn CryptoProvider,
        sequence: u64,
        content_type: ContentType,
        fragment: &[u8],
    ) -> Result<Vec<u8>> {
        let length = (fragment.len() as u16).to_be_bytes();

        match self.version {
            ProtocolVersion::Tls10 => {
                let mut hmac = provider.hmac(self.algorithm, &self.secret)?;
                hmac.update(&sequence.to_be_bytes());
                hmac.update(&[content_type.to_u8()]);
                hmac.update(&[self.version.major(), self.version.minor()]);
                hmac.update(&length);
                hmac.update(fragment);
                Ok(hmac.finalize())
            },
            ProtocolVersion::Ssl30 => {
                let pad_len = ssl3_pad_len(self.algorithm);

                let mut inner = provider.hash(self.algorithm)?;
                inner.update(&self.secret);
                inner.update(&vec![PAD_ONE; pad_len]);
                inner.update(&sequence.to_be_bytes());
                inner.update(&[content_type.to_u8()]);
                inner.update(&length);
                inner.update(fragment);
                let inner_digest = inner.finalize();

                let mut outer = provider.hash(self.algorithm)?;
                outer.update(&self.secret);
                outer.update(&vec![PAD_TWO; pad_len]);
                outer.update(&inner_digest);
                Ok(outer.finalize())
            },
        }
    }

    /// Validate a received tag.
    ///
    /// A length mismatch is rejected before any byte comparison; matching
    /// lengths are compared over the full tag with no early exit.
    pub fn verify(
        &self,
        provider: &dyn CryptoProvider,
        sequence: u64,
        content_type: ContentType,
        fragment: &[u8],
        tag: &[u8],
    ) -> Result<()> {
        if tag.len() != self.tag_len() {
            return Err(Error::AuthenticationFailure("record MAC length mismatch".into()));
        }

        let expected = self.compute(provider, sequence, content_type, fragment)?;
        if bool::from(expected.ct_eq(tag)) {
            Ok(())
        } else {
            Err(Error::AuthenticationFailure("bad record MAC".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lptls_crypto::CryptoProvider as _;
    use lptls_crypto_rustcrypto::RustCryptoProvider;

    fn mac(version: ProtocolVersion, algorithm: HashAlgorithm) -> RecordMac {
        RecordMac::new(version, algorithm, &[0x0Fu8; 20])
    }

    #[test]
    fn test_compute_and_verify_roundtrip() {
        let provider = RustCryptoProvider::new();
        for version in [ProtocolVersion::Tls10, ProtocolVersion::Ssl30] {
            for algorithm in [HashAlgorithm::Md5, HashAlgorithm::Sha1] {
                let mac = mac(version, algorithm);
                let tag = mac
                    .compute(&provider, 3, ContentType::ApplicationData, b"payload")
                    .unwrap();
                assert_eq!(tag.len(), algorithm.output_size());
                mac.verify(&provider, 3, ContentType::ApplicationData, b"payload", &tag)
                    .unwrap();
            }
        }
    }

    #[test]
    fn test_any_input_change_rejects() {
        let provider = RustCryptoProvider::new();
        let mac = mac(ProtocolVersion::Tls10, HashAlgorithm::Sha1);
        let tag = mac
            .compute(&provider, 7, ContentType::ApplicationData, b"payload")
            .unwrap();

        // Mutated fragment
        assert!(mac
            .verify(&provider, 7, ContentType::ApplicationData, b"paEload", &tag)
            .is_err());
        // Wrong sequence number (replay)
        assert!(mac
            .verify(&provider, 6, ContentType::ApplicationData, b"payload", &tag)
            .is_err());
        // Wrong content type
        assert!(mac
            .verify(&provider, 7, ContentType::Handshake, b"payload", &tag)
            .is_err());
        // Each single-byte corruption of the tag
        for i in 0..tag.len() {
            let mut bad = tag.clone();
            bad[i] ^= 0x80;
            assert!(mac
                .verify(&provider, 7, ContentType::ApplicationData, b"payload", &bad)
                .is_err());
        }
    }

    #[test]
    fn test_tag_length_mismatch_rejected() {
        let provider = RustCryptoProvider::new();
        let mac = mac(ProtocolVersion::Ssl30, HashAlgorithm::Md5);
        let tag = mac
            .compute(&provider, 0, ContentType::Handshake, b"x")
            .unwrap();
        assert!(mac
            .verify(&provider, 0, ContentType::Handshake, b"x", &tag[..15])
            .is_err());
    }

    /// Recompute the SSL 3.0 construction stage by stage to pin the byte
    /// layout: inner hash over secret ‖ pad1 ‖ seq ‖ type ‖ len ‖ fragment,
    /// outer hash over secret ‖ pad2 ‖ inner.
    #[test]
    fn test_ssl3_double_hash_layout() {
        let provider = RustCryptoProvider::new();
        let secret = [0x0Fu8; 20];
        let mac = RecordMac::new(ProtocolVersion::Ssl30, HashAlgorithm::Sha1, &secret);
        let fragment = b"fragment bytes";
        let sequence = 0x0102030405060708u64;

        let mut inner = provider.hash(HashAlgorithm::Sha1).unwrap();
        inner.update(&secret);
        inner.update(&[0x36u8; 40]);
        inner.update(&sequence.to_be_bytes());
        inner.update(&[23u8]);
        inner.update(&(fragment.len() as u16).to_be_bytes());
        inner.update(fragment);
        let inner_digest = inner.finalize();

        let mut outer = provider.hash(HashAlgorithm::Sha1).unwrap();
        outer.update(&secret);
        outer.update(&[0x5Cu8; 40]);
        outer.update(&inner_digest);
        let expected = outer.finalize();

        let tag = mac
            .compute(&provider, sequence, ContentType::ApplicationData, fragment)
            .unwrap();
        assert_eq!(tag, expected);
    }

    /// TLS 1.0 includes the protocol version in the MAC input; SSL 3.0
    /// does not. The same inputs must therefore produce different tags.
    #[test]
    fn test_versions_produce_distinct_tags() {
        let provider = RustCryptoProvider::new();
        let tls = mac(ProtocolVersion::Tls10, HashAlgorithm::Sha1);
        let ssl = mac(ProtocolVersion::Ssl30, HashAlgorithm::Sha1);
        let a = tls
            .compute(&provider, 1, ContentType::ApplicationData, b"data")
            .unwrap();
        let b = ssl
            .compute(&provider, 1, ContentType::ApplicationData, b"data")
            .unwrap();
        assert_ne!(a, b);
    }
}
