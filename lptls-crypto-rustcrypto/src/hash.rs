//! Hash function implementations backed by `md-5` and `sha1`.

use lptls_crypto::{Hash, HashAlgorithm, Result};
use md5::Digest;

/// Create a hash instance for the specified algorithm.
pub fn create_hash(algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
    match algorithm {
        HashAlgorithm::Md5 => Ok(Box::new(Md5Hash::new())),
        HashAlgorithm::Sha1 => Ok(Box::new(Sha1Hash::new())),
    }
}

/// MD5 hash function (RFC 1321).
///
/// MD5 is cryptographically broken as a collision-resistant hash. It
/// appears here because the SSL 3.0 / TLS 1.0 key schedule and record MAC
/// are defined over it, always paired with SHA-1.
struct Md5Hash {
    hasher: md5::Md5,
}

impl Md5Hash {
    fn new() -> Self {
        Self {
            hasher: md5::Md5::new(),
        }
    }
}

impl Hash for Md5Hash {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        16
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Md5
    }
}

/// SHA-1 hash function (FIPS 180-1).
struct Sha1Hash {
    hasher: sha1::Sha1,
}

impl Sha1Hash {
    fn new() -> Self {
        Self {
            hasher: sha1::Sha1::new(),
        }
    }
}

impl Hash for Sha1Hash {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        20
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_md5_abc() {
        let mut hash = create_hash(HashAlgorithm::Md5).unwrap();
        hash.update(b"abc");
        assert_eq!(hash.finalize(), hex!("900150983cd24fb0d6963f7d28e17f72"));
    }

    #[test]
    fn test_sha1_abc() {
        let mut hash = create_hash(HashAlgorithm::Sha1).unwrap();
        hash.update(b"a");
        hash.update(b"bc");
        assert_eq!(
            hash.finalize(),
            hex!("a9993e364706816aba3e25717850c26c9cd0d89d")
        );
    }
}
