//! HMAC implementations backed by the `hmac` crate.

use hmac::Mac;
use lptls_crypto::{Error, HashAlgorithm, Hmac, Result};

/// Create an HMAC instance for the specified algorithm and key.
pub fn create_hmac(algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
    match algorithm {
        HashAlgorithm::Md5 => Ok(Box::new(HmacMd5::new(key)?)),
        HashAlgorithm::Sha1 => Ok(Box::new(HmacSha1::new(key)?)),
    }
}

/// HMAC-MD5 (RFC 2104).
struct HmacMd5 {
    mac: hmac::Hmac<md5::Md5>,
}

impl HmacMd5 {
    fn new(key: &[u8]) -> Result<Self> {
        let mac = hmac::Hmac::<md5::Md5>::new_from_slice(key)
            .map_err(|_| Error::CryptoError("HMAC-MD5 key setup failed".into()))?;
        Ok(Self { mac })
    }
}

impl Hmac for HmacMd5 {
    fn update(&mut self, data: &[u8]) {
        self.mac.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.mac.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        16
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Md5
    }
}

/// HMAC-SHA-1 (RFC 2104).
struct HmacSha1 {
    mac: hmac::Hmac<sha1::Sha1>,
}

impl HmacSha1 {
    fn new(key: &[u8]) -> Result<Self> {
        let mac = hmac::Hmac::<sha1::Sha1>::new_from_slice(key)
            .map_err(|_| Error::CryptoError("HMAC-SHA1 key setup failed".into()))?;
        Ok(Self { mac })
    }
}

impl Hmac for HmacSha1 {
    fn update(&mut self, data: &[u8]) {
        self.mac.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.mac.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        20
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha1
    }
}
