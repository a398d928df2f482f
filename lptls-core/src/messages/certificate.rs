//! Certificate message.
//!
//! ```text
//! opaque ASN.1Cert<1..2^24-1>;
//! struct {
//!     ASN.1Cert certificate_list<0..2^24-1>;
//! } Certificate;
//! ```
//!
//! The chain is ordered sender's-certificate-first. Certificates are
//! opaque DER blobs to this engine; interpretation belongs to the trust
//! collaborator. An empty list is legal: a TLS 1.0 client without a
//! certificate answers a CertificateRequest with it.

use super::Reader;
use crate::error::{Error, Result};

/// Certificate message body: an ordered chain of DER certificates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CertificateChain {
    /// DER certificates, leaf first
    pub certificates: Vec<Vec<u8>>,
}

impl CertificateChain {
    /// Create a certificate message.
    pub fn new(certificates: Vec<Vec<u8>>) -> Self {
        Self { certificates }
    }

    /// Create the empty chain a certificate-less TLS client sends.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let total: usize = self.certificates.iter().map(|cert| 3 + cert.len()).sum();
        if total > 0x00FF_FFFF {
            return Err(Error::protocol("certificate chain too large"));
        }

        let mut body = Vec::with_capacity(3 + total);
        body.extend_from_slice(&u24_bytes(total));
        for cert in &self.certificates {
            if cert.is_empty() {
                return Err(Error::protocol("empty certificate in chain"));
            }
            body.extend_from_slice(&u24_bytes(cert.len()));
            body.extend_from_slice(cert);
        }
        Ok(body)
    }

    /// Decode a message body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let total = reader.u24("certificate list length")?;
        if total != reader.remaining() {
            return Err(Error::protocol("certificate list length mismatch"));
        }

        let mut list = Reader::new(reader.rest());
        let mut certificates = Vec::new();
        while list.remaining() > 0 {
            let len = list.u24("certificate length")?;
            if len == 0 {
                return Err(Error::protocol("empty certificate in chain"));
            }
            certificates.push(list.take(len, "certificate")?.to_vec());
        }

        Ok(Self { certificates })
    }
}

fn u24_bytes(value: usize) -> [u8; 3] {
    [
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_encode_decode() {
        let chain = CertificateChain::new(vec![vec![0x30, 0x82, 0x01], vec![0x30, 0x10]]);
        let body = chain.encode().unwrap();
        assert_eq!(&body[..3], &[0, 0, 11]); // 3+3 + 3+2
        assert_eq!(CertificateChain::decode(&body).unwrap(), chain);
    }

    #[test]
    fn test_empty_chain() {
        let body = CertificateChain::empty().encode().unwrap();
        assert_eq!(body, vec![0, 0, 0]);
        assert!(CertificateChain::decode(&body).unwrap().is_empty());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let chain = CertificateChain::new(vec![vec![1, 2, 3]]);
        let mut body = chain.encode().unwrap();
        body[2] += 1;
        assert!(CertificateChain::decode(&body).is_err());
        body[2] -= 2;
        assert!(CertificateChain::decode(&body).is_err());
    }
}
