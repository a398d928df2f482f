//! CertificateVerify message.
//!
//! Proves possession of the client certificate's private key with a
//! PKCS#1 v1.5 signature over the version-specific transcript digest,
//! framed with a u16 length prefix.

use super::Reader;
use crate::error::{Error, Result};

/// CertificateVerify message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateVerify {
    /// PKCS#1 v1.5 signature over the transcript digest
    pub signature: Vec<u8>,
}

impl CertificateVerify {
    /// Create a CertificateVerify message.
    pub fn new(signature: Vec<u8>) -> Self {
        Self { signature }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.signature.is_empty() {
            return Err(Error::protocol("empty signature"));
        }

        let mut body = Vec::with_capacity(2 + self.signature.len());
        body.extend_from_slice(&(self.signature.len() as u16).to_be_bytes());
        body.extend_from_slice(&self.signature);
        Ok(body)
    }

    /// Decode a message body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let len = reader.u16("signature length")? as usize;
        let signature = reader.take(len, "signature")?.to_vec();
        reader.finish("CertificateVerify")?;

        if signature.is_empty() {
            return Err(Error::protocol("empty signature"));
        }

        Ok(Self { signature })
    }
}
