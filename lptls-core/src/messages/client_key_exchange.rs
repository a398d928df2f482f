//! ClientKeyExchange message (RSA key transport).
//!
//! Carries the PKCS#1-encrypted premaster secret. The two protocol
//! versions frame it differently:
//!
//! - **TLS 1.0**: the ciphertext gets a u16 length prefix.
//! - **SSL 3.0**: the ciphertext fills the body with no prefix.

use super::Reader;
use crate::error::{Error, Result};
use crate::protocol::ProtocolVersion;

/// ClientKeyExchange message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKeyExchange {
    /// RSA-encrypted premaster secret
    pub encrypted_premaster: Vec<u8>,
}

impl ClientKeyExchange {
    /// Create a ClientKeyExchange message.
    pub fn new(encrypted_premaster: Vec<u8>) -> Self {
        Self { encrypted_premaster }
    }

    /// Encode the message body for a protocol version.
    pub fn encode(&self, version: ProtocolVersion) -> Result<Vec<u8>> {
        if self.encrypted_premaster.is_empty() {
            return Err(Error::protocol("empty encrypted premaster"));
        }

        match version {
            ProtocolVersion::Tls10 => {
                let mut body = Vec::with_capacity(2 + self.encrypted_premaster.len());
                body.extend_from_slice(&(self.encrypted_premaster.len() as u16).to_be_bytes());
                body.extend_from_slice(&self.encrypted_premaster);
                Ok(body)
            },
            ProtocolVersion::Ssl30 => Ok(self.encrypted_premaster.clone()),
        }
    }

    /// Decode a message body for a protocol version.
    pub fn decode(version: ProtocolVersion, data: &[u8]) -> Result<Self> {
        let encrypted_premaster = match version {
            ProtocolVersion::Tls10 => {
                let mut reader = Reader::new(data);
                let len = reader.u16("encrypted premaster length")? as usize;
                let ciphertext = reader.take(len, "encrypted premaster")?.to_vec();
                reader.finish("ClientKeyExchange")?;
                ciphertext
            },
            ProtocolVersion::Ssl30 => data.to_vec(),
        };

        if encrypted_premaster.is_empty() {
            return Err(Error::protocol("empty encrypted premaster"));
        }

        Ok(Self { encrypted_premaster })
    }
}
