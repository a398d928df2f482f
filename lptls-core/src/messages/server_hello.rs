//! ServerHello message.
//!
//! ```text
//! struct {
//!     ProtocolVersion server_version;
//!     Random random;                        /* 32 bytes */
//!     SessionID session_id<0..32>;
//!     CipherSuite cipher_suite;
//!     CompressionMethod compression_method;
//! } ServerHello;
//! ```

use super::client_hello::COMPRESSION_NULL;
use super::Reader;
use crate::error::{Error, Result};
use crate::protocol::ProtocolVersion;

/// ServerHello message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Negotiated protocol version
    pub version: ProtocolVersion,
    /// Server random
    pub random: [u8; 32],
    /// Session id assigned by the server (opaque to this engine)
    pub session_id: Vec<u8>,
    /// Selected cipher suite id
    pub cipher_suite: u16,
    /// Selected compression method
    pub compression_method: u8,
}

impl ServerHello {
    /// Create a ServerHello selecting `cipher_suite` with null compression.
    pub fn new(version: ProtocolVersion, random: [u8; 32], cipher_suite: u16) -> Self {
        Self {
            version,
            random,
            session_id: Vec::new(),
            cipher_suite,
            compression_method: COMPRESSION_NULL,
        }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.session_id.len() > 32 {
            return Err(Error::protocol("session id longer than 32 bytes"));
        }

        let mut body = Vec::with_capacity(38 + self.session_id.len());
        body.extend_from_slice(&self.version.to_u16().to_be_bytes());
        body.extend_from_slice(&self.random);
        body.push(self.session_id.len() as u8);
        body.extend_from_slice(&self.session_id);
        body.extend_from_slice(&self.cipher_suite.to_be_bytes());
        body.push(self.compression_method);
        Ok(body)
    }

    /// Decode a message body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let version_raw = reader.u16("server version")?;
        let version = ProtocolVersion::from_u16(version_raw).ok_or_else(|| {
            Error::UnsupportedNegotiation(format!("server version {:#06x}", version_raw))
        })?;

        let mut random = [0u8; 32];
        random.copy_from_slice(reader.take(32, "server random")?);

        let session_id_len = reader.u8("session id length")? as usize;
        if session_id_len > 32 {
            return Err(Error::protocol("session id longer than 32 bytes"));
        }
        let session_id = reader.take(session_id_len, "session id")?.to_vec();

        let cipher_suite = reader.u16("cipher suite")?;
        let compression_method = reader.u8("compression method")?;

        // Tolerate trailing extension data, as with ClientHello.
        Ok(Self {
            version,
            random,
            session_id,
            cipher_suite,
            compression_method,
        })
    }
}
