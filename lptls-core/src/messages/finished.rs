//! Finished message.
//!
//! The body is the raw verify data: 12 bytes under TLS 1.0, 36 bytes
//! (MD5 part ‖ SHA-1 part) under SSL 3.0. Computation and comparison live
//! in [`crate::prf`]; this type only carries the bytes.

use crate::error::{Error, Result};
use crate::prf::finished_len;
use crate::protocol::ProtocolVersion;

/// Finished message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    /// Version-specific verify data
    pub verify_data: Vec<u8>,
}

impl Finished {
    /// Create a Finished message.
    pub fn new(verify_data: Vec<u8>) -> Self {
        Self { verify_data }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.verify_data.clone())
    }

    /// Decode a message body, enforcing the version's verify-data length.
    pub fn decode(version: ProtocolVersion, data: &[u8]) -> Result<Self> {
        let expected = finished_len(version);
        if data.len() != expected {
            return Err(Error::protocol(format!(
                "Finished body must be {} bytes under {}, got {}",
                expected,
                version.name(),
                data.len()
            )));
        }
        Ok(Self {
            verify_data: data.to_vec(),
        })
    }
}
