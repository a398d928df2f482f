//! ServerHelloDone message: an empty body marking the end of the server's
//! first flight.

use crate::error::{Error, Result};

/// ServerHelloDone message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerHelloDone;

impl ServerHelloDone {
    /// Encode the (empty) message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    /// Decode a message body, which must be empty.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if !data.is_empty() {
            return Err(Error::protocol("ServerHelloDone body must be empty"));
        }
        Ok(Self)
    }
}
