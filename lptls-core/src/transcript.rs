//! Handshake transcript management.
//!
//! The transcript is the append-only concatenation of every framed
//! handshake message exchanged (type byte + 3-byte length + body; record
//! framing excluded), in the exact order sent and received. It is the sole
//! input to the Finished digests and CertificateVerify signatures, so any
//! reordering or omission shows up as an authentication failure on the
//! other side.

use lptls_crypto::{CryptoProvider, HashAlgorithm};

use crate::error::Result;

/// Append-only handshake transcript.
#[derive(Debug, Clone, Default)]
pub struct HandshakeTranscript {
    buffer: Vec<u8>,
    message_count: usize,
}

impl HandshakeTranscript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one framed handshake message.
    pub fn update(&mut self, message: &[u8]) {
        self.buffer.extend_from_slice(message);
        self.message_count += 1;
    }

    /// The raw transcript bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of messages appended so far.
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    /// Check if the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Digest the transcript with one hash algorithm.
    pub fn digest(
        &self,
        provider: &dyn CryptoProvider,
        algorithm: HashAlgorithm,
    ) -> Result<Vec<u8>> {
        let mut hash = provider.hash(algorithm)?;
        hash.update(&self.buffer);
        Ok(hash.finalize())
    }

    /// Clear the transcript. Only valid when a new session begins.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.message_count = 0;
    }
}
