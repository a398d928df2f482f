//! Record layer framing.
//!
//! One record on the wire:
//!
//! ```text
//! struct {
//!     ContentType type;        /* 1 byte  */
//!     uint8 version_major;
//!     uint8 version_minor;
//!     uint16 length;           /* big-endian */
//!     opaque fragment[length];
//! } SecureRecord;
//! ```
//!
//! Records are ephemeral: one is constructed per read/write call and never
//! retained.

use crate::error::{Error, Result};
use crate::protocol::{ContentType, ProtocolVersion};

/// Maximum plaintext fragment size (2^14).
pub const MAX_FRAGMENT_SIZE: usize = 16384;

/// Maximum ciphertext fragment size: plaintext plus MAC and CBC padding
/// headroom (2^14 + 2048).
pub const MAX_CIPHERTEXT_SIZE: usize = MAX_FRAGMENT_SIZE + 2048;

/// Record header size (5 bytes).
pub const RECORD_HEADER_SIZE: usize = 5;

/// One record of the wire protocol.
#[derive(Debug, Clone)]
pub struct SecureRecord {
    /// Content type
    pub content_type: ContentType,

    /// Protocol version
    pub version: ProtocolVersion,

    /// Fragment: plaintext or ciphertext depending on the record layer
    /// state it passed through
    pub fragment: Vec<u8>,
}

impl SecureRecord {
    /// Create a new record.
    pub fn new(content_type: ContentType, version: ProtocolVersion, fragment: Vec<u8>) -> Self {
        Self {
            content_type,
            version,
            fragment,
        }
    }

    /// Total encoded length (header plus fragment).
    pub fn len(&self) -> usize {
        RECORD_HEADER_SIZE + self.fragment.len()
    }

    /// Check if the fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    /// Encode the record to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.fragment.len() > MAX_CIPHERTEXT_SIZE {
            return Err(Error::protocol("record fragment too large"));
        }

        let mut buf = Vec::with_capacity(self.len());
        buf.push(self.content_type.to_u8());
        buf.push(self.version.major());
        buf.push(self.version.minor());
        buf.extend_from_slice(&(self.fragment.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.fragment);
        Ok(buf)
    }

    /// Decode one complete record from bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (content_type, version, length) = Self::decode_header(data)?;

        if data.len() < RECORD_HEADER_SIZE + length {
            return Err(Error::protocol("incomplete record"));
        }

        Ok(Self {
            content_type,
            version,
            fragment: data[RECORD_HEADER_SIZE..RECORD_HEADER_SIZE + length].to_vec(),
        })
    }

    /// Decode and validate a record header, returning the fragment length.
    pub fn decode_header(data: &[u8]) -> Result<(ContentType, ProtocolVersion, usize)> {
        if data.len() < RECORD_HEADER_SIZE {
            return Err(Error::protocol("record header truncated"));
        }

        let content_type = ContentType::from_u8(data[0])
            .ok_or_else(|| Error::protocol(format!("invalid content type {}", data[0])))?;

        let version_raw = u16::from_be_bytes([data[1], data[2]]);
        let version = ProtocolVersion::from_u16(version_raw).ok_or_else(|| {
            Error::protocol(format!("invalid record version {:#06x}", version_raw))
        })?;

        let length = u16::from_be_bytes([data[3], data[4]]) as usize;
        if length > MAX_CIPHERTEXT_SIZE {
            return Err(Error::protocol("record overflow"));
        }

        Ok((content_type, version, length))
    }
}
