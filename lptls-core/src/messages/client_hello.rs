//! ClientHello message.
//!
//! ```text
//! struct {
//!     ProtocolVersion client_version;
//!     Random random;                        /* 32 bytes */
//!     SessionID session_id<0..32>;
//!     CipherSuite cipher_suites<2..2^16-1>;
//!     CompressionMethod compression_methods<1..2^8-1>;
//! } ClientHello;
//! ```
//!
//! The random is 4 bytes of UNIX time followed by 28 secure-random bytes.
//! Only null compression is ever offered; session IDs are always empty
//! because this engine does not resume sessions.

use super::Reader;
use crate::error::{Error, Result};
use crate::protocol::ProtocolVersion;

/// Null compression method identifier.
pub const COMPRESSION_NULL: u8 = 0;

/// ClientHello message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Highest protocol version the client offers
    pub version: ProtocolVersion,
    /// Client random
    pub random: [u8; 32],
    /// Session id (always empty when sent by this engine)
    pub session_id: Vec<u8>,
    /// Offered cipher suite ids, preference order
    pub cipher_suites: Vec<u16>,
    /// Offered compression methods
    pub compression_methods: Vec<u8>,
}

impl ClientHello {
    /// Create a ClientHello offering `cipher_suites` with null compression.
    pub fn new(version: ProtocolVersion, random: [u8; 32], cipher_suites: Vec<u16>) -> Self {
        Self {
            version,
            random,
            session_id: Vec::new(),
            cipher_suites,
            compression_methods: vec![COMPRESSION_NULL],
        }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.cipher_suites.is_empty() {
            return Err(Error::protocol("ClientHello offers no cipher suites"));
        }
        if self.session_id.len() > 32 {
            return Err(Error::protocol("session id longer than 32 bytes"));
        }

        let mut body = Vec::with_capacity(40 + 2 * self.cipher_suites.len());
        body.extend_from_slice(&self.version.to_u16().to_be_bytes());
        body.extend_from_slice(&self.random);
        body.push(self.session_id.len() as u8);
        body.extend_from_slice(&self.session_id);
        body.extend_from_slice(&((self.cipher_suites.len() * 2) as u16).to_be_bytes());
        for id in &self.cipher_suites {
            body.extend_from_slice(&id.to_be_bytes());
        }
        body.push(self.compression_methods.len() as u8);
        body.extend_from_slice(&self.compression_methods);
        Ok(body)
    }

    /// Decode a message body.
    ///
    /// Trailing bytes are tolerated: later protocol revisions append hello
    /// extensions there, and a peer offering them is still speaking a
    /// well-formed hello.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let version_raw = reader.u16("client version")?;
        let version = ProtocolVersion::from_u16(version_raw).ok_or_else(|| {
            Error::UnsupportedNegotiation(format!("client version {:#06x}", version_raw))
        })?;

        let mut random = [0u8; 32];
        random.copy_from_slice(reader.take(32, "client random")?);

        let session_id_len = reader.u8("session id length")? as usize;
        if session_id_len > 32 {
            return Err(Error::protocol("session id longer than 32 bytes"));
        }
        let session_id = reader.take(session_id_len, "session id")?.to_vec();

        let suites_len = reader.u16("cipher suite list length")? as usize;
        if suites_len == 0 || suites_len % 2 != 0 {
            return Err(Error::protocol("invalid cipher suite list length"));
        }
        let suite_bytes = reader.take(suites_len, "cipher suite list")?;
        let cipher_suites = suite_bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        let compression_len = reader.u8("compression list length")? as usize;
        if compression_len == 0 {
            return Err(Error::protocol("empty compression method list"));
        }
        let compression_methods = reader.take(compression_len, "compression methods")?.to_vec();

        Ok(Self {
            version,
            random,
            session_id,
            cipher_suites,
            compression_methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let hello = ClientHello::new(ProtocolVersion::Tls10, [0xABu8; 32], vec![0x0035, 0x002F]);
        let body = hello.encode().unwrap();

        assert_eq!(&body[..2], &[3, 1]);
        assert_eq!(&body[2..34], &[0xAB; 32]);
        assert_eq!(body[34], 0); // empty session id
        assert_eq!(&body[35..37], &[0, 4]); // two suites
        assert_eq!(&body[37..41], &[0x00, 0x35, 0x00, 0x2F]);
        assert_eq!(&body[41..], &[1, COMPRESSION_NULL]);

        assert_eq!(ClientHello::decode(&body).unwrap(), hello);
    }

    #[test]
    fn test_decode_tolerates_hello_extensions() {
        let hello = ClientHello::new(ProtocolVersion::Tls10, [1u8; 32], vec![0x0004]);
        let mut body = hello.encode().unwrap();
        body.extend_from_slice(&[0x00, 0x04, 0xFF, 0x01, 0x00, 0x00]);
        assert_eq!(ClientHello::decode(&body).unwrap(), hello);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let hello = ClientHello::new(ProtocolVersion::Ssl30, [1u8; 32], vec![0x0035]);
        let body = hello.encode().unwrap();

        // Truncated random
        assert!(ClientHello::decode(&body[..20]).is_err());

        // Odd cipher suite list length
        let mut bad = body.clone();
        bad[35] = 0;
        bad[36] = 3;
        assert!(ClientHello::decode(&bad).is_err());

        // Unknown version is an unsupported negotiation, not a panic
        let mut bad = body;
        bad[0] = 0x04;
        assert!(matches!(
            ClientHello::decode(&bad),
            Err(Error::UnsupportedNegotiation(_))
        ));
    }
}
