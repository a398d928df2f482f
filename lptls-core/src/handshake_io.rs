//! Handshake message framing and reassembly.
//!
//! Handshake messages are framed independently of records:
//!
//! ```text
//! struct {
//!     HandshakeType msg_type;   /* 1 byte */
//!     uint24 length;            /* big-endian */
//!     opaque body[length];
//! } Handshake;
//! ```
//!
//! The length is back-patched after the body is built, never computed
//! incrementally. Several handshake messages may share one record, and a
//! message may span records; [`HandshakeReassembler`] buffers record
//! fragments and yields complete messages in arrival order.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::HandshakeType;

/// Handshake framing overhead: type byte plus 3-byte length.
pub const HANDSHAKE_HEADER_SIZE: usize = 4;

/// One framed handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// Message type tag
    pub msg_type: HandshakeType,
    /// Message body, without framing
    pub payload: Vec<u8>,
}

impl HandshakeMessage {
    /// Create a new handshake message.
    pub fn new(msg_type: HandshakeType, payload: Vec<u8>) -> Self {
        Self { msg_type, payload }
    }

    /// Encode the message with its framing header.
    ///
    /// The three length bytes are reserved up front and overwritten once
    /// the body is in place.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.payload.len() > 0x00FF_FFFF {
            return Err(Error::protocol_in(self.msg_type, "handshake message too large"));
        }

        let mut buf = BytesMut::with_capacity(HANDSHAKE_HEADER_SIZE + self.payload.len());
        buf.put_u8(self.msg_type.to_u8());
        buf.put_bytes(0, 3);
        buf.put_slice(&self.payload);

        // Back-patch the u24 length now that the body length is known.
        let len = self.payload.len();
        buf[1] = ((len >> 16) & 0xFF) as u8;
        buf[2] = ((len >> 8) & 0xFF) as u8;
        buf[3] = (len & 0xFF) as u8;

        Ok(buf.to_vec())
    }

    /// Decode exactly one framed message.
    ///
    /// Fails if the buffer holds anything other than one complete message.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < HANDSHAKE_HEADER_SIZE {
            return Err(Error::protocol("handshake message truncated"));
        }

        let type_raw = data.get_u8();
        let msg_type = HandshakeType::from_u8(type_raw)
            .ok_or_else(|| Error::protocol(format!("unknown handshake type {}", type_raw)))?;

        let length = ((data.get_u8() as usize) << 16)
            | ((data.get_u8() as usize) << 8)
            | data.get_u8() as usize;

        if data.len() != length {
            return Err(Error::protocol_in(
                msg_type,
                format!("body length {} does not match frame length {}", data.len(), length),
            ));
        }

        Ok(Self {
            msg_type,
            payload: data.to_vec(),
        })
    }
}

/// Incremental handshake message reassembler.
///
/// Record fragments of handshake content go in; complete messages come
/// out in order. Anything left over waits for the next fragment.
#[derive(Debug, Default)]
pub struct HandshakeReassembler {
    buffer: BytesMut,
}

impl HandshakeReassembler {
    /// Create an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record fragment of handshake data.
    pub fn push(&mut self, fragment: &[u8]) {
        self.buffer.extend_from_slice(fragment);
    }

    /// Pop the next complete message, if one has fully arrived.
    pub fn next_message(&mut self) -> Result<Option<HandshakeMessage>> {
        if self.buffer.len() < HANDSHAKE_HEADER_SIZE {
            return Ok(None);
        }

        let length = ((self.buffer[1] as usize) << 16)
            | ((self.buffer[2] as usize) << 8)
            | self.buffer[3] as usize;

        if self.buffer.len() < HANDSHAKE_HEADER_SIZE + length {
            return Ok(None);
        }

        let frame = self.buffer.split_to(HANDSHAKE_HEADER_SIZE + length);
        let message = HandshakeMessage::decode(&frame)?;
        Ok(Some(message))
    }

    /// Check whether buffered bytes remain (an incomplete trailing
    /// message, or messages not yet popped).
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_back_patches_length() {
        let msg = HandshakeMessage::new(HandshakeType::ClientHello, vec![0xAA; 300]);
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded[0], 1);
        assert_eq!(&encoded[1..4], &[0x00, 0x01, 0x2C]); // 300
        assert_eq!(encoded.len(), 304);
    }

    #[test]
    fn test_decode_requires_exact_length() {
        let msg = HandshakeMessage::new(HandshakeType::Finished, vec![1; 12]);
        let mut encoded = msg.encode().unwrap();
        assert_eq!(HandshakeMessage::decode(&encoded).unwrap(), msg);

        encoded.push(0);
        assert!(HandshakeMessage::decode(&encoded).is_err());
        assert!(HandshakeMessage::decode(&encoded[..15]).is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(HandshakeMessage::decode(&[99, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_reassembles_split_and_coalesced_messages() {
        let first = HandshakeMessage::new(HandshakeType::ServerHello, vec![1, 2, 3]);
        let second = HandshakeMessage::new(HandshakeType::ServerHelloDone, Vec::new());
        let stream = [first.encode().unwrap(), second.encode().unwrap()].concat();

        // Deliver in awkward slices: mid-header and mid-body splits.
        let mut reassembler = HandshakeReassembler::new();
        reassembler.push(&stream[..2]);
        assert!(reassembler.next_message().unwrap().is_none());
        reassembler.push(&stream[2..5]);
        assert!(reassembler.next_message().unwrap().is_none());
        reassembler.push(&stream[5..]);

        assert_eq!(reassembler.next_message().unwrap().unwrap(), first);
        assert_eq!(reassembler.next_message().unwrap().unwrap(), second);
        assert!(reassembler.next_message().unwrap().is_none());
        assert!(reassembler.is_empty());
    }
}
