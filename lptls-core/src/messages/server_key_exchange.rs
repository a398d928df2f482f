//! ServerKeyExchange message (export RSA).
//!
//! Sent only when an export cipher suite is negotiated and the server's
//! certified key exceeds the 512-bit export limit. It carries an
//! ephemeral RSA key, signed by the certified key over a digest that
//! binds both hello randoms:
//!
//! ```text
//! struct {
//!     opaque rsa_modulus<1..2^16-1>;
//!     opaque rsa_exponent<1..2^16-1>;
//!     opaque signature<0..2^16-1>;
//! } ServerKeyExchange;
//! ```

use super::Reader;
use crate::error::{Error, Result};

/// ServerKeyExchange message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerKeyExchange {
    /// Ephemeral RSA modulus, big-endian
    pub modulus: Vec<u8>,
    /// Ephemeral RSA public exponent, big-endian
    pub exponent: Vec<u8>,
    /// PKCS#1 v1.5 signature over MD5‖SHA1(randoms ‖ params)
    pub signature: Vec<u8>,
}

impl ServerKeyExchange {
    /// Create a ServerKeyExchange message.
    pub fn new(modulus: Vec<u8>, exponent: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            modulus,
            exponent,
            signature,
        }
    }

    /// The signed parameter bytes: modulus and exponent with their length
    /// prefixes, exactly as they appear on the wire.
    pub fn params_bytes(&self) -> Vec<u8> {
        let mut params = Vec::with_capacity(4 + self.modulus.len() + self.exponent.len());
        params.extend_from_slice(&(self.modulus.len() as u16).to_be_bytes());
        params.extend_from_slice(&self.modulus);
        params.extend_from_slice(&(self.exponent.len() as u16).to_be_bytes());
        params.extend_from_slice(&self.exponent);
        params
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.modulus.is_empty() || self.exponent.is_empty() {
            return Err(Error::protocol("empty RSA parameter"));
        }

        let mut body = self.params_bytes();
        body.extend_from_slice(&(self.signature.len() as u16).to_be_bytes());
        body.extend_from_slice(&self.signature);
        Ok(body)
    }

    /// Decode a message body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let modulus_len = reader.u16("modulus length")? as usize;
        let modulus = reader.take(modulus_len, "modulus")?.to_vec();
        let exponent_len = reader.u16("exponent length")? as usize;
        let exponent = reader.take(exponent_len, "exponent")?.to_vec();
        let signature_len = reader.u16("signature length")? as usize;
        let signature = reader.take(signature_len, "signature")?.to_vec();
        reader.finish("ServerKeyExchange")?;

        if modulus.is_empty() || exponent.is_empty() {
            return Err(Error::protocol("empty RSA parameter"));
        }

        Ok(Self {
            modulus,
            exponent,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let skx = ServerKeyExchange::new(vec![0xC1; 64], vec![1, 0, 1], vec![0xEE; 128]);
        let body = skx.encode().unwrap();
        assert_eq!(ServerKeyExchange::decode(&body).unwrap(), skx);
    }

    #[test]
    fn test_params_bytes_prefix_layout() {
        let skx = ServerKeyExchange::new(vec![0xC1; 64], vec![1, 0, 1], Vec::new());
        let params = skx.params_bytes();
        assert_eq!(&params[..2], &[0, 64]);
        assert_eq!(&params[66..68], &[0, 3]);
        // The signed params are the encoded body minus the signature field.
        let body = skx.encode().unwrap();
        assert_eq!(&body[..params.len()], &params[..]);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let skx = ServerKeyExchange::new(vec![2; 8], vec![3], vec![4; 16]);
        let mut body = skx.encode().unwrap();
        body.push(0);
        assert!(ServerKeyExchange::decode(&body).is_err());
    }
}
