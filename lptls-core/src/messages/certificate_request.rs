//! CertificateRequest message.
//!
//! ```text
//! struct {
//!     ClientCertificateType certificate_types<1..2^8-1>;
//!     DistinguishedName certificate_authorities<3..2^16-1>;
//! } CertificateRequest;
//! ```
//!
//! Each DistinguishedName is an opaque DER blob with a u16 length prefix.
//! Only `rsa_sign` clients can answer usefully in this engine.

use super::Reader;
use crate::error::{Error, Result};

/// The rsa_sign client certificate type.
pub const CERT_TYPE_RSA_SIGN: u8 = 1;

/// CertificateRequest message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Acceptable certificate types
    pub certificate_types: Vec<u8>,
    /// Acceptable issuer distinguished names (opaque DER)
    pub distinguished_names: Vec<Vec<u8>>,
}

impl CertificateRequest {
    /// Create a request for rsa_sign certificates from the given issuers.
    pub fn new(distinguished_names: Vec<Vec<u8>>) -> Self {
        Self {
            certificate_types: vec![CERT_TYPE_RSA_SIGN],
            distinguished_names,
        }
    }

    /// Whether the request admits an RSA signing certificate.
    pub fn accepts_rsa_sign(&self) -> bool {
        self.certificate_types.contains(&CERT_TYPE_RSA_SIGN)
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.certificate_types.is_empty() {
            return Err(Error::protocol("no certificate types in request"));
        }

        let names_len: usize = self.distinguished_names.iter().map(|dn| 2 + dn.len()).sum();
        if names_len > 0xFFFF {
            return Err(Error::protocol("distinguished name list too large"));
        }

        let mut body = Vec::with_capacity(3 + self.certificate_types.len() + names_len);
        body.push(self.certificate_types.len() as u8);
        body.extend_from_slice(&self.certificate_types);
        body.extend_from_slice(&(names_len as u16).to_be_bytes());
        for dn in &self.distinguished_names {
            body.extend_from_slice(&(dn.len() as u16).to_be_bytes());
            body.extend_from_slice(dn);
        }
        Ok(body)
    }

    /// Decode a message body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let types_len = reader.u8("certificate type count")? as usize;
        if types_len == 0 {
            return Err(Error::protocol("no certificate types in request"));
        }
        let certificate_types = reader.take(types_len, "certificate types")?.to_vec();

        let names_len = reader.u16("distinguished name list length")? as usize;
        let names_data = reader.take(names_len, "distinguished names")?;
        reader.finish("CertificateRequest")?;

        let mut names = Reader::new(names_data);
        let mut distinguished_names = Vec::new();
        while names.remaining() > 0 {
            let len = names.u16("distinguished name length")? as usize;
            distinguished_names.push(names.take(len, "distinguished name")?.to_vec());
        }

        Ok(Self {
            certificate_types,
            distinguished_names,
        })
    }
}
