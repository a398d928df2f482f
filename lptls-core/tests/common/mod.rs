//! Shared fixtures for the integration tests.
//!
//! Certificates are stand-ins: the test validator treats a certificate as
//! the PKCS#1 public-key DER itself, because X.509 parsing lives outside
//! the engine and the engine only ever asks the validator for the key.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::io::Read;
use std::net::TcpStream;

use lptls_core::{CertificatePurpose, CertificateValidator, LocalIdentity};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// An RSA keypair in the wire shapes the engine consumes.
pub struct TestIdentity {
    pub certificate: Vec<u8>,
    pub private_key: Vec<u8>,
}

pub fn generate_identity(bits: usize) -> TestIdentity {
    let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits).expect("rsa keygen");
    let certificate = RsaPublicKey::from(&private)
        .to_pkcs1_der()
        .expect("public der")
        .as_bytes()
        .to_vec();
    let private_key = private
        .to_pkcs1_der()
        .expect("private der")
        .as_bytes()
        .to_vec();
    TestIdentity {
        certificate,
        private_key,
    }
}

impl TestIdentity {
    pub fn local_identity(&self) -> LocalIdentity {
        LocalIdentity::new(vec![self.certificate.clone()], self.private_key.clone())
    }
}

/// Validator that accepts any non-empty chain and can optionally offer a
/// client identity.
#[derive(Default)]
pub struct TestValidator {
    pub client_identity: Option<TestIdentity>,
}

impl TestValidator {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn with_client_identity(identity: TestIdentity) -> Self {
        Self {
            client_identity: Some(identity),
        }
    }
}

impl CertificateValidator for TestValidator {
    fn validate_chain(
        &self,
        chain: &[Vec<u8>],
        _purpose: CertificatePurpose,
        _check_revocation: bool,
    ) -> Result<(), String> {
        if chain.is_empty() {
            Err("empty certificate chain".into())
        } else {
            Ok(())
        }
    }

    fn rsa_public_key(&self, certificate_der: &[u8]) -> Result<Vec<u8>, String> {
        Ok(certificate_der.to_vec())
    }

    fn select_local_certificate(&self, _acceptable_issuers: &[Vec<u8>]) -> Option<LocalIdentity> {
        self.client_identity
            .as_ref()
            .map(TestIdentity::local_identity)
    }
}

/// Validator that rejects every chain.
pub struct RejectingValidator;

impl CertificateValidator for RejectingValidator {
    fn validate_chain(
        &self,
        _chain: &[Vec<u8>],
        _purpose: CertificatePurpose,
        _check_revocation: bool,
    ) -> Result<(), String> {
        Err("not on the allow list".into())
    }

    fn rsa_public_key(&self, certificate_der: &[u8]) -> Result<Vec<u8>, String> {
        Ok(certificate_der.to_vec())
    }

    fn select_local_certificate(&self, _acceptable_issuers: &[Vec<u8>]) -> Option<LocalIdentity> {
        None
    }
}

/// Read exactly one record (header plus fragment) off a stream.
pub fn read_record_bytes(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut header = [0u8; 5];
    stream.read_exact(&mut header)?;
    let length = u16::from_be_bytes([header[3], header[4]]) as usize;
    let mut record = header.to_vec();
    record.resize(5 + length, 0);
    stream.read_exact(&mut record[5..])?;
    Ok(record)
}
