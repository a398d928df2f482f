//! Bridge to the `rsa` crate for PKCS#1 v1.5 key transport and signatures.

use lptls_crypto::{Error, Result, Rsa};
use rand::rngs::OsRng;
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey,
};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};

/// RSA primitive backed by the `rsa` crate.
///
/// Signatures use `Pkcs1v15Sign::new_unprefixed()`: SSL 3.0 / TLS 1.0
/// handshake signatures are computed over a raw MD5‖SHA-1 digest with no
/// DigestInfo structure.
pub(crate) struct RsaBridge;

fn parse_public(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_pkcs1_der(der).map_err(|_| Error::InvalidPublicKey)
}

fn parse_private(der: &[u8]) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_der(der).map_err(|_| Error::InvalidPrivateKey)
}

impl Rsa for RsaBridge {
    fn encrypt_pkcs1(&self, public_key_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let key = parse_public(public_key_der)?;
        key.encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
            .map_err(|_| Error::EncryptionFailed)
    }

    fn decrypt_pkcs1(&self, private_key_der: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let key = parse_private(private_key_der)?;
        key.decrypt(Pkcs1v15Encrypt, ciphertext)
            .map_err(|_| Error::DecryptionFailed)
    }

    fn sign_pkcs1(&self, private_key_der: &[u8], digest: &[u8]) -> Result<Vec<u8>> {
        let key = parse_private(private_key_der)?;
        key.sign(Pkcs1v15Sign::new_unprefixed(), digest)
            .map_err(|e| Error::CryptoError(format!("RSA signing failed: {}", e)))
    }

    fn verify_pkcs1(&self, public_key_der: &[u8], digest: &[u8], signature: &[u8]) -> Result<()> {
        let key = parse_public(public_key_der)?;
        key.verify(Pkcs1v15Sign::new_unprefixed(), digest, signature)
            .map_err(|_| Error::SignatureVerificationFailed)
    }

    fn public_key_parts(&self, public_key_der: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        let key = parse_public(public_key_der)?;
        Ok((key.n().to_bytes_be(), key.e().to_bytes_be()))
    }

    fn public_key_from_parts(&self, modulus: &[u8], exponent: &[u8]) -> Result<Vec<u8>> {
        let key = RsaPublicKey::new(
            BigUint::from_bytes_be(modulus),
            BigUint::from_bytes_be(exponent),
        )
        .map_err(|_| Error::InvalidPublicKey)?;
        let der = key.to_pkcs1_der().map_err(|_| Error::InvalidPublicKey)?;
        Ok(der.as_bytes().to_vec())
    }

    fn generate_keypair(&self, bits: usize) -> Result<(Vec<u8>, Vec<u8>)> {
        let private = RsaPrivateKey::new(&mut OsRng, bits).map_err(|_| Error::KeyGenerationFailed)?;
        let public = RsaPublicKey::from(&private);
        let private_der = private
            .to_pkcs1_der()
            .map_err(|_| Error::KeyGenerationFailed)?;
        let public_der = public
            .to_pkcs1_der()
            .map_err(|_| Error::KeyGenerationFailed)?;
        Ok((private_der.as_bytes().to_vec(), public_der.as_bytes().to_vec()))
    }

    fn modulus_len(&self, public_key_der: &[u8]) -> Result<usize> {
        Ok(parse_public(public_key_der)?.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let bridge = RsaBridge;
        let (private_der, public_der) = bridge.generate_keypair(1024).unwrap();

        let secret = [0x42u8; 48];
        let ciphertext = bridge.encrypt_pkcs1(&public_der, &secret).unwrap();
        assert_eq!(ciphertext.len(), bridge.modulus_len(&public_der).unwrap());

        let recovered = bridge.decrypt_pkcs1(&private_der, &ciphertext).unwrap();
        assert_eq!(recovered, secret);
    }

    #[test]
    fn test_sign_verify_unprefixed() {
        let bridge = RsaBridge;
        let (private_der, public_der) = bridge.generate_keypair(1024).unwrap();

        let digest = [0x36u8; 36]; // MD5 ‖ SHA-1 sized
        let signature = bridge.sign_pkcs1(&private_der, &digest).unwrap();
        bridge.verify_pkcs1(&public_der, &digest, &signature).unwrap();

        let mut bad = digest;
        bad[0] ^= 1;
        assert_eq!(
            bridge.verify_pkcs1(&public_der, &bad, &signature),
            Err(Error::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_public_key_parts_roundtrip() {
        let bridge = RsaBridge;
        let (_, public_der) = bridge.generate_keypair(512).unwrap();
        let (n, e) = bridge.public_key_parts(&public_der).unwrap();
        let rebuilt = bridge.public_key_from_parts(&n, &e).unwrap();
        assert_eq!(rebuilt, public_der);
    }
}
