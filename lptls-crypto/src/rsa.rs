//! RSA key transport and signature interface.
//!
//! The supported cipher suites all use RSA key exchange: the client
//! encrypts the premaster secret under the server's public key with
//! PKCS#1 v1.5 padding. Handshake signatures (ServerKeyExchange for
//! export suites, CertificateVerify for client authentication) are
//! PKCS#1 v1.5 signatures over a raw MD5‖SHA-1 digest with no DigestInfo
//! prefix, which is the TLS-style "unprefixed" signing operation.
//!
//! Keys cross this boundary as DER: PKCS#1 `RSAPublicKey` /
//! `RSAPrivateKey` encodings. The protocol engine never inspects them.

use crate::Result;

/// RSA primitive trait.
pub trait Rsa: Send + Sync {
    /// Encrypt `plaintext` under `public_key_der` with PKCS#1 v1.5 padding.
    ///
    /// Used for premaster-secret key transport.
    fn encrypt_pkcs1(&self, public_key_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a PKCS#1 v1.5 ciphertext with `private_key_der`.
    fn decrypt_pkcs1(&self, private_key_der: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Sign a raw digest with PKCS#1 v1.5 padding and no DigestInfo prefix.
    ///
    /// `digest` is the 36-byte MD5‖SHA-1 concatenation the handshake
    /// signatures are defined over.
    fn sign_pkcs1(&self, private_key_der: &[u8], digest: &[u8]) -> Result<Vec<u8>>;

    /// Verify an unprefixed PKCS#1 v1.5 signature over `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureVerificationFailed`](crate::Error) if the
    /// signature does not verify.
    fn verify_pkcs1(&self, public_key_der: &[u8], digest: &[u8], signature: &[u8]) -> Result<()>;

    /// Split a PKCS#1 public key into big-endian (modulus, exponent) bytes.
    ///
    /// Used to build the export ServerKeyExchange parameters.
    fn public_key_parts(&self, public_key_der: &[u8]) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Assemble a PKCS#1 public key from big-endian modulus and exponent.
    ///
    /// Used by the client to encrypt under explicit ServerKeyExchange
    /// parameters.
    fn public_key_from_parts(&self, modulus: &[u8], exponent: &[u8]) -> Result<Vec<u8>>;

    /// Generate an RSA keypair of `bits` modulus length.
    ///
    /// Returns `(private_key_der, public_key_der)`. Used for the ephemeral
    /// 512-bit key of an export ServerKeyExchange.
    fn generate_keypair(&self, bits: usize) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Modulus length in bytes of a PKCS#1 public key.
    fn modulus_len(&self, public_key_der: &[u8]) -> Result<usize>;
}
