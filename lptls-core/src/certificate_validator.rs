//! Certificate trust capability boundary.
//!
//! This engine does not parse X.509. Chain building, trust decisions,
//! revocation checks and key extraction are delegated to a collaborator
//! implementing [`CertificateValidator`]; certificates cross the boundary
//! as opaque DER blobs.

use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// What the peer's chain is being validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificatePurpose {
    /// The chain authenticates a client
    Client,
    /// The chain authenticates a server
    Server,
}

/// A local certificate chain with its private key.
///
/// The private key is mandatory: an identity that cannot sign or decrypt
/// is unusable for every handshake leg that would need it, and this
/// engine treats a keyless identity as a configuration error rather than
/// silently skipping authentication.
pub struct LocalIdentity {
    /// Certificate chain, leaf first, DER encoded
    pub certificate_chain: Vec<Vec<u8>>,
    /// PKCS#1 RSA private key, DER encoded
    pub private_key_der: Zeroizing<Vec<u8>>,
}

impl LocalIdentity {
    /// Create an identity from a chain and its private key.
    pub fn new(certificate_chain: Vec<Vec<u8>>, private_key_der: Vec<u8>) -> Self {
        Self {
            certificate_chain,
            private_key_der: Zeroizing::new(private_key_der),
        }
    }

    /// The leaf certificate.
    pub fn leaf(&self) -> Result<&[u8]> {
        self.certificate_chain
            .first()
            .map(Vec::as_slice)
            .ok_or_else(|| Error::ConfigurationError("identity has no certificate".into()))
    }
}

impl std::fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdentity")
            .field("certificates", &self.certificate_chain.len())
            .finish_non_exhaustive()
    }
}

/// Trust collaborator interface.
pub trait CertificateValidator: Send + Sync {
    /// Validate an ordered certificate chain (leaf first) for a purpose.
    ///
    /// A rejection reason becomes an [`Error::UntrustedPeer`] and fatally
    /// ends the handshake. `check_revocation` asks the collaborator to
    /// consult revocation data; the engine has no opinion on how.
    fn validate_chain(
        &self,
        chain: &[Vec<u8>],
        purpose: CertificatePurpose,
        check_revocation: bool,
    ) -> std::result::Result<(), String>;

    /// Extract the RSA public key of a certificate as PKCS#1 DER.
    fn rsa_public_key(&self, certificate_der: &[u8]) -> std::result::Result<Vec<u8>, String>;

    /// Select a local identity acceptable to the given issuers.
    ///
    /// `acceptable_issuers` are the opaque distinguished names from a
    /// CertificateRequest; an empty list means any issuer. `None` means
    /// no usable identity exists.
    fn select_local_certificate(&self, acceptable_issuers: &[Vec<u8>]) -> Option<LocalIdentity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_leaf() {
        let identity = LocalIdentity::new(vec![vec![1, 2], vec![3]], vec![9; 4]);
        assert_eq!(identity.leaf().unwrap(), &[1, 2]);

        let empty = LocalIdentity::new(Vec::new(), vec![9; 4]);
        assert!(empty.leaf().is_err());
    }
}
