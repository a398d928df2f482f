//! Key schedule: master secret and key block derivation.
//!
//! The key block is sliced in a fixed order for both protocol versions:
//!
//! ```text
//! client-MAC-secret ‖ server-MAC-secret ‖
//! client-write-key  ‖ server-write-key  ‖
//! [client-write-IV  ‖ server-write-IV]      (non-exportable block suites)
//! ```
//!
//! Export suites carry short key material in the block and re-expand it
//! into full-size write keys (and derive IVs from the randoms alone) with
//! version-specific constructions.

use lptls_crypto::CryptoProvider;
use zeroize::Zeroizing;

use crate::cipher::CipherSuite;
use crate::error::{Error, Result};
use crate::prf::{ssl30_expand, tls10_prf};
use crate::protocol::{ProtocolVersion, Role};

/// Master secret length for both protocol versions.
pub const MASTER_SECRET_LEN: usize = 48;

/// Premaster secret length for RSA key exchange: 2 version bytes plus 46
/// random bytes.
pub const PREMASTER_SECRET_LEN: usize = 48;

/// Session key material, populated exactly once per handshake.
///
/// The premaster secret never appears here: [`derive`] consumes and
/// zeroizes it, and everything below is computed from the master secret.
pub struct SecureKeyInfo {
    /// Client hello random (32 bytes)
    pub client_random: [u8; 32],
    /// Server hello random (32 bytes)
    pub server_random: [u8; 32],
    master_secret: Zeroizing<Vec<u8>>,
    client_mac_secret: Zeroizing<Vec<u8>>,
    server_mac_secret: Zeroizing<Vec<u8>>,
    client_write_key: Zeroizing<Vec<u8>>,
    server_write_key: Zeroizing<Vec<u8>>,
    client_write_iv: Zeroizing<Vec<u8>>,
    server_write_iv: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for SecureKeyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of debug output.
        f.debug_struct("SecureKeyInfo").finish_non_exhaustive()
    }
}

impl SecureKeyInfo {
    /// The 48-byte master secret.
    pub fn master_secret(&self) -> &[u8] {
        &self.master_secret
    }

    /// MAC secret for records written by `writer`.
    pub fn mac_secret(&self, writer: Role) -> &[u8] {
        match writer {
            Role::Client => &self.client_mac_secret,
            Role::Server => &self.server_mac_secret,
        }
    }

    /// Write key for records written by `writer`.
    pub fn write_key(&self, writer: Role) -> &[u8] {
        match writer {
            Role::Client => &self.client_write_key,
            Role::Server => &self.server_write_key,
        }
    }

    /// Write IV for records written by `writer`; empty for stream suites.
    pub fn write_iv(&self, writer: Role) -> &[u8] {
        match writer {
            Role::Client => &self.client_write_iv,
            Role::Server => &self.server_write_iv,
        }
    }
}

/// Concatenate two 32-byte randoms.
fn join_randoms(first: &[u8; 32], second: &[u8; 32]) -> [u8; 64] {
    let mut joined = [0u8; 64];
    joined[..32].copy_from_slice(first);
    joined[32..].copy_from_slice(second);
    joined
}

/// Derive the master secret and full key material for a session.
///
/// Consumes the premaster secret; it is zeroized on return and not
/// retained anywhere. Deterministic for fixed inputs.
pub fn derive(
    provider: &dyn CryptoProvider,
    version: ProtocolVersion,
    suite: &CipherSuite,
    premaster: Zeroizing<Vec<u8>>,
    client_random: [u8; 32],
    server_random: [u8; 32],
) -> Result<SecureKeyInfo> {
    if premaster.len() != PREMASTER_SECRET_LEN {
        return Err(Error::CryptoError(format!(
            "premaster secret must be {} bytes, got {}",
            PREMASTER_SECRET_LEN,
            premaster.len()
        )));
    }

    let client_server = join_randoms(&client_random, &server_random);
    let server_client = join_randoms(&server_random, &client_random);

    let master_secret = Zeroizing::new(match version {
        ProtocolVersion::Tls10 => tls10_prf(
            provider,
            &premaster,
            b"master secret",
            &client_server,
            MASTER_SECRET_LEN,
        )?,
        ProtocolVersion::Ssl30 => {
            ssl30_expand(provider, &premaster, &client_server, MASTER_SECRET_LEN)?
        },
    });
    drop(premaster);

    let key_block = Zeroizing::new(match version {
        ProtocolVersion::Tls10 => tls10_prf(
            provider,
            &master_secret,
            b"key expansion",
            &server_client,
            suite.key_block_len(),
        )?,
        ProtocolVersion::Ssl30 => ssl30_expand(
            provider,
            &master_secret,
            &server_client,
            suite.key_block_len(),
        )?,
    });

    // Fixed slicing order.
    let hash_size = suite.hash_size();
    let key_size = suite.key_material;
    let mut offset = 0;
    let mut take = |len: usize| {
        let slice = key_block[offset..offset + len].to_vec();
        offset += len;
        Zeroizing::new(slice)
    };

    let client_mac_secret = take(hash_size);
    let server_mac_secret = take(hash_size);
    let client_key = take(key_size);
    let server_key = take(key_size);

    let (client_write_key, server_write_key, client_write_iv, server_write_iv) =
        if suite.exportable {
            export_expand(
                provider,
                version,
                suite,
                &client_key,
                &server_key,
                &client_server,
                &server_client,
            )?
        } else {
            let client_iv = take(suite.iv_size);
            let server_iv = take(suite.iv_size);
            (client_key, server_key, client_iv, server_iv)
        };

    Ok(SecureKeyInfo {
        client_random,
        server_random,
        master_secret,
        client_mac_secret,
        server_mac_secret,
        client_write_key,
        server_write_key,
        client_write_iv,
        server_write_iv,
    })
}

/// Expand export-suite key material into final write keys and IVs.
#[allow(clippy::type_complexity)]
fn export_expand(
    provider: &dyn CryptoProvider,
    version: ProtocolVersion,
    suite: &CipherSuite,
    client_key: &[u8],
    server_key: &[u8],
    client_server: &[u8; 64],
    server_client: &[u8; 64],
) -> Result<(
    Zeroizing<Vec<u8>>,
    Zeroizing<Vec<u8>>,
    Zeroizing<Vec<u8>>,
    Zeroizing<Vec<u8>>,
)> {
    let expanded = suite.expanded_key_material;
    let iv_size = suite.iv_size;

    match version {
        ProtocolVersion::Tls10 => {
            let client_write_key = Zeroizing::new(tls10_prf(
                provider,
                client_key,
                b"client write key",
                client_server,
                expanded,
            )?);
            let server_write_key = Zeroizing::new(tls10_prf(
                provider,
                server_key,
                b"server write key",
                client_server,
                expanded,
            )?);

            let (client_iv, server_iv) = if iv_size > 0 {
                let iv_block =
                    tls10_prf(provider, &[], b"IV block", client_server, 2 * iv_size)?;
                (
                    Zeroizing::new(iv_block[..iv_size].to_vec()),
                    Zeroizing::new(iv_block[iv_size..].to_vec()),
                )
            } else {
                (Zeroizing::new(Vec::new()), Zeroizing::new(Vec::new()))
            };

            Ok((client_write_key, server_write_key, client_iv, server_iv))
        },
        ProtocolVersion::Ssl30 => {
            let md5_truncated = |parts: &[&[u8]], len: usize| -> Result<Zeroizing<Vec<u8>>> {
                let mut hash = provider.hash(lptls_crypto::HashAlgorithm::Md5)?;
                for part in parts {
                    hash.update(part);
                }
                let mut digest = Zeroizing::new(hash.finalize());
                digest.truncate(len);
                Ok(digest)
            };

            let client_write_key = md5_truncated(&[client_key, client_server], expanded)?;
            let server_write_key = md5_truncated(&[server_key, server_client], expanded)?;

            let (client_iv, server_iv) = if iv_size > 0 {
                (
                    md5_truncated(&[client_server], iv_size)?,
                    md5_truncated(&[server_client], iv_size)?,
                )
            } else {
                (Zeroizing::new(Vec::new()), Zeroizing::new(Vec::new()))
            };

            Ok((client_write_key, server_write_key, client_iv, server_iv))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher;
    use lptls_crypto::CryptoProvider as _;
    use lptls_crypto_rustcrypto::RustCryptoProvider;

    fn fixed_inputs() -> (Zeroizing<Vec<u8>>, [u8; 32], [u8; 32]) {
        let mut premaster = vec![0u8; PREMASTER_SECRET_LEN];
        premaster[0] = 0x03;
        premaster[1] = 0x01;
        for (i, byte) in premaster.iter_mut().enumerate().skip(2) {
            *byte = i as u8;
        }
        (Zeroizing::new(premaster), [0x11; 32], [0x22; 32])
    }

    #[test]
    fn test_derive_deterministic() {
        let provider = RustCryptoProvider::new();
        let suite = cipher::CipherSuite::lookup(0x002F).unwrap();

        for version in [ProtocolVersion::Tls10, ProtocolVersion::Ssl30] {
            let (premaster, cr, sr) = fixed_inputs();
            let a = derive(&provider, version, suite, premaster, cr, sr).unwrap();
            let (premaster, cr, sr) = fixed_inputs();
            let b = derive(&provider, version, suite, premaster, cr, sr).unwrap();

            assert_eq!(a.master_secret(), b.master_secret());
            assert_eq!(a.write_key(Role::Client), b.write_key(Role::Client));
            assert_eq!(a.write_iv(Role::Server), b.write_iv(Role::Server));
        }
    }

    #[test]
    fn test_derived_lengths_match_suite() {
        let provider = RustCryptoProvider::new();
        for suite in cipher::SUPPORTED_SUITES {
            for version in [ProtocolVersion::Tls10, ProtocolVersion::Ssl30] {
                let (premaster, cr, sr) = fixed_inputs();
                let keys = derive(&provider, version, suite, premaster, cr, sr).unwrap();

                assert_eq!(keys.master_secret().len(), MASTER_SECRET_LEN);
                assert_eq!(keys.mac_secret(Role::Client).len(), suite.hash_size());
                assert_eq!(keys.mac_secret(Role::Server).len(), suite.hash_size());
                assert_eq!(
                    keys.write_key(Role::Client).len(),
                    suite.expanded_key_material,
                    "{} {:?}",
                    suite.name,
                    version
                );
                assert_eq!(keys.write_iv(Role::Client).len(), suite.iv_size);
                assert_eq!(keys.write_iv(Role::Server).len(), suite.iv_size);
            }
        }
    }

    /// The TLS 1.0 master secret is a straight PRF call; check the
    /// derivation against the formula.
    #[test]
    fn test_tls10_master_secret_formula() {
        let provider = RustCryptoProvider::new();
        let suite = cipher::CipherSuite::lookup(0x0005).unwrap();
        let (premaster, cr, sr) = fixed_inputs();

        let mut seed = Vec::new();
        seed.extend_from_slice(&cr);
        seed.extend_from_slice(&sr);
        let expected = tls10_prf(&provider, &premaster, b"master secret", &seed, 48).unwrap();

        let keys = derive(&provider, ProtocolVersion::Tls10, suite, premaster, cr, sr).unwrap();
        assert_eq!(keys.master_secret(), &expected[..]);
    }

    /// Key expansion seeds with server_random first; swapping the randoms
    /// must change the key block but master-secret seeding is the mirror.
    #[test]
    fn test_random_order_matters() {
        let provider = RustCryptoProvider::new();
        let suite = cipher::CipherSuite::lookup(0x0035).unwrap();

        let (premaster, cr, sr) = fixed_inputs();
        let forward = derive(&provider, ProtocolVersion::Tls10, suite, premaster, cr, sr).unwrap();
        let (premaster, cr, sr) = fixed_inputs();
        let swapped = derive(&provider, ProtocolVersion::Tls10, suite, premaster, sr, cr).unwrap();

        assert_ne!(forward.master_secret(), swapped.master_secret());
        assert_ne!(forward.write_key(Role::Client), swapped.write_key(Role::Client));
    }

    #[test]
    fn test_premaster_length_enforced() {
        let provider = RustCryptoProvider::new();
        let suite = cipher::CipherSuite::lookup(0x002F).unwrap();
        let premaster = Zeroizing::new(vec![0u8; 47]);
        let result = derive(
            &provider,
            ProtocolVersion::Tls10,
            suite,
            premaster,
            [0; 32],
            [0; 32],
        );
        assert!(result.is_err());
    }
}
