//! Secret expansion and handshake digests.
//!
//! Both protocol versions derive all key material from a 48-byte master
//! secret, but with different pseudo-random functions:
//!
//! - **TLS 1.0** (RFC 2246 Section 5): `PRF(secret, label, seed) =
//!   P_MD5(S1, label + seed) XOR P_SHA1(S2, label + seed)`, where S1/S2
//!   are the two (possibly overlapping) halves of the secret and `P_hash`
//!   is the iterated-HMAC expansion with `A(i)` chaining.
//! - **SSL 3.0** (RFC 6101 Section 6.2.2): block `i` is
//!   `MD5(secret ‖ SHA1(label_i ‖ secret ‖ seed))` with `label_i` the
//!   character `'A' + i` repeated `i + 1` times ("A", "BB", "CCC", ...).
//!
//! Labels are ASCII, not NUL-terminated, and concatenated directly with
//! the seed. This module also hosts the version-specific Finished and
//! CertificateVerify digests, which are built from the same keyed-hash
//! machinery.

use lptls_crypto::{CryptoProvider, HashAlgorithm};

use crate::error::{Error, Result};
use crate::protocol::{ProtocolVersion, Role};

/// Inner padding byte for the SSL 3.0 keyed-hash constructions.
pub(crate) const PAD_ONE: u8 = 0x36;

/// Outer padding byte for the SSL 3.0 keyed-hash constructions.
pub(crate) const PAD_TWO: u8 = 0x5C;

/// SSL 3.0 pad fill length: 48 bytes for MD5, 40 for SHA-1.
pub(crate) const fn ssl3_pad_len(algorithm: HashAlgorithm) -> usize {
    match algorithm {
        HashAlgorithm::Md5 => 48,
        HashAlgorithm::Sha1 => 40,
    }
}

/// Sender constant the SSL 3.0 Finished digest binds for the client.
pub const SSL3_SENDER_CLIENT: [u8; 4] = [0x43, 0x4C, 0x4E, 0x54];

/// Sender constant the SSL 3.0 Finished digest binds for the server.
pub const SSL3_SENDER_SERVER: [u8; 4] = [0x53, 0x52, 0x56, 0x52];

/// TLS 1.0 Finished verify_data length.
pub const TLS_VERIFY_DATA_LEN: usize = 12;

/// SSL 3.0 Finished length: MD5 part ‖ SHA-1 part.
pub const SSL3_VERIFY_DATA_LEN: usize = 36;

/// Hash a sequence of byte slices in one call.
fn hash_once(
    provider: &dyn CryptoProvider,
    algorithm: HashAlgorithm,
    parts: &[&[u8]],
) -> Result<Vec<u8>> {
    let mut hash = provider.hash(algorithm)?;
    for part in parts {
        hash.update(part);
    }
    Ok(hash.finalize())
}

/// `P_hash` expansion (RFC 2246 Section 5).
///
/// ```text
/// A(0) = seed
/// A(i) = HMAC_hash(secret, A(i-1))
/// P_hash(secret, seed) = HMAC_hash(secret, A(1) + seed) +
///                        HMAC_hash(secret, A(2) + seed) + ...
/// ```
pub(crate) fn p_hash(
    provider: &dyn CryptoProvider,
    algorithm: HashAlgorithm,
    secret: &[u8],
    seed: &[u8],
    output_len: usize,
) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(output_len);

    // A(1)
    let mut a = {
        let mut hmac = provider.hmac(algorithm, secret)?;
        hmac.update(seed);
        hmac.finalize()
    };

    while output.len() < output_len {
        let mut hmac = provider.hmac(algorithm, secret)?;
        hmac.update(&a);
        hmac.update(seed);
        let chunk = hmac.finalize();

        let remaining = output_len - output.len();
        if remaining >= chunk.len() {
            output.extend_from_slice(&chunk);
        } else {
            output.extend_from_slice(&chunk[..remaining]);
        }

        // A(i+1)
        let mut hmac = provider.hmac(algorithm, secret)?;
        hmac.update(&a);
        a = hmac.finalize();
    }

    Ok(output)
}

/// Compute the TLS 1.0 PRF.
///
/// The secret is split into two halves (sharing the middle byte when the
/// length is odd); MD5 expands the first half, SHA-1 the second, and the
/// streams are XORed together.
pub fn tls10_prf(
    provider: &dyn CryptoProvider,
    secret: &[u8],
    label: &[u8],
    seed: &[u8],
    output_len: usize,
) -> Result<Vec<u8>> {
    let half = (secret.len() + 1) / 2;
    let s1 = &secret[..half];
    let s2 = &secret[secret.len() - half..];

    let mut label_seed = Vec::with_capacity(label.len() + seed.len());
    label_seed.extend_from_slice(label);
    label_seed.extend_from_slice(seed);

    let md5_stream = p_hash(provider, HashAlgorithm::Md5, s1, &label_seed, output_len)?;
    let sha_stream = p_hash(provider, HashAlgorithm::Sha1, s2, &label_seed, output_len)?;

    Ok(md5_stream
        .iter()
        .zip(sha_stream.iter())
        .map(|(a, b)| a ^ b)
        .collect())
}

/// Compute the SSL 3.0 secret expansion.
///
/// No label parameter: the iteration index is encoded in the length of
/// the per-block ASCII label itself.
pub fn ssl30_expand(
    provider: &dyn CryptoProvider,
    secret: &[u8],
    seed: &[u8],
    output_len: usize,
) -> Result<Vec<u8>> {
    // 26 blocks of 16 bytes is far beyond any key block this engine derives.
    if output_len > 26 * 16 {
        return Err(Error::CryptoError("SSL3 expansion output too long".into()));
    }

    let mut output = Vec::with_capacity(output_len);
    let mut index = 0u8;

    while output.len() < output_len {
        let label = vec![b'A' + index; index as usize + 1];
        let inner = hash_once(provider, HashAlgorithm::Sha1, &[&label, secret, seed])?;
        let block = hash_once(provider, HashAlgorithm::Md5, &[secret, &inner])?;
        output.extend_from_slice(&block);
        index += 1;
    }

    output.truncate(output_len);
    Ok(output)
}

/// SSL 3.0 keyed handshake digest (RFC 6101 Sections 5.6.8 and 5.6.9).
///
/// ```text
/// hash(master ‖ pad2 ‖ hash(transcript [‖ sender] ‖ master ‖ pad1))
/// ```
///
/// The sender constant is present for Finished and absent for
/// CertificateVerify.
fn ssl3_keyed_digest(
    provider: &dyn CryptoProvider,
    algorithm: HashAlgorithm,
    master_secret: &[u8],
    transcript: &[u8],
    sender: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let pad_len = ssl3_pad_len(algorithm);

    let mut inner = provider.hash(algorithm)?;
    inner.update(transcript);
    if let Some(sender) = sender {
        inner.update(sender);
    }
    inner.update(master_secret);
    inner.update(&vec![PAD_ONE; pad_len]);
    let inner_digest = inner.finalize();

    let mut outer = provider.hash(algorithm)?;
    outer.update(master_secret);
    outer.update(&vec![PAD_TWO; pad_len]);
    outer.update(&inner_digest);
    Ok(outer.finalize())
}

/// Compute the Finished message body for one side.
///
/// - TLS 1.0: `PRF(master, "client finished" | "server finished",
///   MD5(transcript) ‖ SHA1(transcript), 12)`.
/// - SSL 3.0: the keyed digest over the transcript plus the 4-byte sender
///   constant, MD5 part followed by SHA-1 part (36 bytes).
///
/// `transcript` is the raw concatenation of every framed handshake
/// message exchanged so far, excluding the Finished message being built.
pub fn finished_verify_data(
    provider: &dyn CryptoProvider,
    version: ProtocolVersion,
    role: Role,
    master_secret: &[u8],
    transcript: &[u8],
) -> Result<Vec<u8>> {
    match version {
        ProtocolVersion::Tls10 => {
            let label: &[u8] = match role {
                Role::Client => b"client finished",
                Role::Server => b"server finished",
            };
            let md5 = hash_once(provider, HashAlgorithm::Md5, &[transcript])?;
            let sha = hash_once(provider, HashAlgorithm::Sha1, &[transcript])?;
            let mut seed = Vec::with_capacity(md5.len() + sha.len());
            seed.extend_from_slice(&md5);
            seed.extend_from_slice(&sha);
            tls10_prf(provider, master_secret, label, &seed, TLS_VERIFY_DATA_LEN)
        },
        ProtocolVersion::Ssl30 => {
            let sender: &[u8] = match role {
                Role::Client => &SSL3_SENDER_CLIENT,
                Role::Server => &SSL3_SENDER_SERVER,
            };
            let mut out = ssl3_keyed_digest(
                provider,
                HashAlgorithm::Md5,
                master_secret,
                transcript,
                Some(sender),
            )?;
            out.extend(ssl3_keyed_digest(
                provider,
                HashAlgorithm::Sha1,
                master_secret,
                transcript,
                Some(sender),
            )?);
            Ok(out)
        },
    }
}

/// Expected Finished body length for a protocol version.
pub const fn finished_len(version: ProtocolVersion) -> usize {
    match version {
        ProtocolVersion::Tls10 => TLS_VERIFY_DATA_LEN,
        ProtocolVersion::Ssl30 => SSL3_VERIFY_DATA_LEN,
    }
}

/// Compute the digest a CertificateVerify signature covers.
///
/// - TLS 1.0: `MD5(transcript) ‖ SHA1(transcript)` (36 bytes).
/// - SSL 3.0: the keyed digest without a sender constant, MD5 part
///   followed by SHA-1 part.
pub fn certificate_verify_digest(
    provider: &dyn CryptoProvider,
    version: ProtocolVersion,
    master_secret: &[u8],
    transcript: &[u8],
) -> Result<Vec<u8>> {
    match version {
        ProtocolVersion::Tls10 => {
            let mut out = hash_once(provider, HashAlgorithm::Md5, &[transcript])?;
            out.extend(hash_once(provider, HashAlgorithm::Sha1, &[transcript])?);
            Ok(out)
        },
        ProtocolVersion::Ssl30 => {
            let mut out =
                ssl3_keyed_digest(provider, HashAlgorithm::Md5, master_secret, transcript, None)?;
            out.extend(ssl3_keyed_digest(
                provider,
                HashAlgorithm::Sha1,
                master_secret,
                transcript,
                None,
            )?);
            Ok(out)
        },
    }
}

/// Compute the digest a ServerKeyExchange signature covers:
/// `MD5(client_random ‖ server_random ‖ params) ‖ SHA1(same)`.
pub fn signed_params_digest(
    provider: &dyn CryptoProvider,
    client_random: &[u8],
    server_random: &[u8],
    params: &[u8],
) -> Result<Vec<u8>> {
    let parts: &[&[u8]] = &[client_random, server_random, params];
    let mut out = hash_once(provider, HashAlgorithm::Md5, parts)?;
    out.extend(hash_once(provider, HashAlgorithm::Sha1, parts)?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lptls_crypto_rustcrypto::RustCryptoProvider;

    fn provider() -> RustCryptoProvider {
        use lptls_crypto::CryptoProvider;
        RustCryptoProvider::new()
    }

    #[test]
    fn test_tls10_prf_deterministic() {
        let provider = provider();
        let a = tls10_prf(&provider, b"secret", b"label", b"seed", 48).unwrap();
        let b = tls10_prf(&provider, b"secret", b"label", b"seed", 48).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 48);
    }

    #[test]
    fn test_tls10_prf_inputs_matter() {
        let provider = provider();
        let base = tls10_prf(&provider, b"secret", b"label", b"seed", 32).unwrap();
        assert_ne!(
            base,
            tls10_prf(&provider, b"secret2", b"label", b"seed", 32).unwrap()
        );
        assert_ne!(
            base,
            tls10_prf(&provider, b"secret", b"label2", b"seed", 32).unwrap()
        );
        assert_ne!(
            base,
            tls10_prf(&provider, b"secret", b"label", b"seed2", 32).unwrap()
        );
    }

    #[test]
    fn test_tls10_prf_various_lengths() {
        let provider = provider();
        for len in [1, 12, 16, 20, 48, 104, 137] {
            let out = tls10_prf(&provider, b"secret", b"label", b"seed", len).unwrap();
            assert_eq!(out.len(), len);
        }
    }

    /// The PRF is the XOR of the two half-secret P_hash streams; check the
    /// construction against its parts.
    #[test]
    fn test_tls10_prf_is_phash_xor() {
        let provider = provider();
        let secret = [0xABu8; 48];
        let label_seed = [b"label".as_slice(), b"seed".as_slice()].concat();

        let md5 = p_hash(&provider, HashAlgorithm::Md5, &secret[..24], &label_seed, 32).unwrap();
        let sha = p_hash(&provider, HashAlgorithm::Sha1, &secret[24..], &label_seed, 32).unwrap();
        let expected: Vec<u8> = md5.iter().zip(sha.iter()).map(|(a, b)| a ^ b).collect();

        let prf = tls10_prf(&provider, &secret, b"label", b"seed", 32).unwrap();
        assert_eq!(prf, expected);
    }

    /// With an odd secret length the halves share the middle byte.
    #[test]
    fn test_tls10_prf_odd_secret_split() {
        let provider = provider();
        let secret = [0x11u8; 47];
        let label_seed = [b"x".as_slice(), b"y".as_slice()].concat();

        let md5 = p_hash(&provider, HashAlgorithm::Md5, &secret[..24], &label_seed, 16).unwrap();
        let sha = p_hash(&provider, HashAlgorithm::Sha1, &secret[23..], &label_seed, 16).unwrap();
        let expected: Vec<u8> = md5.iter().zip(sha.iter()).map(|(a, b)| a ^ b).collect();

        assert_eq!(tls10_prf(&provider, &secret, b"x", b"y", 16).unwrap(), expected);
    }

    #[test]
    fn test_ssl30_expand_block_structure() {
        let provider = provider();
        let secret = [0x55u8; 48];
        let seed = [0xAAu8; 64];

        // First block must be MD5(secret ‖ SHA1("A" ‖ secret ‖ seed)).
        let inner = hash_once(&provider, HashAlgorithm::Sha1, &[b"A", &secret, &seed]).unwrap();
        let first = hash_once(&provider, HashAlgorithm::Md5, &[&secret[..], &inner]).unwrap();

        let expanded = ssl30_expand(&provider, &secret, &seed, 48).unwrap();
        assert_eq!(&expanded[..16], &first[..]);

        // Second block uses the "BB" label.
        let inner = hash_once(&provider, HashAlgorithm::Sha1, &[b"BB", &secret, &seed]).unwrap();
        let second = hash_once(&provider, HashAlgorithm::Md5, &[&secret[..], &inner]).unwrap();
        assert_eq!(&expanded[16..32], &second[..]);
    }

    #[test]
    fn test_ssl30_expand_truncates() {
        let provider = provider();
        let out = ssl30_expand(&provider, b"master", b"randoms", 42).unwrap();
        assert_eq!(out.len(), 42);
        let longer = ssl30_expand(&provider, b"master", b"randoms", 48).unwrap();
        assert_eq!(&longer[..42], &out[..]);
    }

    #[test]
    fn test_finished_lengths_and_role_separation() {
        let provider = provider();
        let master = [7u8; 48];
        let transcript = b"some handshake bytes";

        for version in [ProtocolVersion::Tls10, ProtocolVersion::Ssl30] {
            let client =
                finished_verify_data(&provider, version, Role::Client, &master, transcript)
                    .unwrap();
            let server =
                finished_verify_data(&provider, version, Role::Server, &master, transcript)
                    .unwrap();
            assert_eq!(client.len(), finished_len(version));
            assert_eq!(server.len(), finished_len(version));
            assert_ne!(client, server);
        }
    }

    /// Spot-check the TLS 1.0 Finished definition against an independent
    /// recomputation through the PRF.
    #[test]
    fn test_tls10_finished_matches_prf_composition() {
        let provider = provider();
        let master = [0x33u8; 48];
        let transcript = b"client hello server hello ...";

        let md5 = hash_once(&provider, HashAlgorithm::Md5, &[transcript]).unwrap();
        let sha = hash_once(&provider, HashAlgorithm::Sha1, &[transcript]).unwrap();
        let seed = [md5, sha].concat();
        let expected =
            tls10_prf(&provider, &master, b"client finished", &seed, TLS_VERIFY_DATA_LEN).unwrap();

        let got = finished_verify_data(
            &provider,
            ProtocolVersion::Tls10,
            Role::Client,
            &master,
            transcript,
        )
        .unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_certificate_verify_digest_is_36_bytes() {
        let provider = provider();
        let master = [1u8; 48];
        for version in [ProtocolVersion::Tls10, ProtocolVersion::Ssl30] {
            let digest =
                certificate_verify_digest(&provider, version, &master, b"transcript").unwrap();
            assert_eq!(digest.len(), 36);
        }
    }
}
