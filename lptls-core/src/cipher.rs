//! Cipher suite registry.
//!
//! A static catalogue of the RSA-key-exchange cipher suites negotiable
//! under SSL 3.0 and TLS 1.0. Each descriptor carries every parameter the
//! key schedule and record layer need; descriptors are looked up once
//! during negotiation and never mutated.

use lptls_crypto::{BulkCipherAlgorithm, HashAlgorithm};

/// Key exchange algorithm.
///
/// Only RSA key transport is in scope; the variant exists so descriptors
/// stay self-describing on the wire-catalogue level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyExchangeAlgorithm {
    /// RSA-encrypted premaster secret
    Rsa,
}

/// Cipher kind: how the bulk cipher treats record fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherKind {
    /// Length-preserving (RC4, NULL)
    Stream,
    /// CBC with protocol padding to the block boundary
    Block,
}

/// Immutable cipher suite descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSuite {
    /// Wire identifier (u16 big-endian in hello messages)
    pub id: u16,
    /// IANA-style name
    pub name: &'static str,
    /// Key exchange algorithm
    pub key_exchange: KeyExchangeAlgorithm,
    /// Bulk cipher algorithm
    pub bulk: BulkCipherAlgorithm,
    /// Stream or block
    pub kind: CipherKind,
    /// MAC hash algorithm
    pub mac: HashAlgorithm,
    /// Key material per direction in the key block, in bytes
    pub key_material: usize,
    /// Final write-key length after export expansion, in bytes
    pub expanded_key_material: usize,
    /// IV length in bytes (0 for stream ciphers)
    pub iv_size: usize,
    /// Export-restricted suite (short keys, re-expanded write keys)
    pub exportable: bool,
    /// Effective strength in bits
    pub effective_key_bits: u16,
}

impl CipherSuite {
    /// MAC tag length in bytes.
    pub const fn hash_size(&self) -> usize {
        self.mac.output_size()
    }

    /// Total key block length to derive for this suite.
    ///
    /// Layout: client-MAC ‖ server-MAC ‖ client-key ‖ server-key and, for
    /// non-exportable suites, ‖ client-IV ‖ server-IV. Export suites take
    /// their final keys and IVs from a separate expansion step, so their
    /// key block carries no IV material.
    pub const fn key_block_len(&self) -> usize {
        let base = 2 * self.hash_size() + 2 * self.key_material;
        if self.exportable {
            base
        } else {
            base + 2 * self.iv_size
        }
    }

    /// Block size of the bulk cipher; 1 for stream ciphers.
    pub const fn block_size(&self) -> usize {
        self.bulk.block_size()
    }

    /// Look up a suite by its wire identifier.
    pub fn lookup(id: u16) -> Option<&'static CipherSuite> {
        SUPPORTED_SUITES.iter().find(|suite| suite.id == id)
    }
}

/// All suites this engine can negotiate, strongest first.
///
/// The order is the server's selection preference: AEAD does not exist in
/// these protocol versions, so preference is by effective key bits with
/// SHA-1 MACs ahead of MD5 at equal strength. NULL and export suites trail
/// and are only reachable when a caller offers them explicitly.
pub static SUPPORTED_SUITES: &[CipherSuite] = &[
    CipherSuite {
        id: 0x0035,
        name: "TLS_RSA_WITH_AES_256_CBC_SHA",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Aes256,
        kind: CipherKind::Block,
        mac: HashAlgorithm::Sha1,
        key_material: 32,
        expanded_key_material: 32,
        iv_size: 16,
        exportable: false,
        effective_key_bits: 256,
    },
    CipherSuite {
        id: 0x002F,
        name: "TLS_RSA_WITH_AES_128_CBC_SHA",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Aes128,
        kind: CipherKind::Block,
        mac: HashAlgorithm::Sha1,
        key_material: 16,
        expanded_key_material: 16,
        iv_size: 16,
        exportable: false,
        effective_key_bits: 128,
    },
    CipherSuite {
        id: 0x000A,
        name: "TLS_RSA_WITH_3DES_EDE_CBC_SHA",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::TripleDes,
        kind: CipherKind::Block,
        mac: HashAlgorithm::Sha1,
        key_material: 24,
        expanded_key_material: 24,
        iv_size: 8,
        exportable: false,
        effective_key_bits: 168,
    },
    CipherSuite {
        id: 0x0005,
        name: "TLS_RSA_WITH_RC4_128_SHA",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Rc4,
        kind: CipherKind::Stream,
        mac: HashAlgorithm::Sha1,
        key_material: 16,
        expanded_key_material: 16,
        iv_size: 0,
        exportable: false,
        effective_key_bits: 128,
    },
    CipherSuite {
        id: 0x0004,
        name: "TLS_RSA_WITH_RC4_128_MD5",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Rc4,
        kind: CipherKind::Stream,
        mac: HashAlgorithm::Md5,
        key_material: 16,
        expanded_key_material: 16,
        iv_size: 0,
        exportable: false,
        effective_key_bits: 128,
    },
    CipherSuite {
        id: 0x0009,
        name: "TLS_RSA_WITH_DES_CBC_SHA",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Des,
        kind: CipherKind::Block,
        mac: HashAlgorithm::Sha1,
        key_material: 8,
        expanded_key_material: 8,
        iv_size: 8,
        exportable: false,
        effective_key_bits: 56,
    },
    CipherSuite {
        id: 0x0003,
        name: "TLS_RSA_EXPORT_WITH_RC4_40_MD5",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Rc4,
        kind: CipherKind::Stream,
        mac: HashAlgorithm::Md5,
        key_material: 5,
        expanded_key_material: 16,
        iv_size: 0,
        exportable: true,
        effective_key_bits: 40,
    },
    CipherSuite {
        id: 0x0008,
        name: "TLS_RSA_EXPORT_WITH_DES40_CBC_SHA",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Des,
        kind: CipherKind::Block,
        mac: HashAlgorithm::Sha1,
        key_material: 5,
        expanded_key_material: 8,
        iv_size: 8,
        exportable: true,
        effective_key_bits: 40,
    },
    CipherSuite {
        id: 0x0002,
        name: "TLS_RSA_WITH_NULL_SHA",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Null,
        kind: CipherKind::Stream,
        mac: HashAlgorithm::Sha1,
        key_material: 0,
        expanded_key_material: 0,
        iv_size: 0,
        exportable: true,
        effective_key_bits: 0,
    },
    CipherSuite {
        id: 0x0001,
        name: "TLS_RSA_WITH_NULL_MD5",
        key_exchange: KeyExchangeAlgorithm::Rsa,
        bulk: BulkCipherAlgorithm::Null,
        kind: CipherKind::Stream,
        mac: HashAlgorithm::Md5,
        key_material: 0,
        expanded_key_material: 0,
        iv_size: 0,
        exportable: true,
        effective_key_bits: 0,
    },
];

/// Wire ids of the suites a client offers by default: every encrypting
/// suite, strongest first, without NULL suites.
pub fn default_offered_suites() -> Vec<u16> {
    SUPPORTED_SUITES
        .iter()
        .filter(|suite| suite.bulk != BulkCipherAlgorithm::Null)
        .map(|suite| suite.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        let suite = CipherSuite::lookup(0x002F).unwrap();
        assert_eq!(suite.name, "TLS_RSA_WITH_AES_128_CBC_SHA");
        assert_eq!(suite.bulk, BulkCipherAlgorithm::Aes128);
        assert!(CipherSuite::lookup(0xC02F).is_none());
    }

    #[test]
    fn test_key_block_lengths() {
        // AES-128-SHA: 2*20 + 2*16 + 2*16 = 104
        assert_eq!(CipherSuite::lookup(0x002F).unwrap().key_block_len(), 104);
        // RC4-128-MD5: 2*16 + 2*16 = 64
        assert_eq!(CipherSuite::lookup(0x0004).unwrap().key_block_len(), 64);
        // RC4-40-MD5 export: 2*16 + 2*5 = 42, no IVs in the block
        assert_eq!(CipherSuite::lookup(0x0003).unwrap().key_block_len(), 42);
        // DES40 export: 2*20 + 2*5 = 50
        assert_eq!(CipherSuite::lookup(0x0008).unwrap().key_block_len(), 50);
        // NULL-SHA: MAC secrets only
        assert_eq!(CipherSuite::lookup(0x0002).unwrap().key_block_len(), 40);
    }

    #[test]
    fn test_export_suites_expand_keys() {
        for suite in SUPPORTED_SUITES {
            if suite.exportable && suite.bulk != BulkCipherAlgorithm::Null {
                assert!(suite.expanded_key_material > suite.key_material);
                assert_eq!(suite.expanded_key_material, suite.bulk.key_len());
            }
            if !suite.exportable {
                assert_eq!(suite.key_material, suite.bulk.key_len());
            }
        }
    }

    #[test]
    fn test_default_offer_excludes_null() {
        let offered = default_offered_suites();
        assert!(!offered.contains(&0x0001));
        assert!(!offered.contains(&0x0002));
        assert_eq!(offered[0], 0x0035);
    }
}
