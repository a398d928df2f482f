//! Hash function interface.

/// Hash algorithms supported by LPTLS.
///
/// SSL 3.0 and TLS 1.0 define their key schedules, record MACs and
/// handshake digests exclusively over these two algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5 (16 bytes output)
    Md5,
    /// SHA-1 (20 bytes output)
    Sha1,
}

impl HashAlgorithm {
    /// Get the output size in bytes for this hash algorithm.
    pub const fn output_size(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
        }
    }

    /// Get the name of this algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
        }
    }
}

/// Hash function trait.
///
/// Provides the streaming digest interface used for handshake transcripts
/// and the legacy key-expansion constructions.
///
/// # Example
///
/// ```rust,ignore
/// use lptls_crypto::Hash;
///
/// fn hash_example(mut hash: Box<dyn Hash>) -> Vec<u8> {
///     hash.update(b"Hello, ");
///     hash.update(b"world!");
///     hash.finalize()
/// }
/// ```
pub trait Hash: Send {
    /// Update the hash state with more data.
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the digest.
    ///
    /// This consumes the hash state. After calling finalize(), the hash
    /// object should not be used again.
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Get the output size in bytes for this hash function.
    fn output_size(&self) -> usize;

    /// Get the algorithm this hash implements.
    fn algorithm(&self) -> HashAlgorithm;
}
