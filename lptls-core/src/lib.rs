//! # LPTLS Core
//!
//! SSL 3.0 / TLS 1.0 protocol engine over an arbitrary reliable byte
//! stream. The engine negotiates a cipher suite, authenticates one or
//! both endpoints with RSA certificates, derives symmetric keys, and
//! thereafter encrypts, decrypts and integrity-checks every application
//! data record.
//!
//! Both protocol versions are deprecated (RFC 7568, RFC 8996). This
//! engine exists for controlled interoperation with peers that cannot be
//! upgraded; do not point it at the open internet.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     Stream adapter (caller-provided)    │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │       lptls-core (this crate)           │
//! │  ┌──────────────────────────────────┐   │
//! │  │   Secure Session State Machine   │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Handshake Flows & Messages     │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Key Schedule & PRF             │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Record Layer (MAC + cipher)    │   │
//! │  └──────────────────────────────────┘   │
//! └───────┬─────────────────────┬───────────┘
//!         │                     │
//! ┌───────▼──────────┐ ┌────────▼────────────┐
//! │ lptls-crypto     │ │ CertificateValidator│
//! │ (primitives)     │ │ (trust collaborator)│
//! └──────────────────┘ └─────────────────────┘
//! ```
//!
//! X.509 parsing and trust decisions are delegated through
//! [`CertificateValidator`]; cryptographic primitives come from a
//! [`CryptoProvider`](lptls_crypto::CryptoProvider) implementation such
//! as `lptls-crypto-rustcrypto`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lptls_core::{ClientOptions, SecureSession};
//! use lptls_crypto::CryptoProvider;
//! use lptls_crypto_rustcrypto::RustCryptoProvider;
//!
//! let provider = RustCryptoProvider::new();
//! let mut session = SecureSession::client(validator, ClientOptions::new("host"));
//! session.authenticate_as_client(&provider, &mut stream)?;
//! let record = session.encrypt_and_frame(&provider, b"hello")?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]

// Re-export the crypto interface
pub use lptls_crypto;

// Core modules
pub mod alert;
pub mod certificate_validator;
pub mod cipher;
pub mod error;
pub mod handshake_io;
pub mod key_schedule;
pub mod messages;
pub mod prf;
pub mod protocol;
pub mod record;
pub mod record_mac;
pub mod record_protection;
pub mod session;
pub mod transcript;

mod handshake;

// Re-exports
pub use certificate_validator::{CertificatePurpose, CertificateValidator, LocalIdentity};
pub use cipher::CipherSuite;
pub use error::{AlertDescription, Error, Result};
pub use protocol::{ContentType, HandshakeType, ProtocolVersion, Role};
pub use session::{ClientOptions, SecureSession, ServerOptions, SessionState};
