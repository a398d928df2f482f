//! Error types for the protocol engine.
//!
//! Every variant is fatal to the handshake or session it occurs in: the
//! engine never retries, falls back, or recovers locally. The session that
//! produced an error must be discarded and a fresh one created for the
//! next connection attempt.

use core::fmt;

use crate::protocol::HandshakeType;

/// Result type for engine operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by the protocol engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or out-of-order message. Carries the offending handshake
    /// message type when one is known.
    ProtocolViolation {
        /// Offending message type, if the violation is tied to one
        message: Option<HandshakeType>,
        /// Human-readable detail for logging
        detail: String,
    },

    /// Finished mismatch, record MAC mismatch, signature verification
    /// failure, or premaster version mismatch.
    AuthenticationFailure(String),

    /// Certificate chain rejected by the trust collaborator.
    UntrustedPeer(String),

    /// No common cipher suite or protocol version.
    UnsupportedNegotiation(String),

    /// Underlying stream I/O error.
    TransportFailure(String),

    /// A fatal alert arrived from the peer.
    AlertReceived(AlertDescription),

    /// Orderly closure: the peer sent close_notify.
    SessionClosed,

    /// Record operation attempted before the session is authenticated.
    NotReady,

    /// Local configuration is unusable (e.g. a client certificate was
    /// selected without a private key).
    ConfigurationError(String),

    /// Cryptographic provider failure.
    CryptoError(String),
}

impl Error {
    /// Convenience constructor for protocol violations without a known
    /// message type.
    pub fn protocol(detail: impl Into<String>) -> Self {
        Error::ProtocolViolation {
            message: None,
            detail: detail.into(),
        }
    }

    /// Convenience constructor for protocol violations tied to a message.
    pub fn protocol_in(message: HandshakeType, detail: impl Into<String>) -> Self {
        Error::ProtocolViolation {
            message: Some(message),
            detail: detail.into(),
        }
    }

    /// The alert to send the peer before failing the session.
    ///
    /// `None` means no alert is appropriate (transport already dead, or
    /// the error was triggered by a received alert).
    pub fn alert(&self) -> Option<AlertDescription> {
        match self {
            Error::ProtocolViolation { .. } => Some(AlertDescription::UnexpectedMessage),
            Error::AuthenticationFailure(_) => Some(AlertDescription::BadRecordMac),
            Error::UntrustedPeer(_) => Some(AlertDescription::BadCertificate),
            Error::UnsupportedNegotiation(_) => Some(AlertDescription::HandshakeFailure),
            Error::ConfigurationError(_) | Error::CryptoError(_) => {
                Some(AlertDescription::HandshakeFailure)
            },
            Error::TransportFailure(_)
            | Error::AlertReceived(_)
            | Error::SessionClosed
            | Error::NotReady => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ProtocolViolation { message, detail } => match message {
                Some(msg_type) => {
                    write!(f, "Protocol violation in {:?}: {}", msg_type, detail)
                },
                None => write!(f, "Protocol violation: {}", detail),
            },
            Error::AuthenticationFailure(msg) => write!(f, "Authentication failure: {}", msg),
            Error::UntrustedPeer(msg) => write!(f, "Untrusted peer: {}", msg),
            Error::UnsupportedNegotiation(msg) => {
                write!(f, "Unsupported negotiation: {}", msg)
            },
            Error::TransportFailure(msg) => write!(f, "Transport failure: {}", msg),
            Error::AlertReceived(desc) => write!(f, "Fatal alert received: {:?}", desc),
            Error::SessionClosed => write!(f, "Session closed by peer"),
            Error::NotReady => write!(f, "Session is not authenticated"),
            Error::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Error::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<lptls_crypto::Error> for Error {
    fn from(e: lptls_crypto::Error) -> Self {
        Error::CryptoError(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::TransportFailure(e.to_string())
    }
}

/// Alert descriptions defined for SSL 3.0 and TLS 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertDescription {
    /// Close notify
    CloseNotify = 0,

    /// Unexpected message
    UnexpectedMessage = 10,

    /// Bad record MAC
    BadRecordMac = 20,

    /// Decryption failed (TLS 1.0)
    DecryptionFailed = 21,

    /// Record overflow (TLS 1.0)
    RecordOverflow = 22,

    /// Decompression failure
    DecompressionFailure = 30,

    /// Handshake failure
    HandshakeFailure = 40,

    /// No certificate (SSL 3.0 only; sent by a certificate-less client)
    NoCertificate = 41,

    /// Bad certificate
    BadCertificate = 42,

    /// Unsupported certificate
    UnsupportedCertificate = 43,

    /// Certificate revoked
    CertificateRevoked = 44,

    /// Certificate expired
    CertificateExpired = 45,

    /// Certificate unknown
    CertificateUnknown = 46,

    /// Illegal parameter
    IllegalParameter = 47,

    /// Unknown CA (TLS 1.0)
    UnknownCa = 48,

    /// Access denied (TLS 1.0)
    AccessDenied = 49,

    /// Decode error (TLS 1.0)
    DecodeError = 50,

    /// Decrypt error (TLS 1.0)
    DecryptError = 51,

    /// Export restriction (TLS 1.0)
    ExportRestriction = 60,

    /// Protocol version (TLS 1.0)
    ProtocolVersion = 70,

    /// Insufficient security (TLS 1.0)
    InsufficientSecurity = 71,

    /// Internal error (TLS 1.0)
    InternalError = 80,

    /// User canceled (TLS 1.0)
    UserCanceled = 90,

    /// No renegotiation (TLS 1.0)
    NoRenegotiation = 100,
}

impl AlertDescription {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AlertDescription::CloseNotify),
            10 => Some(AlertDescription::UnexpectedMessage),
            20 => Some(AlertDescription::BadRecordMac),
            21 => Some(AlertDescription::DecryptionFailed),
            22 => Some(AlertDescription::RecordOverflow),
            30 => Some(AlertDescription::DecompressionFailure),
            40 => Some(AlertDescription::HandshakeFailure),
            41 => Some(AlertDescription::NoCertificate),
            42 => Some(AlertDescription::BadCertificate),
            43 => Some(AlertDescription::UnsupportedCertificate),
            44 => Some(AlertDescription::CertificateRevoked),
            45 => Some(AlertDescription::CertificateExpired),
            46 => Some(AlertDescription::CertificateUnknown),
            47 => Some(AlertDescription::IllegalParameter),
            48 => Some(AlertDescription::UnknownCa),
            49 => Some(AlertDescription::AccessDenied),
            50 => Some(AlertDescription::DecodeError),
            51 => Some(AlertDescription::DecryptError),
            60 => Some(AlertDescription::ExportRestriction),
            70 => Some(AlertDescription::ProtocolVersion),
            71 => Some(AlertDescription::InsufficientSecurity),
            80 => Some(AlertDescription::InternalError),
            90 => Some(AlertDescription::UserCanceled),
            100 => Some(AlertDescription::NoRenegotiation),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}
