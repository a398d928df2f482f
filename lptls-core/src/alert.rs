//! Alert protocol.
//!
//! Alerts are two-byte records: a severity level and a description. A
//! fatal alert (sent or received) permanently ends the session; the only
//! warnings this engine produces are `close_notify` for orderly shutdown
//! and `no_certificate` for an SSL 3.0 client declining a certificate
//! request.

use crate::error::{AlertDescription, Error, Result};

/// Alert level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertLevel {
    /// Warning (1)
    Warning = 1,

    /// Fatal (2)
    Fatal = 2,
}

impl AlertLevel {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AlertLevel::Warning),
            2 => Some(AlertLevel::Fatal),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Alert message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    /// Alert level
    pub level: AlertLevel,

    /// Alert description
    pub description: AlertDescription,
}

impl Alert {
    /// Create a new alert.
    pub fn new(level: AlertLevel, description: AlertDescription) -> Self {
        Self { level, description }
    }

    /// Create a fatal alert.
    pub fn fatal(description: AlertDescription) -> Self {
        Self {
            level: AlertLevel::Fatal,
            description,
        }
    }

    /// Create a close_notify alert.
    pub fn close_notify() -> Self {
        Self {
            level: AlertLevel::Warning,
            description: AlertDescription::CloseNotify,
        }
    }

    /// Create the SSL 3.0 no_certificate warning.
    pub fn no_certificate() -> Self {
        Self {
            level: AlertLevel::Warning,
            description: AlertDescription::NoCertificate,
        }
    }

    /// Encode the alert to bytes.
    pub fn encode(&self) -> [u8; 2] {
        [self.level.to_u8(), self.description.to_u8()]
    }

    /// Decode an alert from bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != 2 {
            return Err(Error::protocol("alert record must be exactly 2 bytes"));
        }

        let level = AlertLevel::from_u8(data[0])
            .ok_or_else(|| Error::protocol("invalid alert level"))?;

        let description = AlertDescription::from_u8(data[1])
            .ok_or_else(|| Error::protocol("invalid alert description"))?;

        Ok(Self { level, description })
    }

    /// Check if this alert ends the session.
    pub fn is_fatal(&self) -> bool {
        self.level == AlertLevel::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_encode_decode() {
        let alert = Alert::fatal(AlertDescription::HandshakeFailure);
        let decoded = Alert::decode(&alert.encode()).unwrap();
        assert_eq!(decoded, alert);
        assert!(decoded.is_fatal());
    }

    #[test]
    fn test_close_notify_is_warning() {
        let alert = Alert::close_notify();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert!(!alert.is_fatal());
    }

    #[test]
    fn test_invalid_alert() {
        assert!(Alert::decode(&[1]).is_err());
        assert!(Alert::decode(&[3, 0]).is_err());
        assert!(Alert::decode(&[1, 0, 0]).is_err());
    }
}
