//! Secure session: the protocol orchestrator.
//!
//! A [`SecureSession`] owns everything one connection needs: role,
//! negotiated version and cipher suite, key material, the handshake
//! transcript, and the two record-protection directions with their
//! sequence counters. It is created per connection attempt, driven
//! synchronously through the handshake, and discarded when the
//! connection (or any fatal error) ends it.
//!
//! # Concurrency
//!
//! A session is single-threaded: the handshake is strictly sequential,
//! and afterwards each direction's record operations must be serialized
//! by the caller. The two directions share no mutable state with each
//! other, so a caller may drive reads and writes from two threads only by
//! wrapping the session in its own lock; the engine does not arbitrate
//! concurrent use.

use std::io::{Read, Write};
use std::sync::Arc;

use lptls_crypto::CryptoProvider;

use crate::alert::{Alert, AlertLevel};
use crate::certificate_validator::{CertificateValidator, LocalIdentity};
use crate::cipher::{self, CipherSuite};
use crate::error::{AlertDescription, Error, Result};
use crate::handshake::{client, server};
use crate::handshake_io::{HandshakeMessage, HandshakeReassembler, HANDSHAKE_HEADER_SIZE};
use crate::key_schedule::SecureKeyInfo;
use crate::messages::CertificateRequest;
use crate::protocol::{ContentType, HandshakeType, ProtocolVersion, Role};
use crate::record::{SecureRecord, MAX_FRAGMENT_SIZE, RECORD_HEADER_SIZE};
use crate::record_protection::{RecordDecryptor, RecordEncryptor};
use crate::transcript::HandshakeTranscript;

/// Session state.
///
/// Transitions only move forward; `Failed` and `Authenticated` are
/// terminal (`Authenticated` still increments sequence counters, nothing
/// else changes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, handshake not yet run
    Start,
    /// Hellos exchanged: version and suite are fixed
    HelloExchanged,
    /// Premaster exchanged and key material derived
    KeyExchanged,
    /// Client certificate ownership proven
    CertificateVerified,
    /// ChangeCipherSpec boundary crossed
    ChangeCipherSpec,
    /// Peer's Finished verified
    Finished,
    /// Handshake complete; record operations permitted
    Authenticated,
    /// Fatal error; the session must be discarded
    Failed,
}

/// Client-side session parameters.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Host the connection targets (logging; these protocol versions
    /// carry no server-name indication on the wire)
    pub target_host: String,
    /// Highest protocol version to offer
    pub protocol_version: ProtocolVersion,
    /// Cipher suite ids to offer, preference order
    pub offered_suites: Vec<u16>,
    /// Ask the trust collaborator to consult revocation data
    pub check_revocation: bool,
}

impl ClientOptions {
    /// Defaults: offer TLS 1.0 with every encrypting suite.
    pub fn new(target_host: impl Into<String>) -> Self {
        Self {
            target_host: target_host.into(),
            protocol_version: ProtocolVersion::Tls10,
            offered_suites: cipher::default_offered_suites(),
            check_revocation: true,
        }
    }
}

/// Server-side session parameters.
#[derive(Debug)]
pub struct ServerOptions {
    /// Server certificate chain and private key
    pub identity: LocalIdentity,
    /// Send a CertificateRequest to the client
    pub request_client_certificate: bool,
    /// Fail the handshake if the client declines to authenticate
    /// (implies `request_client_certificate`)
    pub require_client_certificate: bool,
    /// Issuer distinguished names advertised in the CertificateRequest
    pub acceptable_issuers: Vec<Vec<u8>>,
    /// Highest protocol version to accept
    pub protocol_version: ProtocolVersion,
    /// Cipher suite ids to accept, server preference order
    pub enabled_suites: Vec<u16>,
    /// Ask the trust collaborator to consult revocation data
    pub check_revocation: bool,
}

impl ServerOptions {
    /// Defaults: accept up to TLS 1.0 with every encrypting suite, no
    /// client authentication.
    pub fn new(identity: LocalIdentity) -> Self {
        Self {
            identity,
            request_client_certificate: false,
            require_client_certificate: false,
            acceptable_issuers: Vec::new(),
            protocol_version: ProtocolVersion::Tls10,
            enabled_suites: cipher::default_offered_suites(),
            check_revocation: true,
        }
    }
}

/// One secure-transport session over a reliable byte stream.
pub struct SecureSession {
    pub(crate) role: Role,
    pub(crate) state: SessionState,
    pub(crate) version: ProtocolVersion,
    pub(crate) validator: Arc<dyn CertificateValidator>,

    pub(crate) client_options: Option<ClientOptions>,
    pub(crate) server_options: Option<ServerOptions>,

    pub(crate) suite: Option<&'static CipherSuite>,
    pub(crate) keys: Option<SecureKeyInfo>,
    pub(crate) transcript: HandshakeTranscript,
    pub(crate) reassembler: HandshakeReassembler,
    /// A message read ahead of its processing step (SSL 3.0
    /// certificate-decline path)
    pub(crate) pending_handshake: Option<HandshakeMessage>,

    pub(crate) write_protection: Option<RecordEncryptor>,
    pub(crate) read_protection: Option<RecordDecryptor>,

    pub(crate) client_random: Option<[u8; 32]>,
    pub(crate) server_random: Option<[u8; 32]>,
    /// Version the client advertised in its hello (server side); the
    /// premaster version prefix must match it exactly.
    pub(crate) offered_version: Option<ProtocolVersion>,
    pub(crate) peer_certificates: Vec<Vec<u8>>,
    /// Peer key the premaster is encrypted under: the certified key, or
    /// the ephemeral key from a ServerKeyExchange
    pub(crate) peer_exchange_key: Option<Vec<u8>>,
    /// CertificateRequest received from the server (client side)
    pub(crate) certificate_request: Option<CertificateRequest>,
    /// The peer declined client authentication with an SSL 3.0
    /// no_certificate warning
    pub(crate) peer_declined_certificate: bool,
    /// Identity selected for client authentication, retained after the
    /// handshake for the caller
    pub(crate) local_identity: Option<LocalIdentity>,
}

impl std::fmt::Debug for SecureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSession")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("version", &self.version)
            .field("suite", &self.suite.map(|suite| suite.name))
            .finish_non_exhaustive()
    }
}

impl SecureSession {
    /// Create a client-role session.
    pub fn client(validator: Arc<dyn CertificateValidator>, options: ClientOptions) -> Self {
        let version = options.protocol_version;
        Self::new(Role::Client, version, validator, Some(options), None)
    }

    /// Create a server-role session.
    pub fn server(validator: Arc<dyn CertificateValidator>, options: ServerOptions) -> Self {
        let version = options.protocol_version;
        Self::new(Role::Server, version, validator, None, Some(options))
    }

    fn new(
        role: Role,
        version: ProtocolVersion,
        validator: Arc<dyn CertificateValidator>,
        client_options: Option<ClientOptions>,
        server_options: Option<ServerOptions>,
    ) -> Self {
        Self {
            role,
            state: SessionState::Start,
            version,
            validator,
            client_options,
            server_options,
            suite: None,
            keys: None,
            transcript: HandshakeTranscript::new(),
            reassembler: HandshakeReassembler::new(),
            pending_handshake: None,
            write_protection: None,
            read_protection: None,
            client_random: None,
            server_random: None,
            offered_version: None,
            peer_certificates: Vec::new(),
            peer_exchange_key: None,
            certificate_request: None,
            peer_declined_certificate: false,
            local_identity: None,
        }
    }

    /// Run the client handshake to completion over `stream`.
    ///
    /// Blocks until the session is `Authenticated` or fails. A session
    /// that has already run a handshake (successfully or not) cannot be
    /// reused.
    pub fn authenticate_as_client<S: Read + Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
    ) -> Result<()> {
        if self.role != Role::Client {
            return Err(Error::ConfigurationError(
                "authenticate_as_client on a server session".into(),
            ));
        }
        self.run_handshake(provider, stream, client::run)
    }

    /// Run the server handshake to completion over `stream`.
    pub fn authenticate_as_server<S: Read + Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
    ) -> Result<()> {
        if self.role != Role::Server {
            return Err(Error::ConfigurationError(
                "authenticate_as_server on a client session".into(),
            ));
        }
        self.run_handshake(provider, stream, server::run)
    }

    fn run_handshake<S: Read + Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
        flow: fn(&mut SecureSession, &dyn CryptoProvider, &mut S) -> Result<()>,
    ) -> Result<()> {
        if self.state != SessionState::Start {
            return Err(Error::protocol("session already used"));
        }

        match flow(self, provider, stream) {
            Ok(()) => {
                self.state = SessionState::Authenticated;
                tracing::info!(
                    role = self.role.name(),
                    version = self.version.name(),
                    suite = self.suite.map(|suite| suite.name),
                    "handshake complete"
                );
                Ok(())
            },
            Err(err) => Err(self.fail(provider, stream, err)),
        }
    }

    /// Record a fatal failure: best-effort alert, terminal state.
    fn fail<S: Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
        err: Error,
    ) -> Error {
        if let Some(description) = err.alert() {
            let alert = Alert::fatal(description);
            let _ = self.send_record(provider, stream, ContentType::Alert, &alert.encode());
            let _ = stream.flush();
        }
        self.state = SessionState::Failed;
        tracing::warn!(role = self.role.name(), error = %err, "session failed");
        err
    }

    // ---- post-authentication record interface ----

    /// Encrypt application data into ready-to-send record bytes.
    ///
    /// Fragments above 2^14 bytes are split across records. Each record
    /// consumes exactly one write-sequence number; numbers are never
    /// reused, and a failed operation poisons the session instead of
    /// rewinding the counter.
    pub fn encrypt_and_frame(
        &mut self,
        provider: &dyn CryptoProvider,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        if self.state != SessionState::Authenticated {
            return Err(Error::NotReady);
        }

        let mut out = Vec::with_capacity(plaintext.len() + RECORD_HEADER_SIZE + 64);
        let mut chunks: Vec<&[u8]> = plaintext.chunks(MAX_FRAGMENT_SIZE).collect();
        if chunks.is_empty() {
            chunks.push(&[]);
        }

        for chunk in chunks {
            match self.seal_record(provider, ContentType::ApplicationData, chunk) {
                Ok(record_bytes) => out.extend_from_slice(&record_bytes),
                Err(err) => {
                    self.state = SessionState::Failed;
                    return Err(err);
                },
            }
        }
        Ok(out)
    }

    /// Decrypt exactly one received record into plaintext.
    ///
    /// Records must be passed in strict arrival order; the MAC sequence
    /// number rejects anything else. A warning alert yields an empty
    /// plaintext; close_notify and every fatal condition end the session.
    pub fn decrypt_record(
        &mut self,
        provider: &dyn CryptoProvider,
        record_bytes: &[u8],
    ) -> Result<Vec<u8>> {
        if self.state != SessionState::Authenticated {
            return Err(Error::NotReady);
        }

        match self.open_one_record(provider, record_bytes) {
            Ok(plaintext) => Ok(plaintext),
            Err(err) => {
                self.state = SessionState::Failed;
                Err(err)
            },
        }
    }

    fn open_one_record(
        &mut self,
        provider: &dyn CryptoProvider,
        record_bytes: &[u8],
    ) -> Result<Vec<u8>> {
        let record = SecureRecord::decode(record_bytes)?;
        if record.len() != record_bytes.len() {
            return Err(Error::protocol("trailing bytes after record"));
        }

        let protection = self
            .read_protection
            .as_mut()
            .ok_or(Error::NotReady)?;
        let payload = protection.decrypt(provider, record.content_type, &record.fragment)?;

        match record.content_type {
            ContentType::ApplicationData => Ok(payload),
            ContentType::Alert => {
                let alert = Alert::decode(&payload)?;
                if alert.description == AlertDescription::CloseNotify {
                    Err(Error::SessionClosed)
                } else if alert.is_fatal() {
                    Err(Error::AlertReceived(alert.description))
                } else {
                    tracing::debug!(description = ?alert.description, "warning alert ignored");
                    Ok(Vec::new())
                }
            },
            ContentType::Handshake => {
                // A HelloRequest asks for renegotiation, which this engine
                // does not do; anything else here is a violation.
                if payload.len() == HANDSHAKE_HEADER_SIZE
                    && payload[0] == HandshakeType::HelloRequest.to_u8()
                {
                    tracing::debug!("ignoring renegotiation request");
                    Ok(Vec::new())
                } else {
                    Err(Error::protocol("handshake record after authentication"))
                }
            },
            ContentType::ChangeCipherSpec => {
                Err(Error::protocol("ChangeCipherSpec after authentication"))
            },
        }
    }

    /// Encrypt and frame a close_notify alert for orderly shutdown.
    pub fn close_notify(&mut self, provider: &dyn CryptoProvider) -> Result<Vec<u8>> {
        if self.state != SessionState::Authenticated {
            return Err(Error::NotReady);
        }
        self.seal_record(provider, ContentType::Alert, &Alert::close_notify().encode())
    }

    // ---- accessors ----

    /// The negotiated (or configured maximum) protocol version.
    pub fn current_protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    /// Whether the handshake completed successfully.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Session role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The negotiated cipher suite, once hellos are exchanged.
    pub fn negotiated_cipher_suite(&self) -> Option<&'static CipherSuite> {
        self.suite
    }

    /// The peer's certificate chain as received, leaf first.
    pub fn peer_certificates(&self) -> &[Vec<u8>] {
        &self.peer_certificates
    }

    /// The local certificate chain sent for client authentication, if
    /// one was selected.
    pub fn local_certificates(&self) -> Option<&[Vec<u8>]> {
        self.local_identity
            .as_ref()
            .map(|identity| identity.certificate_chain.as_slice())
    }

    /// Sequence number of the next outbound record.
    pub fn write_sequence(&self) -> u64 {
        self.write_protection
            .as_ref()
            .map_or(0, RecordEncryptor::sequence)
    }

    /// Sequence number of the next expected inbound record.
    pub fn read_sequence(&self) -> u64 {
        self.read_protection
            .as_ref()
            .map_or(0, RecordDecryptor::sequence)
    }

    // ---- internal record plumbing (handshake flows) ----

    /// Produce the bytes of one record, encrypting when protection is up.
    fn seal_record(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let fragment = match &mut self.write_protection {
            Some(protection) => protection.encrypt(provider, content_type, payload)?,
            None => payload.to_vec(),
        };
        SecureRecord::new(content_type, self.version, fragment).encode()
    }

    pub(crate) fn send_record<S: Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
        content_type: ContentType,
        payload: &[u8],
    ) -> Result<()> {
        let record_bytes = self.seal_record(provider, content_type, payload)?;
        stream.write_all(&record_bytes)?;
        Ok(())
    }

    /// Frame, transcribe and send one handshake message.
    pub(crate) fn send_handshake<S: Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
        message: &HandshakeMessage,
    ) -> Result<()> {
        let framed = message.encode()?;
        self.transcript.update(&framed);
        tracing::debug!(message = ?message.msg_type, len = framed.len(), "send");
        self.send_record(provider, stream, ContentType::Handshake, &framed)
    }

    fn read_record<S: Read>(&mut self, stream: &mut S) -> Result<SecureRecord> {
        let mut header = [0u8; RECORD_HEADER_SIZE];
        stream.read_exact(&mut header)?;
        let (content_type, version, length) = SecureRecord::decode_header(&header)?;
        let mut fragment = vec![0u8; length];
        stream.read_exact(&mut fragment)?;
        Ok(SecureRecord::new(content_type, version, fragment))
    }

    fn open_record(
        &mut self,
        provider: &dyn CryptoProvider,
        record: &SecureRecord,
    ) -> Result<Vec<u8>> {
        match &mut self.read_protection {
            Some(protection) => {
                protection.decrypt(provider, record.content_type, &record.fragment)
            },
            None => Ok(record.fragment.clone()),
        }
    }

    /// Handle an alert that arrived mid-handshake. Returns `Ok` only for
    /// warnings the handshake can continue past.
    fn handshake_alert(&mut self, alert: Alert) -> Result<()> {
        if alert.description == AlertDescription::CloseNotify {
            return Err(Error::SessionClosed);
        }
        if alert.is_fatal() {
            return Err(Error::AlertReceived(alert.description));
        }
        if alert.level == AlertLevel::Warning
            && alert.description == AlertDescription::NoCertificate
        {
            // SSL 3.0 client declining a certificate request.
            self.peer_declined_certificate = true;
            return Ok(());
        }
        tracing::debug!(description = ?alert.description, "warning alert during handshake");
        Ok(())
    }

    /// Block until the next complete handshake message arrives.
    ///
    /// The message is *not* yet part of the transcript: Finished and
    /// CertificateVerify are verified against the transcript that
    /// excludes them, so each processing step appends explicitly.
    pub(crate) fn next_handshake<S: Read>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
    ) -> Result<HandshakeMessage> {
        if let Some(message) = self.pending_handshake.take() {
            return Ok(message);
        }
        loop {
            if let Some(message) = self.reassembler.next_message()? {
                if message.msg_type == HandshakeType::HelloRequest {
                    // Never honored and never transcribed.
                    continue;
                }
                tracing::debug!(message = ?message.msg_type, "recv");
                return Ok(message);
            }

            let record = self.read_record(stream)?;
            let payload = self.open_record(provider, &record)?;
            match record.content_type {
                ContentType::Handshake => self.reassembler.push(&payload),
                ContentType::Alert => self.handshake_alert(Alert::decode(&payload)?)?,
                ContentType::ChangeCipherSpec => {
                    return Err(Error::protocol("unexpected ChangeCipherSpec"));
                },
                ContentType::ApplicationData => {
                    return Err(Error::protocol("application data during handshake"));
                },
            }
        }
    }

    /// Append a received message to the transcript.
    pub(crate) fn transcribe(&mut self, message: &HandshakeMessage) -> Result<()> {
        let framed = message.encode()?;
        self.transcript.update(&framed);
        Ok(())
    }

    /// Push a message back for the next [`next_handshake`] call.
    ///
    /// [`next_handshake`]: SecureSession::next_handshake
    pub(crate) fn reinject_handshake(&mut self, message: HandshakeMessage) {
        self.pending_handshake = Some(message);
    }

    /// Block until the peer's ChangeCipherSpec arrives, then switch the
    /// inbound direction to the new cipher state.
    pub(crate) fn read_change_cipher_spec<S: Read>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
    ) -> Result<()> {
        if !self.reassembler.is_empty() || self.pending_handshake.is_some() {
            return Err(Error::protocol(
                "handshake data pending at ChangeCipherSpec boundary",
            ));
        }

        loop {
            let record = self.read_record(stream)?;
            let payload = self.open_record(provider, &record)?;
            match record.content_type {
                ContentType::ChangeCipherSpec => {
                    if payload != [1u8] {
                        return Err(Error::protocol("invalid ChangeCipherSpec body"));
                    }
                    self.enable_read_protection(provider)?;
                    self.state = SessionState::ChangeCipherSpec;
                    return Ok(());
                },
                ContentType::Alert => self.handshake_alert(Alert::decode(&payload)?)?,
                ContentType::Handshake | ContentType::ApplicationData => {
                    return Err(Error::protocol("expected ChangeCipherSpec"));
                },
            }
        }
    }

    /// Send ChangeCipherSpec and switch the outbound direction to the new
    /// cipher state.
    pub(crate) fn send_change_cipher_spec<S: Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        stream: &mut S,
    ) -> Result<()> {
        self.send_record(provider, stream, ContentType::ChangeCipherSpec, &[1])?;
        self.enable_write_protection(provider)?;
        self.state = SessionState::ChangeCipherSpec;
        Ok(())
    }

    fn protection_inputs(&self) -> Result<(&'static CipherSuite, &SecureKeyInfo)> {
        let suite = self
            .suite
            .ok_or_else(|| Error::protocol("no cipher suite negotiated"))?;
        let keys = self
            .keys
            .as_ref()
            .ok_or_else(|| Error::protocol("key material not derived"))?;
        Ok((suite, keys))
    }

    fn enable_write_protection(&mut self, provider: &dyn CryptoProvider) -> Result<()> {
        let protection = {
            let (suite, keys) = self.protection_inputs()?;
            RecordEncryptor::new(provider, self.version, suite, keys, self.role)?
        };
        self.write_protection = Some(protection);
        Ok(())
    }

    fn enable_read_protection(&mut self, provider: &dyn CryptoProvider) -> Result<()> {
        let protection = {
            let (suite, keys) = self.protection_inputs()?;
            RecordDecryptor::new(provider, self.version, suite, keys, self.role.peer())?
        };
        self.read_protection = Some(protection);
        Ok(())
    }
}
