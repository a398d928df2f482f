//! Client handshake flow.
//!
//! ```text
//! send ClientHello
//! recv ServerHello
//! recv Certificate
//! [recv ServerKeyExchange]        (export suites)
//! [recv CertificateRequest]
//! recv ServerHelloDone
//! [send Certificate]
//! send ClientKeyExchange
//! [send CertificateVerify]
//! send ChangeCipherSpec, Finished
//! recv ChangeCipherSpec, Finished
//! ```

use std::io::{Read, Write};

use lptls_crypto::CryptoProvider;
use zeroize::Zeroizing;

use super::{check_finished, new_hello_random};
use crate::alert::Alert;
use crate::certificate_validator::CertificatePurpose;
use crate::cipher::CipherSuite;
use crate::error::{Error, Result};
use crate::handshake_io::HandshakeMessage;
use crate::key_schedule::{self, PREMASTER_SECRET_LEN};
use crate::messages::client_hello::COMPRESSION_NULL;
use crate::messages::{
    CertificateChain, CertificateRequest, CertificateVerify, ClientHello, ClientKeyExchange,
    Finished, ServerHello, ServerHelloDone, ServerKeyExchange,
};
use crate::prf::{certificate_verify_digest, finished_verify_data, signed_params_digest};
use crate::protocol::{ContentType, HandshakeType, ProtocolVersion, Role};
use crate::session::{ClientOptions, SecureSession, SessionState};

pub(crate) fn run<S: Read + Write>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
) -> Result<()> {
    let options = session
        .client_options
        .take()
        .ok_or_else(|| Error::ConfigurationError("client session without options".into()))?;
    validate_options(&options)?;

    tracing::debug!(host = %options.target_host, "starting client handshake");

    send_client_hello(session, provider, stream, &options)?;
    receive_server_hello(session, provider, stream, &options)?;
    receive_server_certificate(session, provider, stream, &options)?;
    receive_server_flight(session, provider, stream)?;
    send_client_flight(session, provider, stream, &options)?;
    finish(session, provider, stream)?;

    session.client_options = Some(options);
    Ok(())
}

fn validate_options(options: &ClientOptions) -> Result<()> {
    if options.offered_suites.is_empty() {
        return Err(Error::ConfigurationError("no cipher suites to offer".into()));
    }
    for &id in &options.offered_suites {
        if CipherSuite::lookup(id).is_none() {
            return Err(Error::ConfigurationError(format!(
                "offered cipher suite {:#06x} is not supported",
                id
            )));
        }
    }
    Ok(())
}

fn send_client_hello<S: Write>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    options: &ClientOptions,
) -> Result<()> {
    let random = new_hello_random(provider)?;
    session.client_random = Some(random);
    session.offered_version = Some(options.protocol_version);

    let hello = ClientHello::new(options.protocol_version, random, options.offered_suites.clone());
    let message = HandshakeMessage::new(HandshakeType::ClientHello, hello.encode()?);
    session.send_handshake(provider, stream, &message)?;
    stream.flush()?;
    Ok(())
}

fn receive_server_hello<S: Read>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    options: &ClientOptions,
) -> Result<()> {
    let message = session.next_handshake(provider, stream)?;
    if message.msg_type != HandshakeType::ServerHello {
        return Err(Error::protocol_in(message.msg_type, "expected ServerHello"));
    }
    session.transcribe(&message)?;

    let hello = ServerHello::decode(&message.payload)?;
    if hello.version > options.protocol_version {
        return Err(Error::UnsupportedNegotiation(format!(
            "server selected {} above our offer",
            hello.version.name()
        )));
    }
    if hello.compression_method != COMPRESSION_NULL {
        return Err(Error::UnsupportedNegotiation("compression not supported".into()));
    }

    let suite = CipherSuite::lookup(hello.cipher_suite)
        .filter(|suite| options.offered_suites.contains(&suite.id))
        .ok_or_else(|| {
            Error::UnsupportedNegotiation(format!(
                "server selected unoffered cipher suite {:#06x}",
                hello.cipher_suite
            ))
        })?;

    session.version = hello.version;
    session.suite = Some(suite);
    session.server_random = Some(hello.random);
    session.state = SessionState::HelloExchanged;
    tracing::debug!(version = hello.version.name(), suite = suite.name, "negotiated");
    Ok(())
}

fn receive_server_certificate<S: Read>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    options: &ClientOptions,
) -> Result<()> {
    let message = session.next_handshake(provider, stream)?;
    if message.msg_type != HandshakeType::Certificate {
        return Err(Error::protocol_in(message.msg_type, "expected Certificate"));
    }
    session.transcribe(&message)?;

    let chain = CertificateChain::decode(&message.payload)?;
    if chain.is_empty() {
        return Err(Error::UntrustedPeer("server sent no certificate".into()));
    }

    session
        .validator
        .validate_chain(
            &chain.certificates,
            CertificatePurpose::Server,
            options.check_revocation,
        )
        .map_err(Error::UntrustedPeer)?;

    let public_key = session
        .validator
        .rsa_public_key(&chain.certificates[0])
        .map_err(Error::UntrustedPeer)?;

    session.peer_certificates = chain.certificates;
    session.peer_exchange_key = Some(public_key);
    Ok(())
}

/// Consume the remainder of the server's first flight, in order:
/// optional ServerKeyExchange, optional CertificateRequest,
/// then ServerHelloDone.
fn receive_server_flight<S: Read>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
) -> Result<()> {
    let mut seen_key_exchange = false;
    let mut seen_certificate_request = false;

    loop {
        let message = session.next_handshake(provider, stream)?;
        match message.msg_type {
            HandshakeType::ServerKeyExchange => {
                if seen_key_exchange || seen_certificate_request {
                    return Err(Error::protocol_in(
                        message.msg_type,
                        "ServerKeyExchange out of order",
                    ));
                }
                seen_key_exchange = true;
                session.transcribe(&message)?;
                process_server_key_exchange(session, provider, &message.payload)?;
            },
            HandshakeType::CertificateRequest => {
                if seen_certificate_request {
                    return Err(Error::protocol_in(
                        message.msg_type,
                        "duplicate CertificateRequest",
                    ));
                }
                seen_certificate_request = true;
                session.transcribe(&message)?;
                session.certificate_request =
                    Some(CertificateRequest::decode(&message.payload)?);
            },
            HandshakeType::ServerHelloDone => {
                session.transcribe(&message)?;
                ServerHelloDone::decode(&message.payload)?;
                return Ok(());
            },
            other => {
                return Err(Error::protocol_in(other, "unexpected message before ServerHelloDone"));
            },
        }
    }
}

/// Verify the export ServerKeyExchange signature and switch the premaster
/// encryption key to the ephemeral one.
fn process_server_key_exchange(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    payload: &[u8],
) -> Result<()> {
    let suite = session
        .suite
        .ok_or_else(|| Error::protocol("ServerKeyExchange before ServerHello"))?;
    if !suite.exportable {
        return Err(Error::protocol_in(
            HandshakeType::ServerKeyExchange,
            "ServerKeyExchange with a non-export suite",
        ));
    }

    let key_exchange = ServerKeyExchange::decode(payload)?;
    let client_random = session
        .client_random
        .ok_or_else(|| Error::protocol("missing client random"))?;
    let server_random = session
        .server_random
        .ok_or_else(|| Error::protocol("missing server random"))?;

    let digest = signed_params_digest(
        provider,
        &client_random,
        &server_random,
        &key_exchange.params_bytes(),
    )?;

    let certified_key = session
        .peer_exchange_key
        .as_deref()
        .ok_or_else(|| Error::protocol("ServerKeyExchange before Certificate"))?;

    let rsa = provider.rsa()?;
    rsa.verify_pkcs1(certified_key, &digest, &key_exchange.signature)
        .map_err(|_| {
            Error::AuthenticationFailure("ServerKeyExchange signature verification failed".into())
        })?;

    let ephemeral_key = rsa.public_key_from_parts(&key_exchange.modulus, &key_exchange.exponent)?;
    session.peer_exchange_key = Some(ephemeral_key);
    Ok(())
}

fn send_client_flight<S: Read + Write>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    options: &ClientOptions,
) -> Result<()> {
    // Client certificate, when requested.
    let mut signing_identity = None;
    if let Some(request) = session.certificate_request.take() {
        let validator = session.validator.clone();
        match validator.select_local_certificate(&request.distinguished_names) {
            Some(identity) => {
                if !request.accepts_rsa_sign() {
                    return Err(Error::ConfigurationError(
                        "server does not accept rsa_sign certificates".into(),
                    ));
                }
                if identity.private_key_der.is_empty() {
                    return Err(Error::ConfigurationError(
                        "selected client certificate has no private key".into(),
                    ));
                }
                let chain = CertificateChain::new(identity.certificate_chain.clone());
                let message =
                    HandshakeMessage::new(HandshakeType::Certificate, chain.encode()?);
                session.send_handshake(provider, stream, &message)?;
                signing_identity = Some(identity);
            },
            None => match session.version {
                // A certificate-less TLS client answers with an empty
                // chain; an SSL 3.0 client sends the no_certificate
                // warning instead (and nothing enters the transcript).
                ProtocolVersion::Tls10 => {
                    let message = HandshakeMessage::new(
                        HandshakeType::Certificate,
                        CertificateChain::empty().encode()?,
                    );
                    session.send_handshake(provider, stream, &message)?;
                },
                ProtocolVersion::Ssl30 => {
                    session.send_record(
                        provider,
                        stream,
                        ContentType::Alert,
                        &Alert::no_certificate().encode(),
                    )?;
                },
            },
        }
    }

    // ClientKeyExchange: encrypt the version-prefixed premaster under the
    // server's exchange key. The prefix is the version we *offered*, not
    // the negotiated one; the server compares it against our hello to
    // detect downgrade tampering.
    let offered = options.protocol_version;
    let mut premaster = Zeroizing::new(vec![0u8; PREMASTER_SECRET_LEN]);
    premaster[0] = offered.major();
    premaster[1] = offered.minor();
    provider.random().fill(&mut premaster[2..])?;

    let exchange_key = session
        .peer_exchange_key
        .as_deref()
        .ok_or_else(|| Error::protocol("no server key to encrypt premaster under"))?;
    let rsa = provider.rsa()?;
    let encrypted = rsa.encrypt_pkcs1(exchange_key, &premaster)?;

    let key_exchange = ClientKeyExchange::new(encrypted);
    let message = HandshakeMessage::new(
        HandshakeType::ClientKeyExchange,
        key_exchange.encode(session.version)?,
    );
    session.send_handshake(provider, stream, &message)?;

    // Both sides can now derive the session keys.
    let suite = session
        .suite
        .ok_or_else(|| Error::protocol("no cipher suite negotiated"))?;
    let client_random = session
        .client_random
        .ok_or_else(|| Error::protocol("missing client random"))?;
    let server_random = session
        .server_random
        .ok_or_else(|| Error::protocol("missing server random"))?;
    session.keys = Some(key_schedule::derive(
        provider,
        session.version,
        suite,
        premaster,
        client_random,
        server_random,
    )?);
    session.state = SessionState::KeyExchanged;

    // CertificateVerify: prove we hold the certificate's key.
    if let Some(identity) = &signing_identity {
        let keys = session
            .keys
            .as_ref()
            .ok_or_else(|| Error::protocol("key material not derived"))?;
        let digest = certificate_verify_digest(
            provider,
            session.version,
            keys.master_secret(),
            session.transcript.as_bytes(),
        )?;
        let signature = rsa.sign_pkcs1(&identity.private_key_der, &digest)?;
        let message = HandshakeMessage::new(
            HandshakeType::CertificateVerify,
            CertificateVerify::new(signature).encode()?,
        );
        session.send_handshake(provider, stream, &message)?;
        session.state = SessionState::CertificateVerified;
    }
    session.local_identity = signing_identity;

    // ChangeCipherSpec and Finished under the new keys.
    session.send_change_cipher_spec(provider, stream)?;
    let keys = session
        .keys
        .as_ref()
        .ok_or_else(|| Error::protocol("key material not derived"))?;
    let verify_data = finished_verify_data(
        provider,
        session.version,
        Role::Client,
        keys.master_secret(),
        session.transcript.as_bytes(),
    )?;
    let message = HandshakeMessage::new(HandshakeType::Finished, Finished::new(verify_data).encode()?);
    session.send_handshake(provider, stream, &message)?;
    stream.flush()?;
    Ok(())
}

fn finish<S: Read>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
) -> Result<()> {
    session.read_change_cipher_spec(provider, stream)?;

    let message = session.next_handshake(provider, stream)?;
    if message.msg_type != HandshakeType::Finished {
        return Err(Error::protocol_in(message.msg_type, "expected Finished"));
    }

    let finished = Finished::decode(session.version, &message.payload)?;
    let keys = session
        .keys
        .as_ref()
        .ok_or_else(|| Error::protocol("Finished before key exchange"))?;
    check_finished(
        provider,
        session.version,
        Role::Server,
        keys.master_secret(),
        session.transcript.as_bytes(),
        &finished.verify_data,
    )?;

    // The server's Finished joins the transcript only after verifying.
    session.transcribe(&message)?;
    session.state = SessionState::Finished;
    Ok(())
}
