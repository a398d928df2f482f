//! Server handshake flow.
//!
//! ```text
//! recv ClientHello
//! send ServerHello, Certificate, [ServerKeyExchange],
//!      [CertificateRequest], ServerHelloDone
//! [recv Certificate]
//! recv ClientKeyExchange
//! [recv CertificateVerify]
//! recv ChangeCipherSpec, Finished
//! send ChangeCipherSpec, Finished
//! ```

use std::io::{Read, Write};

use lptls_crypto::CryptoProvider;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::{check_finished, new_hello_random};
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
use crate::protocol::{HandshakeType, ProtocolVersion, Role};
use crate::session::{SecureSession, ServerOptions, SessionState};

/// Export suites limit the key-transport modulus to 512 bits; a larger
/// certified key forces an ephemeral ServerKeyExchange.
const EXPORT_MODULUS_LIMIT: usize = 512 / 8;

/// State the server accumulates across the client's second flight.
struct ClientAuth {
    requested: bool,
    required: bool,
    chain: Option<Vec<Vec<u8>>>,
}

pub(crate) fn run<S: Read + Write>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
) -> Result<()> {
    let options = session
        .server_options
        .take()
        .ok_or_else(|| Error::ConfigurationError("server session without options".into()))?;
    validate_options(&options)?;

    receive_client_hello(session, provider, stream, &options)?;
    let ephemeral_key = send_server_flight(session, provider, stream, &options)?;
    let mut auth = ClientAuth {
        requested: options.request_client_certificate || options.require_client_certificate,
        required: options.require_client_certificate,
        chain: None,
    };
    receive_client_certificate(session, provider, stream, &options, &mut auth)?;
    receive_client_key_exchange(session, provider, stream, &options, ephemeral_key)?;
    receive_certificate_verify(session, provider, stream, &auth)?;
    finish(session, provider, stream)?;

    session.server_options = Some(options);
    Ok(())
}

fn validate_options(options: &ServerOptions) -> Result<()> {
    if options.identity.certificate_chain.is_empty() {
        return Err(Error::ConfigurationError("server identity has no certificate".into()));
    }
    if options.identity.private_key_der.is_empty() {
        return Err(Error::ConfigurationError("server identity has no private key".into()));
    }
    if options.enabled_suites.is_empty() {
        return Err(Error::ConfigurationError("no cipher suites enabled".into()));
    }
    for &id in &options.enabled_suites {
        if CipherSuite::lookup(id).is_none() {
            return Err(Error::ConfigurationError(format!(
                "enabled cipher suite {:#06x} is not supported",
                id
            )));
        }
    }
    Ok(())
}

fn receive_client_hello<S: Read>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    options: &ServerOptions,
) -> Result<()> {
    let message = session.next_handshake(provider, stream)?;
    if message.msg_type != HandshakeType::ClientHello {
        return Err(Error::protocol_in(message.msg_type, "expected ClientHello"));
    }
    session.transcribe(&message)?;

    let hello = ClientHello::decode(&message.payload)?;
    if !hello.compression_methods.contains(&COMPRESSION_NULL) {
        return Err(Error::UnsupportedNegotiation(
            "client requires compression".into(),
        ));
    }

    // Version: the highest both sides speak. The raw offer is retained
    // for the premaster downgrade check.
    let negotiated = hello.version.min(options.protocol_version);
    session.offered_version = Some(hello.version);
    session.version = negotiated;

    // Suite: first of our preference list the client also offers.
    let suite = options
        .enabled_suites
        .iter()
        .copied()
        .find(|id| hello.cipher_suites.contains(id))
        .and_then(CipherSuite::lookup)
        .ok_or_else(|| Error::UnsupportedNegotiation("no common cipher suite".into()))?;

    session.suite = Some(suite);
    session.client_random = Some(hello.random);
    tracing::debug!(version = negotiated.name(), suite = suite.name, "negotiated");
    Ok(())
}

/// Send ServerHello through ServerHelloDone. Returns the ephemeral
/// private key when an export ServerKeyExchange was sent.
fn send_server_flight<S: Write>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    options: &ServerOptions,
) -> Result<Option<Zeroizing<Vec<u8>>>> {
    let suite = session
        .suite
        .ok_or_else(|| Error::protocol("no cipher suite negotiated"))?;

    // ServerHello
    let server_random = new_hello_random(provider)?;
    session.server_random = Some(server_random);
    let hello = ServerHello::new(session.version, server_random, suite.id);
    let message = HandshakeMessage::new(HandshakeType::ServerHello, hello.encode()?);
    session.send_handshake(provider, stream, &message)?;
    session.state = SessionState::HelloExchanged;

    // Certificate
    let chain = CertificateChain::new(options.identity.certificate_chain.clone());
    let message = HandshakeMessage::new(HandshakeType::Certificate, chain.encode()?);
    session.send_handshake(provider, stream, &message)?;

    // ServerKeyExchange for export suites with an oversized certified key.
    let mut ephemeral_key = None;
    if suite.exportable && suite.key_material > 0 {
        let certified_public = session
            .validator
            .rsa_public_key(options.identity.leaf()?)
            .map_err(Error::ConfigurationError)?;
        let rsa = provider.rsa()?;
        if rsa.modulus_len(&certified_public)? > EXPORT_MODULUS_LIMIT {
            let (private_der, public_der) = rsa.generate_keypair(EXPORT_MODULUS_LIMIT * 8)?;
            let (modulus, exponent) = rsa.public_key_parts(&public_der)?;

            let client_random = session
                .client_random
                .ok_or_else(|| Error::protocol("missing client random"))?;
            let mut key_exchange = ServerKeyExchange::new(modulus, exponent, Vec::new());
            let digest = signed_params_digest(
                provider,
                &client_random,
                &server_random,
                &key_exchange.params_bytes(),
            )?;
            key_exchange.signature =
                rsa.sign_pkcs1(&options.identity.private_key_der, &digest)?;

            let message = HandshakeMessage::new(
                HandshakeType::ServerKeyExchange,
                key_exchange.encode()?,
            );
            session.send_handshake(provider, stream, &message)?;
            ephemeral_key = Some(Zeroizing::new(private_der));
        }
    }

    // CertificateRequest
    if options.request_client_certificate || options.require_client_certificate {
        let request = CertificateRequest::new(options.acceptable_issuers.clone());
        let message =
            HandshakeMessage::new(HandshakeType::CertificateRequest, request.encode()?);
        session.send_handshake(provider, stream, &message)?;
    }

    // ServerHelloDone
    let message = HandshakeMessage::new(HandshakeType::ServerHelloDone, ServerHelloDone.encode()?);
    session.send_handshake(provider, stream, &message)?;
    stream.flush()?;
    Ok(ephemeral_key)
}

fn receive_client_certificate<S: Read>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    options: &ServerOptions,
    auth: &mut ClientAuth,
) -> Result<()> {
    if !auth.requested {
        return Ok(());
    }

    // A TLS client answers with a Certificate message (possibly empty);
    // an SSL 3.0 client may decline with a no_certificate warning, which
    // session I/O records in `peer_declined_certificate`.
    let message = session.next_handshake(provider, stream)?;
    match message.msg_type {
        HandshakeType::Certificate => {
            session.transcribe(&message)?;
            let chain = CertificateChain::decode(&message.payload)?;
            if !chain.is_empty() {
                session
                    .validator
                    .validate_chain(
                        &chain.certificates,
                        CertificatePurpose::Client,
                        options.check_revocation,
                    )
                    .map_err(Error::UntrustedPeer)?;
                session.peer_certificates = chain.certificates.clone();
                auth.chain = Some(chain.certificates);
            }
        },
        HandshakeType::ClientKeyExchange
            if session.version == ProtocolVersion::Ssl30
                && session.peer_declined_certificate =>
        {
            // The warning alert stood in for the Certificate message; the
            // key exchange is processed by the next step.
            session.reinject_handshake(message);
        },
        other => {
            return Err(Error::protocol_in(other, "expected client Certificate"));
        },
    }

    if auth.chain.is_none() && auth.required {
        return Err(Error::UntrustedPeer("client certificate required".into()));
    }
    Ok(())
}

fn receive_client_key_exchange<S: Read>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    options: &ServerOptions,
    ephemeral_key: Option<Zeroizing<Vec<u8>>>,
) -> Result<()> {
    let message = session.next_handshake(provider, stream)?;
    if message.msg_type != HandshakeType::ClientKeyExchange {
        return Err(Error::protocol_in(message.msg_type, "expected ClientKeyExchange"));
    }
    session.transcribe(&message)?;

    let key_exchange = ClientKeyExchange::decode(session.version, &message.payload)?;

    let rsa = provider.rsa()?;
    let decryption_key: &[u8] = match &ephemeral_key {
        Some(key) => key.as_slice(),
        None => options.identity.private_key_der.as_slice(),
    };
    let premaster = Zeroizing::new(
        rsa.decrypt_pkcs1(decryption_key, &key_exchange.encrypted_premaster)
            .map_err(|_| {
                Error::AuthenticationFailure("premaster secret decryption failed".into())
            })?,
    );

    if premaster.len() != PREMASTER_SECRET_LEN {
        return Err(Error::AuthenticationFailure(format!(
            "premaster secret has {} bytes",
            premaster.len()
        )));
    }

    // Downgrade detection: the version inside the premaster must equal
    // the version the client advertised in its hello, byte for byte.
    let offered = session
        .offered_version
        .ok_or_else(|| Error::protocol("missing offered version"))?;
    let version_prefix = [offered.major(), offered.minor()];
    if !bool::from(premaster[..2].ct_eq(&version_prefix)) {
        return Err(Error::AuthenticationFailure(
            "premaster version prefix mismatch".into(),
        ));
    }

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
    Ok(())
}

fn receive_certificate_verify<S: Read>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
    auth: &ClientAuth,
) -> Result<()> {
    let Some(chain) = &auth.chain else {
        return Ok(());
    };

    let message = session.next_handshake(provider, stream)?;
    if message.msg_type != HandshakeType::CertificateVerify {
        return Err(Error::protocol_in(message.msg_type, "expected CertificateVerify"));
    }

    // The signature covers the transcript up to and excluding this
    // message; compute the digest before transcribing it.
    let verify = CertificateVerify::decode(&message.payload)?;
    let keys = session
        .keys
        .as_ref()
        .ok_or_else(|| Error::protocol("CertificateVerify before key exchange"))?;
    let digest = certificate_verify_digest(
        provider,
        session.version,
        keys.master_secret(),
        session.transcript.as_bytes(),
    )?;

    let client_public = session
        .validator
        .rsa_public_key(&chain[0])
        .map_err(Error::UntrustedPeer)?;
    provider
        .rsa()?
        .verify_pkcs1(&client_public, &digest, &verify.signature)
        .map_err(|_| {
            Error::AuthenticationFailure("CertificateVerify signature verification failed".into())
        })?;

    session.transcribe(&message)?;
    session.state = SessionState::CertificateVerified;
    Ok(())
}

fn finish<S: Read + Write>(
    session: &mut SecureSession,
    provider: &dyn CryptoProvider,
    stream: &mut S,
) -> Result<()> {
    // Client's ChangeCipherSpec and Finished.
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
        Role::Client,
        keys.master_secret(),
        session.transcript.as_bytes(),
        &finished.verify_data,
    )?;
    session.transcribe(&message)?;
    session.state = SessionState::Finished;

    // Our ChangeCipherSpec and Finished, computed over a transcript that
    // includes the client's Finished.
    session.send_change_cipher_spec(provider, stream)?;
    let keys = session
        .keys
        .as_ref()
        .ok_or_else(|| Error::protocol("key material not derived"))?;
    let verify_data = finished_verify_data(
        provider,
        session.version,
        Role::Server,
        keys.master_secret(),
        session.transcript.as_bytes(),
    )?;
    let message =
        HandshakeMessage::new(HandshakeType::Finished, Finished::new(verify_data).encode()?);
    session.send_handshake(provider, stream, &message)?;
    stream.flush()?;
    Ok(())
}
