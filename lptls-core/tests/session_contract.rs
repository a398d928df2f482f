//! Session lifecycle contract: readiness gating, sequence-counter
//! discipline, and no reuse after completion or failure.

mod common;

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use common::{generate_identity, read_record_bytes, TestValidator};
use lptls_core::{ClientOptions, Error, SecureSession, ServerOptions, SessionState};
use lptls_crypto::CryptoProvider;
use lptls_crypto_rustcrypto::RustCryptoProvider;

#[test]
fn test_record_operations_require_authentication() {
    let provider = RustCryptoProvider::new();
    let mut session = SecureSession::client(
        Arc::new(TestValidator::accepting()),
        ClientOptions::new("nowhere.test"),
    );

    assert_eq!(session.state(), SessionState::Start);
    assert_eq!(
        session.encrypt_and_frame(&provider, b"too early"),
        Err(Error::NotReady)
    );
    assert_eq!(session.decrypt_record(&provider, &[23, 3, 1, 0, 0]), Err(Error::NotReady));
    assert_eq!(session.close_notify(&provider), Err(Error::NotReady));
}

/// After the handshake each direction starts at sequence 1 (the Finished
/// message consumed number 0), and every record advances it by exactly
/// one.
#[test]
fn test_sequence_counters_advance_per_record() {
    let provider = RustCryptoProvider::new();
    let identity = generate_identity(1024);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let provider = RustCryptoProvider::new();
        let (mut stream, _) = listener.accept().unwrap();
        let mut session = SecureSession::server(
            Arc::new(TestValidator::accepting()),
            ServerOptions::new(identity.local_identity()),
        );
        session.authenticate_as_server(&provider, &mut stream).unwrap();

        // The client Finished consumed sequence 0; application records
        // then advance the counter one by one.
        assert_eq!(session.read_sequence(), 1);
        for consumed in 1..=3u64 {
            let record = read_record_bytes(&mut stream).unwrap();
            session.decrypt_record(&provider, &record).unwrap();
            assert_eq!(session.read_sequence(), 1 + consumed);
        }
        session
    });

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut client = SecureSession::client(
        Arc::new(TestValidator::accepting()),
        ClientOptions::new("loopback.test"),
    );
    client.authenticate_as_client(&provider, &mut stream).unwrap();
    assert_eq!(client.write_sequence(), 1);

    use std::io::Write;
    for expected in 2..=4u64 {
        let record = client.encrypt_and_frame(&provider, b"tick").unwrap();
        stream.write_all(&record).unwrap();
        assert_eq!(client.write_sequence(), expected);
    }

    server.join().unwrap();
}

/// Large writes fragment into multiple records, one sequence number each.
#[test]
fn test_large_write_fragments() {
    let provider = RustCryptoProvider::new();
    let identity = generate_identity(1024);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let payload = vec![0x5Au8; 16384 + 4000];
    let expected = payload.clone();

    let server = thread::spawn(move || {
        let provider = RustCryptoProvider::new();
        let (mut stream, _) = listener.accept().unwrap();
        let mut session = SecureSession::server(
            Arc::new(TestValidator::accepting()),
            ServerOptions::new(identity.local_identity()),
        );
        session.authenticate_as_server(&provider, &mut stream).unwrap();

        let mut received = Vec::new();
        while received.len() < expected.len() {
            let record = read_record_bytes(&mut stream).unwrap();
            received.extend(session.decrypt_record(&provider, &record).unwrap());
        }
        assert_eq!(received, expected);
        assert_eq!(session.read_sequence(), 3); // Finished + two fragments
    });

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut client = SecureSession::client(
        Arc::new(TestValidator::accepting()),
        ClientOptions::new("loopback.test"),
    );
    client.authenticate_as_client(&provider, &mut stream).unwrap();

    let records = client.encrypt_and_frame(&provider, &payload).unwrap();
    assert_eq!(client.write_sequence(), 3);
    use std::io::Write;
    stream.write_all(&records).unwrap();

    server.join().unwrap();
}

/// A tampered inbound record fails the session permanently; the counter
/// does not advance and nothing can be decrypted afterwards.
#[test]
fn test_tampered_record_poisons_session() {
    let provider = RustCryptoProvider::new();
    let identity = generate_identity(1024);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let provider = RustCryptoProvider::new();
        let (mut stream, _) = listener.accept().unwrap();
        let mut session = SecureSession::server(
            Arc::new(TestValidator::accepting()),
            ServerOptions::new(identity.local_identity()),
        );
        session.authenticate_as_server(&provider, &mut stream).unwrap();
        let record = session.encrypt_and_frame(&provider, b"integrity matters").unwrap();
        use std::io::Write;
        stream.write_all(&record).unwrap();
    });

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut client = SecureSession::client(
        Arc::new(TestValidator::accepting()),
        ClientOptions::new("loopback.test"),
    );
    client.authenticate_as_client(&provider, &mut stream).unwrap();

    let mut record = read_record_bytes(&mut stream).unwrap();
    let last = record.len() - 1;
    record[last] ^= 0x01;

    assert!(matches!(
        client.decrypt_record(&provider, &record),
        Err(Error::AuthenticationFailure(_))
    ));
    assert_eq!(client.state(), SessionState::Failed);
    assert_eq!(client.read_sequence(), 1); // unchanged since Finished

    // The session is dead for good.
    assert_eq!(
        client.encrypt_and_frame(&provider, b"nope"),
        Err(Error::NotReady)
    );

    server.join().unwrap();
}

/// Sessions are single-use: a completed session refuses a second
/// handshake.
#[test]
fn test_session_cannot_be_reused() {
    let provider = RustCryptoProvider::new();
    let identity = generate_identity(1024);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let provider = RustCryptoProvider::new();
        let (mut stream, _) = listener.accept().unwrap();
        let mut session = SecureSession::server(
            Arc::new(TestValidator::accepting()),
            ServerOptions::new(identity.local_identity()),
        );
        session.authenticate_as_server(&provider, &mut stream).unwrap();
    });

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut client = SecureSession::client(
        Arc::new(TestValidator::accepting()),
        ClientOptions::new("loopback.test"),
    );
    client.authenticate_as_client(&provider, &mut stream).unwrap();
    server.join().unwrap();

    let result = client.authenticate_as_client(&provider, &mut stream);
    assert!(matches!(result, Err(Error::ProtocolViolation { .. })));
}

/// Role and entry point must agree.
#[test]
fn test_role_mismatch_is_a_configuration_error() {
    let provider = RustCryptoProvider::new();
    let mut client = SecureSession::client(
        Arc::new(TestValidator::accepting()),
        ClientOptions::new("nowhere.test"),
    );
    let mut fake_stream = std::io::Cursor::new(Vec::new());
    assert!(matches!(
        client.authenticate_as_server(&provider, &mut fake_stream),
        Err(Error::ConfigurationError(_))
    ));
}
