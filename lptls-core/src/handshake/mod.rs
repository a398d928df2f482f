//! Handshake flows.
//!
//! One module per role. Each flow is a sequence of step functions taking
//! the session by exclusive reference: no component keeps a long-lived
//! pointer into session internals beyond one step. The session drives
//! blocking record I/O; the flows own message ordering, transcript
//! bookkeeping and the cryptographic operations of each leg.

pub(crate) mod client;
pub(crate) mod server;

use lptls_crypto::CryptoProvider;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::prf::finished_verify_data;
use crate::protocol::{ProtocolVersion, Role};

/// Build a 32-byte hello random: 4 bytes of UNIX time, 28 secure-random
/// bytes.
pub(crate) fn new_hello_random(provider: &dyn CryptoProvider) -> Result<[u8; 32]> {
    let mut random = [0u8; 32];
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or(0);
    random[..4].copy_from_slice(&now.to_be_bytes());
    provider.random().fill(&mut random[4..])?;
    Ok(random)
}

/// Compare a received Finished body against the locally recomputed value.
///
/// The comparison covers the full length with no early exit; any mismatch
/// is a fatal authentication failure.
pub(crate) fn check_finished(
    provider: &dyn CryptoProvider,
    version: ProtocolVersion,
    sender: Role,
    master_secret: &[u8],
    transcript: &[u8],
    received: &[u8],
) -> Result<()> {
    let expected = finished_verify_data(provider, version, sender, master_secret, transcript)?;
    if received.len() != expected.len() || !bool::from(expected.ct_eq(received)) {
        return Err(Error::AuthenticationFailure(format!(
            "{} Finished verify data mismatch",
            sender.name()
        )));
    }
    Ok(())
}
