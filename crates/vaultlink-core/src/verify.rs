//! Pairing session signature verification

use crate::session::PairingSession;

/// Verify a decoded pairing session against its embedded key material.
///
/// The signature must cover `sessionId || pkPersHex || pkEpheHex` (UTF-8)
/// under the peer's persistent key. Any malformed key or signature, or a
/// failed check, returns `false`; the caller must treat `false` as fatal
/// to pairing and never retry with the same code.
pub fn verify_session(session: &PairingSession) -> bool {
    let key = match session.persistent_key() {
        Ok(key) => key,
        Err(_) => return false,
    };

    let signature = match session.signature() {
        Ok(signature) => signature,
        Err(_) => return false,
    };

    key.verify(&session.signed_payload(), &signature).is_ok()
}
