#![no_main]

use libfuzzer_sys::fuzz_target;
use vaultlink_core::PairingSession;

fuzz_target!(|data: &[u8]| {
    if let Ok(code) = std::str::from_utf8(data) {
        if let Ok(session) = PairingSession::decode(code) {
            // A session that decoded must re-encode to the same code.
            let reencoded = session.encode();
            let session2 = PairingSession::decode(&reencoded).unwrap();
            assert_eq!(session, session2);

            // Key and signature accessors must not panic; the hex fields
            // were length- and charset-checked at decode time.
            let _ = session.persistent_key();
            let _ = session.ephemeral_key();
            let _ = session.signature();

            // Verification must never panic on hostile input.
            let _ = vaultlink_core::verify_session(&session);
        }
    }
});
