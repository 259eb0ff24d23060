//! Property-based tests for vaultlink-core using proptest
//!
//! These tests verify invariants that should hold for all valid inputs.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use k256::ecdsa::{signature::Signer, Signature, SigningKey};
use proptest::prelude::*;

use vaultlink_core::{
    gate, verify_session, CoreError, GateDecision, PairingSession, ProtectionTier, SecretAccess,
};

// ============================================
// Strategies
// ============================================

fn arb_session_id() -> impl Strategy<Value = String> {
    "[a-f0-9]{8,32}"
}

fn arb_key_hex() -> impl Strategy<Value = String> {
    (prop::bool::ANY, proptest::array::uniform32(any::<u8>())).prop_map(|(high_y, x)| {
        let mut bytes = [0u8; 33];
        bytes[0] = if high_y { 0x03 } else { 0x02 };
        bytes[1..].copy_from_slice(&x);
        hex::encode(bytes)
    })
}

fn arb_sig_hex() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<u8>(), 64).prop_map(hex::encode)
}

fn arb_version() -> impl Strategy<Value = u32> {
    prop_oneof![Just(1u32), Just(2u32)]
}

fn arb_tier() -> impl Strategy<Value = ProtectionTier> {
    prop_oneof![
        Just(ProtectionTier::Normal),
        Just(ProtectionTier::Confirm),
        Just(ProtectionTier::TopSecret),
    ]
}

// ============================================
// Pairing code codec
// ============================================

proptest! {
    #[test]
    fn pairing_code_roundtrip(
        version in arb_version(),
        session_id in arb_session_id(),
        pk_pers in arb_key_hex(),
        pk_ephe in arb_key_hex(),
        sig in arb_sig_hex(),
    ) {
        let code = BASE64.encode(format!("{version}:{session_id}:{pk_pers}:{pk_ephe}:{sig}"));
        let session = PairingSession::decode(&code).unwrap();
        prop_assert_eq!(session.version.as_u32(), version);
        prop_assert_eq!(&session.session_id, &session_id);
        prop_assert_eq!(session.encode(), code);
    }

    #[test]
    fn unknown_versions_rejected(
        version in 3u32..1000,
        session_id in arb_session_id(),
        pk_pers in arb_key_hex(),
        pk_ephe in arb_key_hex(),
        sig in arb_sig_hex(),
    ) {
        let code = BASE64.encode(format!("{version}:{session_id}:{pk_pers}:{pk_ephe}:{sig}"));
        prop_assert!(matches!(
            PairingSession::decode(&code),
            Err(CoreError::UnsupportedVersion(v)) if v == version
        ));
    }

    #[test]
    fn noncanonical_version_fields_rejected(
        version in arb_version(),
        prefix in prop_oneof![Just("0"), Just("00"), Just("+")],
        session_id in arb_session_id(),
        pk_pers in arb_key_hex(),
        pk_ephe in arb_key_hex(),
        sig in arb_sig_hex(),
    ) {
        // "01" and "+1" parse to the same integer as "1" but would not
        // survive the encode round-trip.
        let code = BASE64.encode(format!("{prefix}{version}:{session_id}:{pk_pers}:{pk_ephe}:{sig}"));
        prop_assert!(matches!(
            PairingSession::decode(&code),
            Err(CoreError::MalformedCode(_))
        ));
    }

    #[test]
    fn truncated_key_fields_rejected(
        session_id in arb_session_id(),
        pk_pers in arb_key_hex(),
        sig in arb_sig_hex(),
        cut in 1usize..66,
    ) {
        let truncated = &pk_pers[..pk_pers.len() - cut];
        let code = BASE64.encode(format!("1:{session_id}:{truncated}:{pk_pers}:{sig}"));
        prop_assert!(matches!(
            PairingSession::decode(&code),
            Err(CoreError::MalformedCode(_))
        ));
    }
}

// ============================================
// Signature verification
// ============================================

fn signed_session(session_id: &str) -> PairingSession {
    let signing_key = SigningKey::random(&mut rand::thread_rng());
    let pk_pers_hex = hex::encode(signing_key.verifying_key().to_sec1_bytes());

    let ephemeral = SigningKey::random(&mut rand::thread_rng());
    let pk_ephe_hex = hex::encode(ephemeral.verifying_key().to_sec1_bytes());

    let payload = format!("{session_id}{pk_pers_hex}{pk_ephe_hex}");
    let signature: Signature = signing_key.sign(payload.as_bytes());

    PairingSession {
        version: vaultlink_core::SchemaVersion::V2,
        session_id: session_id.to_string(),
        peer_persistent_key_hex: pk_pers_hex,
        peer_ephemeral_key_hex: pk_ephe_hex,
        signature_hex: hex::encode(signature.to_bytes()),
    }
}

proptest! {
    // Signing is slow; keep the case count modest.
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn valid_sessions_verify(session_id in arb_session_id()) {
        prop_assert!(verify_session(&signed_session(&session_id)));
    }

    #[test]
    fn corrupting_any_signature_nibble_fails(
        session_id in arb_session_id(),
        index in 0usize..128,
    ) {
        let mut session = signed_session(&session_id);
        let mut chars: Vec<char> = session.signature_hex.chars().collect();
        chars[index] = if chars[index] == 'f' { '0' } else { 'f' };
        let corrupted: String = chars.iter().collect();
        prop_assume!(corrupted != session.signature_hex);
        session.signature_hex = corrupted;
        prop_assert!(!verify_session(&session));
    }

    #[test]
    fn corrupting_any_key_nibble_fails(
        session_id in arb_session_id(),
        index in 2usize..66,
    ) {
        // Skip the compression prefix; flipping it may still be a valid
        // point, but then the signature no longer matches the payload.
        let mut session = signed_session(&session_id);
        let mut chars: Vec<char> = session.peer_persistent_key_hex.chars().collect();
        chars[index] = if chars[index] == 'f' { '0' } else { 'f' };
        let corrupted: String = chars.iter().collect();
        prop_assume!(corrupted != session.peer_persistent_key_hex);
        session.peer_persistent_key_hex = corrupted;
        prop_assert!(!verify_session(&session));
    }
}

// ============================================
// Gate policy
// ============================================

proptest! {
    #[test]
    fn gate_never_weakens_with_stricter_tier(tier_a in arb_tier(), tier_b in arb_tier()) {
        // Ordering on tiers implies ordering on requirements for the same
        // access kind.
        fn strictness(decision: GateDecision) -> u8 {
            match decision {
                GateDecision::Release => 0,
                GateDecision::RequireConfirm => 1,
                GateDecision::RequireStrongAuth => 2,
            }
        }

        for access in [SecretAccess::Secret, SecretAccess::Metadata] {
            if tier_a <= tier_b {
                prop_assert!(
                    strictness(gate(tier_a, access)) <= strictness(gate(tier_b, access))
                );
            }
        }
    }
}
