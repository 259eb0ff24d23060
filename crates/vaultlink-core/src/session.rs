//! Pairing session codec
//!
//! A pairing code is the base64 encoding of the ASCII string
//! `"{version}:{sessionId}:{peerPersistentKeyHex}:{peerEphemeralKeyHex}:{signatureHex}"`,
//! commonly delivered via a QR code scanned off the browser extension.
//! Decoding is pure and deterministic; a decoded session is immutable and
//! consumed exactly once to open a channel.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{PeerPublicKey, SessionSignature};
use crate::{PAIRING_CODE_FIELDS, PUBLIC_KEY_LEN, SIGNATURE_LEN};

/// Protocol revision carried by a pairing code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SchemaVersion {
    V1,
    V2,
}

impl SchemaVersion {
    pub fn as_u32(&self) -> u32 {
        match self {
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 2,
        }
    }
}

impl TryFrom<u32> for SchemaVersion {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(SchemaVersion::V1),
            2 => Ok(SchemaVersion::V2),
            other => Err(CoreError::UnsupportedVersion(other)),
        }
    }
}

impl From<SchemaVersion> for u32 {
    fn from(version: SchemaVersion) -> u32 {
        version.as_u32()
    }
}

/// A decoded, not-yet-verified pairing session
///
/// Key and signature fields are kept as the hex strings that were signed;
/// `signed_payload` depends on their exact byte representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingSession {
    pub version: SchemaVersion,
    pub session_id: String,
    pub peer_persistent_key_hex: String,
    pub peer_ephemeral_key_hex: String,
    pub signature_hex: String,
}

impl PairingSession {
    /// Decode a pairing code into a session.
    ///
    /// Hex field lengths are checked here, so `verify_session` never acts
    /// as input validation.
    pub fn decode(pairing_code: &str) -> Result<Self> {
        let raw = BASE64
            .decode(pairing_code)
            .map_err(|e| CoreError::MalformedCode(format!("invalid base64: {}", e)))?;

        let text = String::from_utf8(raw)
            .map_err(|_| CoreError::MalformedCode("pairing code is not UTF-8".to_string()))?;

        let fields: Vec<&str> = text.split(':').collect();
        if fields.len() != PAIRING_CODE_FIELDS {
            return Err(CoreError::MalformedCode(format!(
                "expected {} fields, got {}",
                PAIRING_CODE_FIELDS,
                fields.len()
            )));
        }

        let version_raw: u32 = fields[0]
            .parse()
            .map_err(|_| CoreError::MalformedCode(format!("bad version field: {}", fields[0])))?;
        // Only the canonical decimal form is accepted ("01" and "+1"
        // would break the encode round-trip).
        if fields[0] != version_raw.to_string() {
            return Err(CoreError::MalformedCode(format!(
                "non-canonical version field: {}",
                fields[0]
            )));
        }
        let version = SchemaVersion::try_from(version_raw)?;

        check_hex_field(fields[2], PUBLIC_KEY_LEN, "persistent key")?;
        check_hex_field(fields[3], PUBLIC_KEY_LEN, "ephemeral key")?;
        check_hex_field(fields[4], SIGNATURE_LEN, "signature")?;

        Ok(Self {
            version,
            session_id: fields[1].to_string(),
            peer_persistent_key_hex: fields[2].to_string(),
            peer_ephemeral_key_hex: fields[3].to_string(),
            signature_hex: fields[4].to_string(),
        })
    }

    /// Re-encode the session as a pairing code.
    ///
    /// For any code accepted by `decode` this reproduces the input
    /// byte-for-byte.
    pub fn encode(&self) -> String {
        let text = format!(
            "{}:{}:{}:{}:{}",
            self.version.as_u32(),
            self.session_id,
            self.peer_persistent_key_hex,
            self.peer_ephemeral_key_hex,
            self.signature_hex
        );
        BASE64.encode(text.as_bytes())
    }

    /// The bytes the peer signed: `sessionId || pkPersHex || pkEpheHex`
    pub fn signed_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(
            self.session_id.len()
                + self.peer_persistent_key_hex.len()
                + self.peer_ephemeral_key_hex.len(),
        );
        payload.extend_from_slice(self.session_id.as_bytes());
        payload.extend_from_slice(self.peer_persistent_key_hex.as_bytes());
        payload.extend_from_slice(self.peer_ephemeral_key_hex.as_bytes());
        payload
    }

    /// Parse the persistent key field
    pub fn persistent_key(&self) -> Result<PeerPublicKey> {
        PeerPublicKey::from_hex(&self.peer_persistent_key_hex)
    }

    /// Parse the ephemeral key field
    pub fn ephemeral_key(&self) -> Result<PeerPublicKey> {
        PeerPublicKey::from_hex(&self.peer_ephemeral_key_hex)
    }

    /// Parse the signature field
    pub fn signature(&self) -> Result<SessionSignature> {
        SessionSignature::from_hex(&self.signature_hex)
    }
}

fn check_hex_field(field: &str, expected_bytes: usize, name: &str) -> Result<()> {
    if field.len() != expected_bytes * 2 {
        return Err(CoreError::MalformedCode(format!(
            "{} must be {} hex bytes, got {} chars",
            name,
            expected_bytes,
            field.len()
        )));
    }
    if !field.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CoreError::MalformedCode(format!("{} is not hex", name)));
    }
    Ok(())
}
