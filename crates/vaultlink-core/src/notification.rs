//! Push-wake descriptor
//!
//! A push notification announcing a pending remote request. Owned by the
//! notification-delivery collaborator; this crate only validates it and
//! reads it to seed a connect run.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{PeerPublicKey, SessionSignature};
use crate::{PUBLIC_KEY_LEN, SIGNATURE_LEN};

/// Out-of-band wake descriptor for a pending remote request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingServerNotification {
    pub id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub message_type: String,
    pub notification_id: String,

    /// Peer ephemeral public key, base64 of compressed SEC1 bytes
    pub peer_ephemeral_key: String,

    /// Peer persistent public key, base64 of compressed SEC1 bytes
    pub peer_persistent_key: String,

    /// Signature over the wake payload, base64 of raw r||s bytes
    pub push_signature: String,

    /// Peer-supplied timestamp, echoed verbatim into the signed payload
    pub timestamp: i64,
}

impl PendingServerNotification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Persistent key decoded from its base64 field
    pub fn persistent_key(&self) -> Option<PeerPublicKey> {
        let bytes = BASE64.decode(&self.peer_persistent_key).ok()?;
        let bytes: [u8; PUBLIC_KEY_LEN] = bytes.try_into().ok()?;
        Some(PeerPublicKey::new(bytes))
    }

    /// Ephemeral key hex, as used in the signed payload
    pub fn ephemeral_key_hex(&self) -> Option<String> {
        let bytes = BASE64.decode(&self.peer_ephemeral_key).ok()?;
        if bytes.len() != PUBLIC_KEY_LEN {
            return None;
        }
        Some(hex::encode(bytes))
    }

    /// Validate the push signature against the persistent key.
    ///
    /// The signed payload is the lowercased concatenation of the stored
    /// next session id (hex), the local device id, the ephemeral key hex,
    /// and the peer timestamp. Returns `false` on any malformed field.
    pub fn verify_push_signature(&self, next_session_id_hex: &str, device_id: &Uuid) -> bool {
        let Some(key) = self.persistent_key() else {
            return false;
        };

        let Some(pk_ephe_hex) = self.ephemeral_key_hex() else {
            return false;
        };

        let signature = match BASE64.decode(&self.push_signature) {
            Ok(bytes) => match <[u8; SIGNATURE_LEN]>::try_from(bytes.as_slice()) {
                Ok(raw) => SessionSignature::new(raw),
                Err(_) => return false,
            },
            Err(_) => return false,
        };

        let payload = format!(
            "{}{}{}{}",
            next_session_id_hex, device_id, pk_ephe_hex, self.timestamp
        )
        .to_lowercase();

        key.verify(payload.as_bytes(), &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use k256::ecdsa::{signature::Signer, Signature, SigningKey};

    fn notification_signed_by(
        signing_key: &SigningKey,
        session_id_hex: &str,
        device_id: &Uuid,
        timestamp: i64,
    ) -> PendingServerNotification {
        let pk_pers = signing_key.verifying_key().to_sec1_bytes();

        let ephemeral = SigningKey::random(&mut rand::thread_rng());
        let pk_ephe = ephemeral.verifying_key().to_sec1_bytes();

        let payload = format!(
            "{}{}{}{}",
            session_id_hex,
            device_id,
            hex::encode(&pk_ephe),
            timestamp
        )
        .to_lowercase();
        let signature: Signature = signing_key.sign(payload.as_bytes());

        PendingServerNotification {
            id: Uuid::new_v4(),
            expires_at: Utc::now() + Duration::minutes(5),
            message_type: "be_request".to_string(),
            notification_id: "n-1".to_string(),
            peer_ephemeral_key: BASE64.encode(&pk_ephe),
            peer_persistent_key: BASE64.encode(&pk_pers),
            push_signature: BASE64.encode(signature.to_bytes()),
            timestamp,
        }
    }

    #[test]
    fn test_push_signature_valid() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let device_id = Uuid::new_v4();
        let notification = notification_signed_by(&key, "0a1b2c3d", &device_id, 1_700_000_000);
        assert!(notification.verify_push_signature("0a1b2c3d", &device_id));
    }

    #[test]
    fn test_push_signature_rejects_tampered_timestamp() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let device_id = Uuid::new_v4();
        let mut notification = notification_signed_by(&key, "0a1b2c3d", &device_id, 1_700_000_000);
        notification.timestamp += 1;
        assert!(!notification.verify_push_signature("0a1b2c3d", &device_id));
    }

    #[test]
    fn test_push_signature_rejects_wrong_session() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let device_id = Uuid::new_v4();
        let notification = notification_signed_by(&key, "0a1b2c3d", &device_id, 1_700_000_000);
        assert!(!notification.verify_push_signature("ffffffff", &device_id));
    }

    #[test]
    fn test_push_signature_rejects_garbage_key() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let device_id = Uuid::new_v4();
        let mut notification = notification_signed_by(&key, "0a1b2c3d", &device_id, 1_700_000_000);
        notification.peer_persistent_key = "qq-not-base64".to_string();
        assert!(!notification.verify_push_signature("0a1b2c3d", &device_id));
    }

    #[test]
    fn test_expiry() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let device_id = Uuid::new_v4();
        let notification = notification_signed_by(&key, "0a1b2c3d", &device_id, 1_700_000_000);
        assert!(!notification.is_expired(Utc::now()));
        assert!(notification.is_expired(Utc::now() + Duration::minutes(10)));
    }
}
