//! Core type aliases and newtypes

use k256::ecdsa::{signature::Verifier, Signature as K256Signature, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};

/// Compressed SEC1 public key of a remote peer (33 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerPublicKey(#[serde(with = "hex_bytes_33")] pub [u8; 33]);

impl PeerPublicKey {
    /// Create a new PeerPublicKey from compressed bytes
    pub fn new(bytes: [u8; 33]) -> Self {
        Self(bytes)
    }

    /// Get the compressed bytes
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 33];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| CoreError::Crypto(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// SHA256 fingerprint of the key, used as a stable peer identity hint
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.finalize().into()
    }

    /// Short display form of the fingerprint (first 4 bytes as hex)
    pub fn short(&self) -> String {
        hex::encode(&self.fingerprint()[..4])
    }

    /// Verify an ECDSA signature over `payload` with this key.
    ///
    /// The payload is hashed with SHA256 as part of verification.
    pub fn verify(&self, payload: &[u8], signature: &SessionSignature) -> Result<()> {
        let verifying_key = VerifyingKey::from_sec1_bytes(&self.0)
            .map_err(|e| CoreError::Crypto(format!("Invalid public key: {}", e)))?;

        let sig = K256Signature::from_slice(signature.as_bytes())
            .map_err(|e| CoreError::Crypto(format!("Invalid signature format: {}", e)))?;

        verifying_key
            .verify(payload, &sig)
            .map_err(|_| CoreError::SignatureVerificationFailed)
    }
}

impl AsRef<[u8]> for PeerPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Raw ECDSA signature (64 bytes: r || s)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSignature(pub [u8; 64]);

impl SessionSignature {
    pub fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| CoreError::Crypto(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for SessionSignature {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for SessionSignature {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for SessionSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Vault item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A released secret field value, wiped from memory on drop
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretValue(..)")
    }
}

/// Serde helper for 33-byte arrays as hex strings
pub mod hex_bytes_33 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 33], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 33], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 33];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(bytes)
    }
}
