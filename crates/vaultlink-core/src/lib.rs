//! Vaultlink Core - Shared types, pairing codec, and protection policy
//!
//! This crate provides the foundational types for the Vaultlink browser
//! connect subsystem: the pairing-code codec and verifier, the remote
//! action model, and the protection-tier release policy.

pub mod action;
pub mod error;
pub mod notification;
pub mod peer;
pub mod protection;
pub mod session;
pub mod types;
pub mod verify;

pub use action::{ActionReply, Decision, ItemChangeRequest, RejectReason, RemoteAction};
pub use error::{CoreError, Result};
pub use notification::PendingServerNotification;
pub use peer::KnownPeer;
pub use protection::{gate, GateDecision, ProtectionTier, SecretAccess};
pub use session::{PairingSession, SchemaVersion};
pub use types::{ItemId, PeerPublicKey, SecretValue, SessionSignature};
pub use verify::verify_session;

/// Number of colon-delimited fields in a pairing code
pub const PAIRING_CODE_FIELDS: usize = 5;

/// Compressed SEC1 public key length in bytes
pub const PUBLIC_KEY_LEN: usize = 33;

/// Raw ECDSA signature length in bytes (r || s)
pub const SIGNATURE_LEN: usize = 64;
