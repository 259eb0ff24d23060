//! Known-peer record
//!
//! One entry per paired browser extension, keyed by its persistent public
//! key. The record carries the session id the peer will use for its next
//! wake, so an incoming push can be matched and validated. Persistence is
//! the app layer's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A previously paired browser extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownPeer {
    pub id: Uuid,

    /// Persistent public key, hex of compressed SEC1 bytes
    pub public_key_hex: String,

    pub name: String,
    pub version: String,
    pub extension_name: String,

    pub first_connected_at: DateTime<Utc>,
    pub last_connected_at: DateTime<Utc>,

    /// Session id the peer will present on its next connect, hex encoded
    pub next_session_id_hex: Option<String>,
}

impl KnownPeer {
    pub fn new(public_key_hex: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            public_key_hex: public_key_hex.into(),
            name: String::new(),
            version: String::new(),
            extension_name: String::new(),
            first_connected_at: now,
            last_connected_at: now,
            next_session_id_hex: None,
        }
    }

    /// Record a successful connect and rotate the next session id
    pub fn touch(&mut self, now: DateTime<Utc>, next_session_id_hex: impl Into<String>) {
        self.last_connected_at = now;
        self.next_session_id_hex = Some(next_session_id_hex.into());
    }
}
