//! Protection-tier release policy
//!
//! Every vault item carries a protection tier. The gate maps
//! (tier, access kind) to the requirement that must be met before a
//! remote action touching the item may proceed. Gate decisions are
//! single-use: re-evaluate for every new action, never cache.

use serde::{Deserialize, Serialize};

/// Per-item sensitivity classification, ordered from least to most strict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionTier {
    Normal,
    Confirm,
    TopSecret,
}

impl ProtectionTier {
    /// Wire/storage level values, matching the extension protocol
    pub fn level(&self) -> u8 {
        match self {
            ProtectionTier::Normal => 0,
            ProtectionTier::Confirm => 1,
            ProtectionTier::TopSecret => 2,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(ProtectionTier::Normal),
            1 => Some(ProtectionTier::Confirm),
            2 => Some(ProtectionTier::TopSecret),
            _ => None,
        }
    }
}

/// What an operation wants from an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretAccess {
    /// The secret value itself, or a mutation touching it
    Secret,
    /// Metadata only (name, uris, tier)
    Metadata,
}

/// Requirement the gate imposes on the current operation instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// May be released without an additional unlock step
    Release,
    /// Requires a transient user confirmation
    RequireConfirm,
    /// Requires a successful strong re-authentication first
    RequireStrongAuth,
}

/// Map a protection tier and access kind to a release requirement
pub fn gate(tier: ProtectionTier, access: SecretAccess) -> GateDecision {
    match (tier, access) {
        (ProtectionTier::Normal, _) => GateDecision::Release,
        (ProtectionTier::Confirm, SecretAccess::Secret) => GateDecision::RequireConfirm,
        (ProtectionTier::Confirm, SecretAccess::Metadata) => GateDecision::Release,
        (ProtectionTier::TopSecret, SecretAccess::Secret) => GateDecision::RequireStrongAuth,
        (ProtectionTier::TopSecret, SecretAccess::Metadata) => GateDecision::RequireConfirm,
    }
}
