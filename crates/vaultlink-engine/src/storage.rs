//! Vault storage collaborator interface
//!
//! Persistence of vault items lives outside this crate; the engine only
//! needs to apply approved mutations, fetch gated secrets, and look up
//! protection tiers.

use async_trait::async_trait;
use thiserror::Error;

use vaultlink_core::{Decision, ItemId, ProtectionTier, RemoteAction, SecretValue};

/// Errors surfaced by the storage collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The referenced item does not exist
    #[error("Item not found: {0}")]
    MissingItem(ItemId),

    /// The vault reached its plan's item limit
    #[error("Item limit reached: {0}")]
    LimitReached(u32),

    /// The vault is unreadable; fatal to the session
    #[error("Vault corrupted: {0}")]
    Corrupted(String),

    /// Underlying IO failure
    #[error("Storage IO error: {0}")]
    Io(String),
}

impl StorageError {
    /// Whether this failure should end the session instead of just the
    /// current action
    pub fn is_fatal(&self) -> bool {
        matches!(self, StorageError::Corrupted(_))
    }
}

/// The vault the engine mutates on approved actions
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Apply an approved mutation (`AddItem`/`UpdateItem`/`DeleteItem`/
    /// `FullSync`)
    async fn apply_mutation(
        &self,
        action: &RemoteAction,
        decision: &Decision,
    ) -> Result<(), StorageError>;

    /// Fetch an item's secret value after gating succeeded
    async fn fetch_secret(&self, item_id: ItemId) -> Result<SecretValue, StorageError>;

    /// Look up an item's protection tier; re-queried for every action
    async fn protection_tier(&self, item_id: ItemId) -> Result<ProtectionTier, StorageError>;

    /// Current number of stored items, for plan-limit checks
    async fn item_count(&self) -> u32;
}
