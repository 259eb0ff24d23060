//! Remote action model
//!
//! The closed set of operations a paired browser extension may request,
//! the local decision that resolves each one, and the single reply sent
//! back on the channel. Payloads are immutable value types so an action
//! can be captured across the suspension point in the bridge.

use serde::{Deserialize, Serialize};

use crate::protection::{ProtectionTier, SecretAccess};
use crate::types::{ItemId, SecretValue};

/// Requested change to a vault item, carried by add/update actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemChangeRequest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// New secret value, if the request carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretValue>,

    #[serde(default)]
    pub uris: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Requested tier change; `None` leaves the item's tier alone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_tier: Option<ProtectionTier>,
}

/// A single remote-requested operation awaiting local approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteAction {
    /// Store a new item built from the change request
    AddItem { change: ItemChangeRequest },

    /// Apply the change request to an existing item
    UpdateItem {
        item_id: ItemId,
        change: ItemChangeRequest,
    },

    /// Move an existing item to trash
    DeleteItem { item_id: ItemId },

    /// Release the secret value of an existing item
    SecretRequest { item_id: ItemId },

    /// Push the full vault state to the extension
    FullSync,
}

impl RemoteAction {
    /// Whether this action needs the item's secret value or only metadata
    pub fn access(&self) -> SecretAccess {
        match self {
            RemoteAction::SecretRequest { .. } => SecretAccess::Secret,
            RemoteAction::UpdateItem { change, .. } if change.password.is_some() => {
                SecretAccess::Secret
            }
            _ => SecretAccess::Metadata,
        }
    }

    /// The existing item this action refers to, if any
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            RemoteAction::UpdateItem { item_id, .. }
            | RemoteAction::DeleteItem { item_id }
            | RemoteAction::SecretRequest { item_id } => Some(*item_id),
            RemoteAction::AddItem { .. } | RemoteAction::FullSync => None,
        }
    }

    /// Stable name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteAction::AddItem { .. } => "add_item",
            RemoteAction::UpdateItem { .. } => "update_item",
            RemoteAction::DeleteItem { .. } => "delete_item",
            RemoteAction::SecretRequest { .. } => "secret_request",
            RemoteAction::FullSync => "full_sync",
        }
    }
}

/// Local resolution of a pending action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub approved: bool,

    /// The stored item the mutation produced; only populated for approved
    /// add/update actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_item_id: Option<ItemId>,
}

impl Decision {
    pub fn approved(result_item_id: Option<ItemId>) -> Self {
        Self {
            approved: true,
            result_item_id,
        }
    }

    pub fn rejected() -> Self {
        Self {
            approved: false,
            result_item_id: None,
        }
    }
}

/// Why an action was not carried out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The user (or policy) declined the request
    Declined,
    /// Strong re-authentication is required and was not satisfied
    NeedsAuth,
    /// The referenced item does not exist
    MissingItem,
    /// The vault reached its plan's item limit
    LimitReached { limit: u32 },
    /// The mutation failed in storage
    Storage { message: String },
    /// The peer's software is too old for this action
    UpdateRequired,
}

/// The single reply sent to the peer for each received action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionReply {
    /// Action approved and applied
    Accepted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_id: Option<ItemId>,
    },

    /// Secret released after gating succeeded
    Secret { value: SecretValue },

    /// Action terminated with a typed rejection
    Rejected {
        #[serde(flatten)]
        reason: RejectReason,
    },
}
