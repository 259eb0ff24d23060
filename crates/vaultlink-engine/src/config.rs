//! Engine configuration

use serde::{Deserialize, Serialize};

/// Connect engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Plan entitlement: maximum number of stored items, if limited.
    /// `AddItem` actions at or above the limit are rejected with a typed
    /// reply so the extension can surface the paywall.
    pub item_limit: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { item_limit: None }
    }
}
