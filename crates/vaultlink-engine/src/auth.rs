//! Strong re-authentication collaborator
//!
//! Top-secret items require a successful re-authentication (biometric or
//! master passphrase, outside this crate) before their secrets may be
//! released. The result applies to the current operation instance only.

use async_trait::async_trait;

/// External re-authentication hook
#[async_trait]
pub trait StrongAuthProvider: Send + Sync {
    /// Perform a strong re-authentication for the current action.
    /// Returning `false` turns the action into a needs-auth rejection.
    async fn reauthenticate(&self) -> bool;
}

/// Default provider that never satisfies the gate
pub struct DenyStrongAuth;

#[async_trait]
impl StrongAuthProvider for DenyStrongAuth {
    async fn reauthenticate(&self) -> bool {
        false
    }
}
