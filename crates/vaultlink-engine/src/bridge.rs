//! Continuation bridge - the single-in-flight request state machine
//!
//! The bridge owns the one mutable shared resource of the subsystem: the
//! pending-decision slot. `submit` registers the live action and hands the
//! caller a future for its decision along with a token identifying that
//! submit; `resolve` delivers at most one decision per token; `cancel`
//! resolves negatively. The state machine makes "resolve twice", "resolve
//! a stale token", and "submit while awaiting" no-ops or immediate errors,
//! so the remote peer can never observe two replies to one request and a
//! late resolve can never decide a later action.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

use vaultlink_core::{Decision, RemoteAction};

/// Bridge misuse errors; these indicate programming bugs in the caller,
/// not runtime conditions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// A second action was submitted while one is awaiting a decision
    #[error("An action is already awaiting a decision")]
    Busy,

    /// The bridge reached its terminal state
    #[error("Bridge is closed")]
    Closed,
}

/// Identifies one specific submit. A resolve carries the token of the
/// action it decides; a token from an earlier submit can never decide a
/// later action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionToken(u64);

enum Slot {
    Idle,
    Awaiting {
        token: DecisionToken,
        action: RemoteAction,
        tx: oneshot::Sender<Decision>,
    },
    Closed,
}

struct Inner {
    slot: Slot,
    next_token: u64,
}

/// Future side of a submitted action; resolves to the single decision
#[derive(Debug)]
pub struct PendingDecision {
    token: DecisionToken,
    rx: oneshot::Receiver<Decision>,
}

impl PendingDecision {
    /// Token bound to this submit, for resolving it
    pub fn token(&self) -> DecisionToken {
        self.token
    }

    /// Wait for the decision.
    ///
    /// A dropped sender (bridge torn down without an explicit resolve)
    /// yields a negative decision rather than hanging the caller.
    pub async fn wait(self) -> Decision {
        self.rx.await.unwrap_or_else(|_| Decision::rejected())
    }
}

/// Cloneable handle to the pending-decision slot
#[derive(Clone)]
pub struct ContinuationBridge {
    inner: Arc<Mutex<Inner>>,
}

impl ContinuationBridge {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                slot: Slot::Idle,
                next_token: 0,
            })),
        }
    }

    /// Register `action` as the live request.
    ///
    /// Fails fast with `Busy` if a decision is already outstanding and
    /// with `Closed` after `close`; it never blocks. The returned
    /// `PendingDecision` carries the token that resolves this submit.
    pub fn submit(&self, action: RemoteAction) -> Result<PendingDecision, BridgeError> {
        let mut inner = self.inner.lock().expect("bridge lock poisoned");
        match inner.slot {
            Slot::Awaiting { .. } => Err(BridgeError::Busy),
            Slot::Closed => Err(BridgeError::Closed),
            Slot::Idle => {
                let token = DecisionToken(inner.next_token);
                inner.next_token += 1;
                let (tx, rx) = oneshot::channel();
                debug!(kind = action.kind(), "action awaiting decision");
                inner.slot = Slot::Awaiting { token, action, tx };
                Ok(PendingDecision { token, rx })
            }
        }
    }

    /// The action currently awaiting a decision and its token, if any
    pub fn pending(&self) -> Option<(DecisionToken, RemoteAction)> {
        let inner = self.inner.lock().expect("bridge lock poisoned");
        match &inner.slot {
            Slot::Awaiting { token, action, .. } => Some((*token, action.clone())),
            _ => None,
        }
    }

    /// Deliver the decision for the submit identified by `token`.
    ///
    /// Returns `true` if this call resolved it. At most one call per
    /// submit has any effect; later calls, calls with nothing pending,
    /// or calls carrying a token from an earlier submit return `false`
    /// and deliver nothing.
    pub fn resolve(&self, token: DecisionToken, decision: Decision) -> bool {
        let mut inner = self.inner.lock().expect("bridge lock poisoned");
        let live = matches!(&inner.slot, Slot::Awaiting { token: t, .. } if *t == token);
        if !live {
            return false;
        }
        if let Slot::Awaiting { tx, .. } = std::mem::replace(&mut inner.slot, Slot::Idle) {
            // The receiver may already be gone; either way the slot is
            // free again.
            let _ = tx.send(decision);
        }
        true
    }

    /// Resolve the live action negatively, whatever it is. Idempotent,
    /// callable from any task; used on UI dismissal, backgrounding, and
    /// engine teardown.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock().expect("bridge lock poisoned");
        if let Slot::Awaiting { .. } = inner.slot {
            if let Slot::Awaiting { tx, .. } = std::mem::replace(&mut inner.slot, Slot::Idle) {
                let _ = tx.send(Decision::rejected());
            }
            debug!("pending action cancelled");
        }
    }

    /// Enter the terminal state, resolving any live action negatively.
    /// Subsequent submits fail with `Closed`.
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("bridge lock poisoned");
        if let Slot::Awaiting { tx, .. } = std::mem::replace(&mut inner.slot, Slot::Closed) {
            let _ = tx.send(Decision::rejected());
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(
            self.inner.lock().expect("bridge lock poisoned").slot,
            Slot::Closed
        )
    }
}

impl Default for ContinuationBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vaultlink_core::ItemId;

    fn action() -> RemoteAction {
        RemoteAction::FullSync
    }

    #[tokio::test]
    async fn test_single_resolution() {
        let bridge = ContinuationBridge::new();
        let pending = bridge.submit(action()).unwrap();
        let token = pending.token();

        let first = Decision::approved(Some(ItemId::generate()));
        assert!(bridge.resolve(token, first));
        assert!(
            !bridge.resolve(token, Decision::rejected()),
            "second resolve must be a no-op"
        );

        assert_eq!(pending.wait().await, first);
    }

    #[tokio::test]
    async fn test_double_submit_fails_fast() {
        let bridge = ContinuationBridge::new();
        let pending = bridge.submit(action()).unwrap();

        assert_eq!(bridge.submit(action()).unwrap_err(), BridgeError::Busy);

        // The first request is still intact.
        assert!(bridge.pending().is_some());
        assert!(bridge.resolve(pending.token(), Decision::rejected()));
    }

    #[tokio::test]
    async fn test_stale_resolve_cannot_decide_later_action() {
        let bridge = ContinuationBridge::new();

        let first = bridge.submit(action()).unwrap();
        let stale = first.token();
        assert!(bridge.resolve(stale, Decision::rejected()));
        assert!(!first.wait().await.approved);

        // A duplicate resolve for the first action (e.g. a double-tapped
        // approval) must not decide the one submitted after it.
        let second = bridge
            .submit(RemoteAction::DeleteItem {
                item_id: ItemId::generate(),
            })
            .unwrap();
        assert!(!bridge.resolve(stale, Decision::approved(None)));
        assert!(bridge.pending().is_some(), "second action still undecided");

        assert!(bridge.resolve(second.token(), Decision::rejected()));
        assert!(!second.wait().await.approved);
    }

    #[tokio::test]
    async fn test_cancel_unblocks_waiter() {
        let bridge = ContinuationBridge::new();
        let pending = bridge.submit(action()).unwrap();

        let canceller = bridge.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let decision = tokio::time::timeout(Duration::from_secs(1), pending.wait())
            .await
            .expect("cancel must resolve the waiter in bounded time");
        assert!(!decision.approved);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let bridge = ContinuationBridge::new();
        let pending = bridge.submit(action()).unwrap();
        bridge.cancel();
        bridge.cancel();
        bridge.cancel();
        assert!(!pending.wait().await.approved);

        // Cancel with nothing pending is also fine.
        bridge.cancel();
        assert!(bridge.submit(action()).is_ok());
    }

    #[tokio::test]
    async fn test_close_is_terminal() {
        let bridge = ContinuationBridge::new();
        let pending = bridge.submit(action()).unwrap();
        let token = pending.token();
        bridge.close();

        assert!(!pending.wait().await.approved);
        assert_eq!(bridge.submit(action()).unwrap_err(), BridgeError::Closed);
        assert!(!bridge.resolve(token, Decision::approved(None)));
        assert!(bridge.is_closed());
    }

    #[tokio::test]
    async fn test_resume_after_resolution() {
        let bridge = ContinuationBridge::new();

        for _ in 0..3 {
            let pending = bridge.submit(action()).unwrap();
            assert!(bridge.resolve(pending.token(), Decision::approved(None)));
            assert!(pending.wait().await.approved);
        }
    }

    #[tokio::test]
    async fn test_pending_exposes_live_action() {
        let bridge = ContinuationBridge::new();
        assert!(bridge.pending().is_none());

        let id = ItemId::generate();
        let pending = bridge.submit(RemoteAction::DeleteItem { item_id: id }).unwrap();
        let (token, live) = bridge.pending().unwrap();
        assert_eq!(token, pending.token());
        assert_eq!(live, RemoteAction::DeleteItem { item_id: id });

        bridge.resolve(token, Decision::approved(None));
        assert!(bridge.pending().is_none());
    }
}
