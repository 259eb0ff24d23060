//! Connect engine - verified-session orchestration
//!
//! One engine instance drives one pairing session: verify first, then a
//! strictly sequential receive loop. Every received action produces
//! exactly one reply, in receipt order, with the decision suspended on
//! the continuation bridge for as long as the consumer needs.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use vaultlink_core::{
    gate, verify_session, ActionReply, Decision, GateDecision, PairingSession, RejectReason,
    RemoteAction,
};

use crate::auth::StrongAuthProvider;
use crate::bridge::{ContinuationBridge, DecisionToken};
use crate::channel::{ActionChannel, ChannelEvent};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::storage::{StorageError, VaultStore};

/// Consumer side of the action flow; UI approval in production, a
/// scripted function in tests. Invoked once per dispatched action and
/// expected to produce exactly one decision.
#[async_trait]
pub trait Decider: Send + Sync {
    async fn decide(&self, action: RemoteAction) -> Decision;
}

#[async_trait]
impl<F> Decider for F
where
    F: Fn(RemoteAction) -> Decision + Send + Sync,
{
    async fn decide(&self, action: RemoteAction) -> Decision {
        self(action)
    }
}

/// Cross-task control surface for a running engine
#[derive(Clone)]
pub struct EngineHandle {
    cancel: Arc<watch::Sender<bool>>,
    progress: watch::Receiver<f32>,
    bridge: ContinuationBridge,
}

impl EngineHandle {
    /// Cancel the engine: resolves any pending decision negatively, then
    /// stops the receive loop. Safe to call repeatedly and from any task.
    pub fn cancel(&self) {
        self.bridge.cancel();
        let _ = self.cancel.send(true);
    }

    /// Watch transport progress values in `[0.0, 1.0]`
    pub fn progress(&self) -> watch::Receiver<f32> {
        self.progress.clone()
    }

    /// The action currently awaiting a decision and its token, if any
    pub fn pending(&self) -> Option<(DecisionToken, RemoteAction)> {
        self.bridge.pending()
    }

    /// The action currently awaiting a decision, if any
    pub fn pending_action(&self) -> Option<RemoteAction> {
        self.bridge.pending().map(|(_, action)| action)
    }

    /// Resolve the action identified by `token`; at most one call per
    /// action has effect, and a token from an earlier action is ignored
    pub fn resolve(&self, token: DecisionToken, decision: Decision) -> bool {
        self.bridge.resolve(token, decision)
    }
}

/// Orchestrates one connect session over a verified pairing code
pub struct ConnectEngine {
    store: Arc<dyn VaultStore>,
    auth: Arc<dyn StrongAuthProvider>,
    config: EngineConfig,
    bridge: ContinuationBridge,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
    progress_tx: watch::Sender<f32>,
    progress_rx: watch::Receiver<f32>,
}

impl ConnectEngine {
    pub fn new(
        store: Arc<dyn VaultStore>,
        auth: Arc<dyn StrongAuthProvider>,
        config: EngineConfig,
    ) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (progress_tx, progress_rx) = watch::channel(0.0);
        Self {
            store,
            auth,
            config,
            bridge: ContinuationBridge::new(),
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
            progress_tx,
            progress_rx,
        }
    }

    /// Control handle for the owning task (UI lifecycle, tests)
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            cancel: Arc::clone(&self.cancel_tx),
            progress: self.progress_rx.clone(),
            bridge: self.bridge.clone(),
        }
    }

    /// Run the session to completion.
    ///
    /// Verification happens before any channel I/O; a session that fails
    /// it never opens a channel and must be re-paired from a fresh code.
    /// The bridge is closed on every exit path, so a handle waiting on a
    /// decision never hangs.
    pub async fn run<C>(
        &self,
        session: &PairingSession,
        mut channel: C,
        decider: Arc<dyn Decider>,
    ) -> Result<()>
    where
        C: ActionChannel,
    {
        if !verify_session(session) {
            warn!(session_id = %session.session_id, "pairing session failed verification");
            return Err(EngineError::InvalidSession);
        }

        info!(
            session_id = %session.session_id,
            version = session.version.as_u32(),
            "pairing session verified, entering receive loop"
        );

        let result = self.receive_loop(&mut channel, &decider).await;
        self.bridge.close();
        result
    }

    async fn receive_loop<C>(&self, channel: &mut C, decider: &Arc<dyn Decider>) -> Result<()>
    where
        C: ActionChannel,
    {
        let mut cancel_rx = self.cancel_rx.clone();
        // Stays true while an EngineHandle can still signal us.
        let mut cancel_alive = true;

        loop {
            if *cancel_rx.borrow() {
                return Err(EngineError::Cancelled);
            }

            let event = tokio::select! {
                changed = cancel_rx.changed(), if cancel_alive => {
                    match changed {
                        Ok(()) if *cancel_rx.borrow() => {
                            self.bridge.cancel();
                            return Err(EngineError::Cancelled);
                        }
                        Ok(()) => continue,
                        Err(_) => {
                            cancel_alive = false;
                            continue;
                        }
                    }
                }
                event = channel.next() => event?,
            };

            match event {
                ChannelEvent::Closed => {
                    info!("channel closed, session complete");
                    return Ok(());
                }
                ChannelEvent::Progress(value) => {
                    let _ = self.progress_tx.send(value);
                }
                ChannelEvent::Action(action) => {
                    debug!(kind = action.kind(), "received action");
                    let reply = match self.process_action(action, decider).await {
                        Ok(reply) => reply,
                        Err(EngineError::Storage(e)) if e.is_fatal() => {
                            // Tell the peer before giving up on the vault.
                            let reply = ActionReply::Rejected {
                                reason: RejectReason::Storage {
                                    message: e.to_string(),
                                },
                            };
                            channel.reply(&reply).await?;
                            return Err(EngineError::Storage(e));
                        }
                        Err(other) => return Err(other),
                    };
                    channel.reply(&reply).await?;
                }
            }
        }
    }

    /// Gate, dispatch, and apply a single action. Per-action failures are
    /// returned as typed rejection replies; only session-fatal conditions
    /// come back as errors.
    async fn process_action(
        &self,
        action: RemoteAction,
        decider: &Arc<dyn Decider>,
    ) -> Result<ActionReply> {
        if let RemoteAction::AddItem { .. } = &action {
            if let Some(limit) = self.config.item_limit {
                if self.store.item_count().await >= limit {
                    info!(limit, "add rejected, item limit reached");
                    return Ok(rejected(RejectReason::LimitReached { limit }));
                }
            }
        }

        if let Some(item_id) = action.item_id() {
            let tier = match self.store.protection_tier(item_id).await {
                Ok(tier) => tier,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(StorageError::MissingItem(_)) => {
                    return Ok(rejected(RejectReason::MissingItem))
                }
                Err(e) => {
                    return Ok(rejected(RejectReason::Storage {
                        message: e.to_string(),
                    }))
                }
            };

            // Gate decisions are single-use; evaluated fresh per action.
            if gate(tier, action.access()) == GateDecision::RequireStrongAuth
                && !self.auth.reauthenticate().await
            {
                info!(kind = action.kind(), "strong auth not satisfied");
                return Ok(rejected(RejectReason::NeedsAuth));
            }
        }

        let decision = self.dispatch(action.clone(), decider).await?;

        if !decision.approved {
            debug!(kind = action.kind(), "action declined");
            return Ok(rejected(RejectReason::Declined));
        }

        match &action {
            RemoteAction::SecretRequest { item_id } => {
                match self.store.fetch_secret(*item_id).await {
                    Ok(value) => Ok(ActionReply::Secret { value }),
                    Err(e) if e.is_fatal() => Err(e.into()),
                    Err(StorageError::MissingItem(_)) => Ok(rejected(RejectReason::MissingItem)),
                    Err(e) => Ok(rejected(RejectReason::Storage {
                        message: e.to_string(),
                    })),
                }
            }
            _ => match self.store.apply_mutation(&action, &decision).await {
                Ok(()) => Ok(ActionReply::Accepted {
                    item_id: decision.result_item_id,
                }),
                Err(e) if e.is_fatal() => Err(e.into()),
                Err(StorageError::MissingItem(_)) => Ok(rejected(RejectReason::MissingItem)),
                Err(StorageError::LimitReached(limit)) => {
                    Ok(rejected(RejectReason::LimitReached { limit }))
                }
                Err(e) => Ok(rejected(RejectReason::Storage {
                    message: e.to_string(),
                })),
            },
        }
    }

    /// Suspend the action on the bridge and let the decider resolve it.
    /// The pending-decision future is the single source of truth; a
    /// cancel from another task wins over a late decider, whose resolve
    /// then carries a stale token and is ignored.
    async fn dispatch(
        &self,
        action: RemoteAction,
        decider: &Arc<dyn Decider>,
    ) -> Result<Decision> {
        let pending = self.bridge.submit(action.clone())?;
        let token = pending.token();

        let decider = Arc::clone(decider);
        let bridge = self.bridge.clone();
        let decide_task = tokio::spawn(async move {
            let decision = decider.decide(action).await;
            bridge.resolve(token, decision);
        });

        let decision = pending.wait().await;
        decide_task.abort();
        Ok(decision)
    }
}

fn rejected(reason: RejectReason) -> ActionReply {
    ActionReply::Rejected { reason }
}
