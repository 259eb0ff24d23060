//! Vaultlink Engine - Connect session orchestration
//!
//! This crate drives a verified pairing session: it reads one remote
//! action at a time from the channel, suspends it on the continuation
//! bridge until the consumer decides, and sends exactly one reply per
//! action back to the peer.

pub mod auth;
pub mod bridge;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod storage;

pub use auth::{DenyStrongAuth, StrongAuthProvider};
pub use bridge::{BridgeError, ContinuationBridge, DecisionToken, PendingDecision};
pub use channel::{ActionChannel, ChannelEvent, ChannelFrame, JsonLineChannel};
pub use config::EngineConfig;
pub use engine::{ConnectEngine, Decider, EngineHandle};
pub use error::{EngineError, Result};
pub use storage::{StorageError, VaultStore};
