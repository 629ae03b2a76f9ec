//! Message types for actor communication.

use planner_core::JobId;
use ractor::RpcReplyPort;
use serde::{Deserialize, Serialize};

/// Messages for the dispatcher.
///
/// The dispatcher's mailbox is the dispatch queue: `Process` messages are
/// handled one at a time in the order they were sent.
#[derive(Debug)]
pub enum DispatchMessage {
    /// Drive a queued job through the worker.
    Process(JobId),

    /// Get dispatch counters. Answered between jobs.
    GetStats { reply: RpcReplyPort<DispatchStats> },

    /// Stop after every job queued before this message.
    Shutdown,
}

/// Counters kept by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchStats {
    /// Jobs that reached a terminal status.
    pub processed: u64,
    /// Jobs that reached `Done`.
    pub completed: u64,
    /// Jobs that reached `Failed`.
    pub failed: u64,
    /// Queue entries whose job was deleted before it was reached.
    pub skipped: u64,
}

/// Result type for actor operations.
pub type ActorResult<T> = Result<T, ActorError>;

/// Error type for actor operations.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("Failed to spawn dispatcher: {0}")]
    Spawn(#[from] ractor::SpawnErr),

    #[error("Dispatcher is not running: {0}")]
    Messaging(String),

    #[error("Dispatcher did not answer in time")]
    Timeout,
}
