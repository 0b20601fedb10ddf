mod client;

use crate::core::event_loop::LoopHandle;
use async_trait::async_trait;

pub use client::PamacClient;

pub const SIGNAL_DONE: &str = "EmitTransactionDone";
pub const SIGNAL_ERROR: &str = "EmitTransactionError";
pub const METHOD_REFRESH: &str = "Refresh";
pub const METHOD_STOP_DAEMON: &str = "StopDaemon";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to connect to the system bus")]
    Connect(#[source] zbus::Error),

    #[error("failed to subscribe to {member}")]
    Subscribe {
        member: &'static str,
        #[source]
        source: zbus::Error,
    },

    #[error("{method} call failed")]
    Call {
        method: &'static str,
        #[source]
        source: zbus::Error,
    },
}

/// Remote side of a pamac transaction.
#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Starts forwarding the daemon's terminal signals into `handle`.
    async fn subscribe(&mut self, handle: LoopHandle) -> Result<(), ServiceError>;
    async fn refresh(&self) -> Result<(), ServiceError>;
    async fn stop_daemon(&self) -> Result<(), ServiceError>;
}
