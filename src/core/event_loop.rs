use crate::core::models::{RefreshOutcome, TransactionSignal};
use std::time::Duration;
use tokio::sync::mpsc;

const CLOSED_REASON: &str = "signal stream closed";

/// Single-consumer loop that waits for the first terminal event of a transaction.
///
/// The channel holds one event, so only the first delivery is kept. Once
/// [`EventLoop::run`] returns the receiver is gone and further deliveries
/// are rejected.
pub struct EventLoop {
    tx: mpsc::Sender<TransactionSignal>,
    rx: mpsc::Receiver<TransactionSignal>,
}

#[derive(Clone, Debug)]
pub struct LoopHandle {
    tx: mpsc::Sender<TransactionSignal>,
}

impl EventLoop {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self { tx, rx }
    }

    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            tx: self.tx.clone(),
        }
    }

    pub async fn run(self, timeout: Option<Duration>) -> RefreshOutcome {
        let EventLoop { tx, mut rx } = self;
        // Only outside handles may keep the loop alive.
        drop(tx);

        let wait = async {
            match rx.recv().await {
                Some(signal) => {
                    tracing::debug!(signal = signal.member(), "Event loop received signal");
                    RefreshOutcome::from(signal)
                }
                None => RefreshOutcome::Failed {
                    reason: Some(CLOSED_REASON.to_string()),
                },
            }
        };

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::info!(?limit, "No transaction signal before timeout");
                    RefreshOutcome::TimedOut
                }
            },
            None => wait.await,
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopHandle {
    /// Hands a signal to the loop. Returns `false` if the loop already has
    /// its terminal event or has finished running.
    pub fn deliver(&self, signal: TransactionSignal) -> bool {
        match self.tx.try_send(signal) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping transaction signal");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_signal_wins() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();

        assert!(handle.deliver(TransactionSignal::Done));
        assert!(!handle.deliver(TransactionSignal::Error { reason: None }));

        let outcome = event_loop.run(None).await;
        assert_eq!(outcome, RefreshOutcome::Completed);
    }

    #[tokio::test]
    async fn test_error_signal_fails() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();

        handle.deliver(TransactionSignal::Error {
            reason: Some("failed to synchronize core".to_string()),
        });

        let outcome = event_loop.run(None).await;
        assert_eq!(
            outcome,
            RefreshOutcome::Failed {
                reason: Some("failed to synchronize core".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_delivery_after_run_is_rejected() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();

        handle.deliver(TransactionSignal::Done);
        event_loop.run(None).await;

        assert!(!handle.deliver(TransactionSignal::Done));
    }

    #[tokio::test]
    async fn test_signal_from_task() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.deliver(TransactionSignal::Done);
        });

        let outcome = event_loop.run(Some(Duration::from_secs(5))).await;
        assert_eq!(outcome, RefreshOutcome::Completed);
    }

    #[tokio::test]
    async fn test_timeout() {
        let event_loop = EventLoop::new();
        let _handle = event_loop.handle();

        let outcome = event_loop.run(Some(Duration::from_millis(20))).await;
        assert_eq!(outcome, RefreshOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_all_handles_dropped() {
        let event_loop = EventLoop::new();
        drop(event_loop.handle());

        let outcome = event_loop.run(None).await;
        assert_eq!(
            outcome,
            RefreshOutcome::Failed {
                reason: Some(CLOSED_REASON.to_string())
            }
        );
    }
}
