use crate::core::event_loop::EventLoop;
use crate::core::models::{CheckReport, RefreshOutcome};
use crate::core::sentinel::Sentinel;
use crate::dbus::{ServiceError, TransactionService};
use anyhow::{Context, Result};
use std::future::Future;
use std::io::Write;
use std::time::Duration;

const STARTED_LINE: &str = "checking updates";

/// One update check: sentinel, subscribe, `Refresh`, wait, `StopDaemon`.
pub struct UpdateCheck<S> {
    sentinel: S,
    timeout: Option<Duration>,
}

impl<S: Sentinel> UpdateCheck<S> {
    pub fn new(sentinel: S, timeout: Option<Duration>) -> Self {
        Self { sentinel, timeout }
    }

    /// `connect` is only invoked when no other check is running, so the
    /// already-running path never touches the bus.
    pub async fn run<T, F, Fut, W>(&self, connect: F, out: &mut W) -> Result<CheckReport>
    where
        T: TransactionService,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
        W: Write,
    {
        if self.sentinel.is_running() {
            tracing::info!("Update check already in progress, nothing to do");
            return Ok(CheckReport::AlreadyRunning);
        }

        print_line(out, STARTED_LINE)?;

        let mut service = connect().await?;
        let event_loop = EventLoop::new();

        // Listen before asking, so a fast daemon cannot finish unobserved.
        service.subscribe(event_loop.handle()).await?;
        service.refresh().await?;

        tracing::info!(timeout = ?self.timeout, "Refresh requested, waiting for transaction signal");
        let outcome = event_loop.run(self.timeout).await;

        if outcome.daemon_responded() {
            if let Err(e) = service.stop_daemon().await {
                tracing::warn!(error = %e, "Failed to stop pamac daemon");
            }
        }

        match &outcome {
            RefreshOutcome::Completed => tracing::info!("Package databases refreshed"),
            RefreshOutcome::Failed { reason } => tracing::info!(
                reason = reason.as_deref().unwrap_or("unknown"),
                "Package database refresh failed"
            ),
            RefreshOutcome::TimedOut => {}
        }

        print_line(out, outcome.status_line())?;
        Ok(CheckReport::Finished(outcome))
    }
}

fn print_line<W: Write>(out: &mut W, line: &str) -> Result<()> {
    writeln!(out, "{}", line).context("Failed to write status line")?;
    out.flush().context("Failed to flush stdout")
}
