/// Terminal signal emitted by the pamac daemon at the end of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionSignal {
    Done,
    Error { reason: Option<String> },
}

impl TransactionSignal {
    pub fn member(&self) -> &'static str {
        match self {
            TransactionSignal::Done => "EmitTransactionDone",
            TransactionSignal::Error { .. } => "EmitTransactionError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed,
    Failed { reason: Option<String> },
    TimedOut,
}

impl RefreshOutcome {
    /// Line printed on stdout once the wait is over.
    pub fn status_line(&self) -> &'static str {
        match self {
            RefreshOutcome::Completed => "check updates done",
            RefreshOutcome::Failed { .. } => "check updates failed",
            RefreshOutcome::TimedOut => "check updates timed out",
        }
    }

    /// Whether the daemon reported back, in which case it must be asked to stop.
    pub fn daemon_responded(&self) -> bool {
        !matches!(self, RefreshOutcome::TimedOut)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Completed)
    }
}

impl From<TransactionSignal> for RefreshOutcome {
    fn from(signal: TransactionSignal) -> Self {
        match signal {
            TransactionSignal::Done => RefreshOutcome::Completed,
            TransactionSignal::Error { reason } => RefreshOutcome::Failed { reason },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckReport {
    AlreadyRunning,
    Finished(RefreshOutcome),
}
