use crate::core::models::RefreshOutcome;
use anyhow::Result;
use notify_rust::{Notification, Urgency};

pub fn send_refresh_notification(outcome: &RefreshOutcome) -> Result<()> {
    let (summary, urgency) = match outcome {
        RefreshOutcome::Completed => ("Package databases refreshed", Urgency::Low),
        RefreshOutcome::Failed { .. } => ("Package database refresh failed", Urgency::Normal),
        RefreshOutcome::TimedOut => ("Package database refresh timed out", Urgency::Normal),
    };

    let body = match outcome {
        RefreshOutcome::Failed {
            reason: Some(reason),
        } => reason.clone(),
        _ => outcome.status_line().to_string(),
    };

    Notification::new()
        .summary(summary)
        .body(&body)
        .appname("pamac-refresh")
        .icon("system-software-update")
        .urgency(urgency)
        .timeout(notify_rust::Timeout::Milliseconds(5000))
        .show()?;

    tracing::info!(success = outcome.is_success(), "Sent refresh notification");

    Ok(())
}
