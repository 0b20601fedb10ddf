use crate::core::models::CheckReport;
use crate::core::notifications::send_refresh_notification;
use crate::core::sentinel::PidFile;
use crate::core::settings::Settings;
use crate::core::trigger::UpdateCheck;
use crate::dbus::PamacClient;
use anyhow::Result;
use std::time::Duration;

pub async fn run(settings: Settings, timeout_secs: Option<u64>) -> Result<()> {
    let timeout = match timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => settings.bus.timeout(),
    };

    let sentinel = PidFile::new(&settings.sentinel.pid_file);
    let check = UpdateCheck::new(sentinel, timeout);
    let bus = settings.bus.clone();

    let report = check
        .run(|| PamacClient::connect(bus), &mut std::io::stdout())
        .await?;

    if let CheckReport::Finished(outcome) = &report {
        if settings.notifications.enabled {
            if let Err(e) = send_refresh_notification(outcome) {
                tracing::warn!(error = %e, "Failed to send refresh notification");
            }
        }
    }

    Ok(())
}
