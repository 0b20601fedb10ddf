use crate::core::sentinel::{PidFile, Sentinel};
use crate::core::settings::Settings;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct StatusOutput {
    running: bool,
    pid_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
    #[serde(
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    since: Option<DateTime<Utc>>,
}

pub fn run(settings: &Settings, json: bool) -> Result<()> {
    let pid_file = PidFile::new(&settings.sentinel.pid_file);
    let status = read_status(&pid_file);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_text_output(&status);
    }

    Ok(())
}

fn read_status(pid_file: &PidFile) -> StatusOutput {
    let running = pid_file.is_running();

    StatusOutput {
        running,
        pid_file: pid_file.path().to_path_buf(),
        pid: running.then(|| pid_file.pid()).flatten(),
        since: running.then(|| pid_file.modified_at()).flatten(),
    }
}

fn print_text_output(status: &StatusOutput) {
    if !status.running {
        println!("no update check running");
        return;
    }

    println!("update check running");
    if let Some(pid) = status.pid {
        println!("  pid:   {}", pid);
    }
    if let Some(since) = status.since {
        println!("  since: {}", since.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!("  file:  {}", status.pid_file.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_without_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = PidFile::new(dir.path().join("pamac.pid"));

        let status = read_status(&pid_file);
        assert!(!status.running);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["running"], false);
        assert!(json.get("pid").is_none());
        assert!(json.get("since").is_none());
    }

    #[test]
    fn test_status_with_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pamac.pid");
        std::fs::write(&path, "1234").unwrap();

        let status = read_status(&PidFile::new(&path));
        assert!(status.running);
        assert_eq!(status.pid, Some(1234));

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["running"], true);
        assert_eq!(json["pid"], 1234);
        assert!(json["since"].is_i64());
    }
}
