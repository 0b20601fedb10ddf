use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PID_FILE: &str = "/tmp/pamac.pid";
pub const PAMAC_SERVICE: &str = "org.manjaro.pamac";
pub const PAMAC_PATH: &str = "/org/manjaro/pamac";
pub const PAMAC_INTERFACE: &str = "org.manjaro.pamac";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sentinel: SentinelSettings,
    pub bus: BusSettings,
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelSettings {
    pub pid_file: PathBuf,
}

impl Default for SentinelSettings {
    fn default() -> Self {
        Self {
            pid_file: PathBuf::from(DEFAULT_PID_FILE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    pub service: String,
    pub path: String,
    pub interface: String,
    /// Seconds to wait for a transaction signal. Zero waits indefinitely.
    pub timeout_secs: u64,
    /// Passed as the only argument of `Refresh` when set. Older daemons take none.
    pub force_refresh: Option<bool>,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            service: PAMAC_SERVICE.to_string(),
            path: PAMAC_PATH.to_string(),
            interface: PAMAC_INTERFACE.to_string(),
            timeout_secs: 0,
            force_refresh: None,
        }
    }
}

impl BusSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub journald: bool,
    pub json: bool,
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pamac-refresh").join("config.toml"))
    }

    /// Loads settings from `path`, or from the default location when `None`.
    /// A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::debug!(?path, "Loaded config");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bus.service.trim().is_empty() {
            anyhow::bail!("bus.service must not be empty");
        }
        if self.bus.interface.trim().is_empty() {
            anyhow::bail!("bus.interface must not be empty");
        }
        zbus::zvariant::ObjectPath::try_from(self.bus.path.as_str())
            .map_err(|e| anyhow::anyhow!("bus.path is not a valid object path: {}", e))?;
        if !self.sentinel.pid_file.is_absolute() {
            anyhow::bail!(
                "sentinel.pid_file must be an absolute path, got {}",
                self.sentinel.pid_file.display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.sentinel.pid_file, PathBuf::from("/tmp/pamac.pid"));
        assert_eq!(settings.bus.service, "org.manjaro.pamac");
        assert_eq!(settings.bus.path, "/org/manjaro/pamac");
        assert_eq!(settings.bus.interface, "org.manjaro.pamac");
        assert!(settings.bus.timeout().is_none());
        assert!(settings.bus.force_refresh.is_none());
        assert!(!settings.notifications.enabled);
        assert!(!settings.logging.journald);
        assert!(!settings.logging.json);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        settings.bus.path = "org/manjaro/pamac".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.bus.service = "  ".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.bus.interface = String::new();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.sentinel.pid_file = PathBuf::from("pamac.pid");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [sentinel]
            pid_file = "/run/pamac/pamac.pid"

            [bus]
            timeout_secs = 300
            force_refresh = false

            [notifications]
            enabled = true

            [logging]
            journald = true
        "#;

        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(
            settings.sentinel.pid_file,
            PathBuf::from("/run/pamac/pamac.pid")
        );
        assert_eq!(settings.bus.service, "org.manjaro.pamac");
        assert_eq!(settings.bus.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(settings.bus.force_refresh, Some(false));
        assert!(settings.notifications.enabled);
        assert!(settings.logging.journald);
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("config.toml"))).unwrap();
        assert_eq!(settings.bus.service, PAMAC_SERVICE);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[bus]\npath = \"not a path\"\n").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }
}
