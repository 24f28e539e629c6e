use crate::common::{BROKER_SOCKET_PATH, LED_BRIGHTNESS_PATH, LogLevel};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub daemon: DaemonSettings,
    #[serde(default)]
    pub led: LedSettings,
    #[serde(default)]
    pub broker: BrokerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonSettings {
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedSettings {
    #[serde(default = "default_led_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerSettings {
    #[serde(default = "default_broker_socket")]
    pub socket: String,

    #[serde(default = "default_bind_timeout")]
    pub bind_timeout_ms: u64,

    /// Uids the broker executes commands for.
    #[serde(default = "default_allowed_uids")]
    pub allowed_uids: Vec<u32>,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for LedSettings {
    fn default() -> Self {
        Self {
            path: default_led_path(),
        }
    }
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            socket: default_broker_socket(),
            bind_timeout_ms: default_bind_timeout(),
            allowed_uids: default_allowed_uids(),
        }
    }
}

impl Settings {
    /// Loads settings from TOML; a missing file yields defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(target: "reclight::config", "{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse settings.toml")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.daemon.poll_interval_ms.max(100))
    }

    pub fn bind_timeout(&self) -> Duration {
        Duration::from_millis(self.broker.bind_timeout_ms)
    }
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_led_path() -> String {
    LED_BRIGHTNESS_PATH.to_string()
}

fn default_broker_socket() -> String {
    BROKER_SOCKET_PATH.to_string()
}

fn default_bind_timeout() -> u64 {
    3000
}

fn default_allowed_uids() -> Vec<u32> {
    vec![0, 2000]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [daemon]
            log_level = "debug"

            [broker]
            allowed_uids = [10234]
            "#,
        )
        .unwrap();

        assert_eq!(settings.daemon.log_level, LogLevel::Debug);
        assert_eq!(settings.daemon.poll_interval_ms, 2000);
        assert_eq!(settings.led.path, LED_BRIGHTNESS_PATH);
        assert_eq!(settings.broker.socket, BROKER_SOCKET_PATH);
        assert_eq!(settings.broker.bind_timeout_ms, 3000);
        assert_eq!(settings.broker.allowed_uids, vec![10234]);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings.poll_interval(), Duration::from_millis(2000));
        assert_eq!(settings.bind_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[daemon\npoll_interval_ms = ").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
