use crate::core::config::{self, Prefs, Settings};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub settings: Settings,
    pub prefs: Prefs,
    pub settings_path: PathBuf,
    pub prefs_path: PathBuf,
    pub socket_path: PathBuf,
}

impl DaemonConfig {
    pub fn new(settings: Settings, prefs: Prefs) -> Self {
        Self {
            settings,
            prefs,
            settings_path: config::settings_path(),
            prefs_path: config::prefs_path(),
            socket_path: PathBuf::from(crate::common::SOCKET_PATH),
        }
    }
}
