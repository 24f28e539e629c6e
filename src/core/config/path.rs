use crate::common::{CONFIG_DIR, PREFS_FILE, SETTINGS_FILE};
use std::path::PathBuf;

pub use super::prefs::*;
pub use super::settings::*;

pub fn settings_path() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join(SETTINGS_FILE)
}

pub fn prefs_path() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join(PREFS_FILE)
}

pub fn load_all() -> anyhow::Result<(Settings, Prefs)> {
    let settings = Settings::load(settings_path())?;
    let prefs = Prefs::load(prefs_path())?;
    Ok((settings, prefs))
}
