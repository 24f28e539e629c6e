use crate::common::{PREFS_FILE, SETTINGS_FILE};
use notify::{EventKind, RecursiveMode, Watcher};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Settings,
    Prefs,
}

fn classify(path: &Path) -> Option<ConfigChange> {
    match path.file_name().and_then(OsStr::to_str) {
        Some(SETTINGS_FILE) => Some(ConfigChange::Settings),
        Some(PREFS_FILE) => Some(ConfigChange::Prefs),
        _ => None,
    }
}

/// Watches the config directory; atomic saves replace files, so the
/// directory is watched rather than the files themselves.
pub fn start_config_watcher(config_dir: PathBuf) -> mpsc::Receiver<ConfigChange> {
    let (watch_tx, watch_rx) = mpsc::channel::<ConfigChange>(10);

    std::thread::spawn(move || {
        let tx = watch_tx;

        let mut watcher = match notify::recommended_watcher(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                {
                    for change in event.paths.iter().filter_map(|p| classify(p)) {
                        debug!(target: "reclight::daemon", "Config change: {:?}", change);
                        let _ = tx.blocking_send(change);
                    }
                }
            },
        ) {
            Ok(w) => w,
            Err(e) => {
                error!(target: "reclight::daemon", "Failed to create config watcher: {}", e);
                return;
            }
        };

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            error!(target: "reclight::daemon", "Failed to create {}: {}", config_dir.display(), e);
            return;
        }
        if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
            error!(target: "reclight::daemon", "Failed to watch {}: {}", config_dir.display(), e);
            return;
        }

        info!(target: "reclight::daemon", "Config watcher started on {}", config_dir.display());
        loop {
            std::thread::sleep(std::time::Duration::from_secs(3600));
        }
    });

    watch_rx
}
