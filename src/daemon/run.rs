use crate::common::logging::{self, ReloadHandle};
use crate::common::{CONFIG_DIR, LogLevel};
use crate::core::access::{AccessProber, AccessState};
use crate::core::config::Settings;
use crate::core::led::LedController;
use crate::core::shell::{BrokerClient, ShellExecutor, SuShell};
use crate::daemon::control::Controller;
use crate::daemon::watcher::ConfigChange;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::{signal, time};
use tracing::{debug, error, info};

pub use crate::daemon::config::DaemonConfig;

pub struct Daemon {
    pub(crate) cfg: DaemonConfig,
    pub(crate) controller: Arc<Controller<ShellExecutor>>,
    pub(crate) prober: Arc<AccessProber>,
    pub(crate) poll_interval: Duration,
    pub(crate) current_log_level: Arc<RwLock<LogLevel>>,
    filter_handle: ReloadHandle,
}

impl Daemon {
    pub fn new(cfg: DaemonConfig, filter_handle: ReloadHandle) -> Self {
        let settings = &cfg.settings;
        let state = Arc::new(AccessState::default());
        let broker = Arc::new(BrokerClient::new(
            &settings.broker.socket,
            settings.bind_timeout(),
        ));
        let su = SuShell::new();

        let executor = Arc::new(ShellExecutor::new(broker.clone(), su.clone(), state.clone()));
        let prober = Arc::new(AccessProber::new(su, broker, state.clone()));
        let led = LedController::new(executor, &settings.led.path);
        let controller = Arc::new(Controller::new(
            led,
            state,
            cfg.prefs.clone(),
            cfg.prefs_path.clone(),
        ));

        debug!(target: "reclight::daemon", "LED at {}, broker at {}", settings.led.path, settings.broker.socket);

        Self {
            poll_interval: settings.poll_interval(),
            current_log_level: Arc::new(RwLock::new(settings.daemon.log_level)),
            cfg,
            controller,
            prober,
            filter_handle,
        }
    }

    fn set_log_level(&self, level: LogLevel) {
        if let Ok(mut l) = self.current_log_level.write() {
            *l = level;
        }
        logging::set_level(&self.filter_handle, level);
    }

    /// Re-checks access and, when usable, mirrors the LED state.
    pub async fn poll(&self) {
        let status = self.prober.check_status().await;
        if status.is_ready() {
            self.controller.sync_from_hardware().await;
        }
    }

    fn reload_settings(&mut self) {
        match Settings::load(&self.cfg.settings_path) {
            Ok(new_settings) => {
                let interval = new_settings.poll_interval();
                if interval != self.poll_interval {
                    debug!(target: "reclight::daemon", "Poll interval {:?} -> {:?}", self.poll_interval, interval);
                    self.poll_interval = interval;
                }

                let level = new_settings.daemon.log_level;
                if self.cfg.settings.daemon.log_level != level {
                    self.set_log_level(level);
                }
                self.cfg.settings = new_settings;
            }
            Err(e) => {
                error!(target: "reclight::daemon", "Failed to reload settings: {:?}", e);
            }
        }
    }

    fn reload_prefs(&self) {
        if let Err(e) = self.controller.reload_prefs() {
            error!(target: "reclight::daemon", "Failed to reload prefs: {:?}", e);
        }
    }

    pub fn init_ipc(&self) {
        let log_level = self.current_log_level.clone();
        let handle = self.filter_handle.clone();
        let set_log_level = Arc::new(move |lvl: LogLevel| {
            if let Ok(mut l) = log_level.write() {
                *l = lvl;
            }
            logging::set_level(&handle, lvl);
        });

        let handles = crate::daemon::ipc::IpcHandles {
            controller: self.controller.clone(),
            prober: self.prober.clone(),
            set_log_level,
            current_log_level: self.current_log_level.clone(),
        };

        let path = self.cfg.socket_path.clone();
        tokio::spawn(async move {
            debug!(target: "reclight::daemon", "Starting IPC socket listener...");
            match crate::daemon::ipc::start(&path, handles).await {
                Ok(_) => info!(target: "reclight::daemon", "IPC    | Listener stopped"),
                Err(e) => error!(target: "reclight::daemon", "IPC    | Error: {:?}", e),
            }
        });
    }
}

pub async fn run_with_config(cfg: DaemonConfig, filter_handle: ReloadHandle) -> Result<()> {
    let mut daemon = Daemon::new(cfg, filter_handle);

    daemon.init_ipc();
    time::sleep(Duration::from_millis(200)).await;
    debug!(target: "reclight::daemon", "IPC socket ready at {}", daemon.cfg.socket_path.display());

    let mut watch_rx = crate::daemon::watcher::start_config_watcher(PathBuf::from(CONFIG_DIR));

    daemon.poll().await;
    info!(
        target: "reclight::daemon",
        "Access: {} (polling every {:?})",
        daemon.prober.state().status().label(),
        daemon.poll_interval
    );

    loop {
        tokio::select! {
            _ = time::sleep(daemon.poll_interval) => {
                daemon.poll().await;
            }
            Some(change) = watch_rx.recv() => match change {
                ConfigChange::Settings => daemon.reload_settings(),
                ConfigChange::Prefs => daemon.reload_prefs(),
            },
            _ = signal::ctrl_c() => {
                info!(target: "reclight::daemon", "Daemon | Received Ctrl-C, shutting down");
                break;
            }
        }
    }

    daemon.controller.shutdown().await;
    info!(target: "reclight::daemon", "Daemon | Stopped");
    Ok(())
}
