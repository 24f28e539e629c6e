use crate::common::LightMode;
use crate::core::access::AccessState;
use crate::core::config::Prefs;
use crate::core::led::{LedController, clamp_brightness};
use crate::core::shell::ShellBackend;
use anyhow::{Result, anyhow, bail};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// What the main button, the tile and the widget all drive.
pub struct Controller<B> {
    led: LedController<B>,
    access: Arc<AccessState>,
    prefs: RwLock<Prefs>,
    prefs_path: PathBuf,
    /// Static brightness read back from the LED; shown and applied, never saved.
    synced_static: RwLock<Option<u8>>,
    light_on: AtomicBool,
}

impl<B: ShellBackend> Controller<B> {
    pub fn new(
        led: LedController<B>,
        access: Arc<AccessState>,
        prefs: Prefs,
        prefs_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            led,
            access,
            prefs: RwLock::new(prefs),
            prefs_path: prefs_path.into(),
            synced_static: RwLock::new(None),
            light_on: AtomicBool::new(false),
        }
    }

    pub fn led(&self) -> &LedController<B> {
        &self.led
    }

    pub fn access(&self) -> &Arc<AccessState> {
        &self.access
    }

    /// Stored prefs with the hardware-synced static brightness laid over them.
    pub fn prefs(&self) -> Prefs {
        let mut prefs = self.prefs.read().map(|p| p.clone()).unwrap_or_default();
        if let Some(value) = self.synced_static() {
            prefs.static_brightness = value as f32;
        }
        prefs
    }

    fn synced_static(&self) -> Option<u8> {
        self.synced_static.read().ok().and_then(|v| *v)
    }

    fn set_synced_static(&self, value: Option<u8>) {
        if let Ok(mut v) = self.synced_static.write() {
            *v = value;
        }
    }

    pub fn is_light_on(&self) -> bool {
        self.light_on.load(Ordering::Acquire)
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.access.is_ready() {
            bail!("NOT_READY");
        }
        Ok(())
    }

    fn update_prefs(&self, f: impl FnOnce(&mut Prefs)) -> Result<Prefs> {
        let mut guard = self.prefs.write().map_err(|_| anyhow!("prefs lock poisoned"))?;
        f(&mut guard);
        guard.save(&self.prefs_path)?;
        Ok(guard.clone())
    }

    /// Lights the LED the way `mode` and its stored parameters say.
    pub async fn apply(&self, mode: LightMode) -> bool {
        let prefs = self.prefs();
        let brightness = prefs.brightness_for(mode) as i64;
        debug!(target: "reclight::control", "Applying {} (brightness={})", mode, brightness);
        match mode {
            LightMode::Static => self.led.turn_on(brightness).await,
            LightMode::Blink => {
                let delay = prefs.blink_delay_ms();
                self.led.start_blinking(delay, delay, brightness).await
            }
            LightMode::Breathe => self.led.start_breathing(brightness).await,
        }
    }

    pub async fn turn_on(&self) -> Result<bool> {
        self.ensure_ready()?;
        let ok = self.apply(self.prefs().mode()).await;
        if ok {
            self.light_on.store(true, Ordering::Release);
        }
        Ok(ok)
    }

    pub async fn turn_off(&self) -> Result<bool> {
        self.ensure_ready()?;
        let ok = self.led.turn_off().await;
        if ok {
            self.light_on.store(false, Ordering::Release);
        }
        Ok(ok)
    }

    /// Flips the light. The on/off state only changes when the write succeeds.
    pub async fn toggle(&self) -> Result<bool> {
        if self.is_light_on() {
            self.turn_off().await
        } else {
            self.turn_on().await
        }
    }

    pub async fn set_mode(&self, mode: LightMode) -> Result<()> {
        self.update_prefs(|p| p.set_mode(mode))?;
        info!(target: "reclight::control", "Mode set to {}", mode);

        if self.is_light_on() && self.access.is_ready() {
            if mode == LightMode::Static {
                self.led.stop_blinking().await;
            }
            if !self.apply(mode).await {
                warn!(target: "reclight::control", "Failed to re-apply {} after mode change", mode);
            }
        }
        Ok(())
    }

    /// Stores brightness for the active mode and re-applies it live.
    pub async fn set_brightness(&self, value: f32) -> Result<u8> {
        let mode = self.prefs().mode();
        let prefs = self.update_prefs(|p| p.set_brightness_for(mode, value))?;
        if mode == LightMode::Static {
            self.set_synced_static(None);
        }

        if self.is_light_on() && self.access.is_ready() {
            self.apply(mode).await;
        }
        Ok(prefs.brightness_for(mode))
    }

    pub async fn set_speed(&self, speed: f32) -> Result<f32> {
        let prefs = self.update_prefs(|p| p.set_blink_speed(speed))?;

        if self.is_light_on() && self.access.is_ready() && prefs.mode() == LightMode::Blink {
            self.apply(LightMode::Blink).await;
        }
        Ok(prefs.blink_speed)
    }

    pub async fn current_brightness(&self) -> i32 {
        self.led.current_brightness().await
    }

    /// Static mode mirrors the hardware; animated modes are left alone to avoid flicker.
    pub async fn sync_from_hardware(&self) {
        if !self.access.is_ready() || self.prefs().mode() != LightMode::Static {
            return;
        }
        let current = self.led.current_brightness().await;
        self.light_on.store(current > 0, Ordering::Release);
        if current > 0 {
            self.set_synced_static(Some(clamp_brightness(current as i64)));
        }
    }

    pub fn mark_tile_added(&self) -> Result<()> {
        self.update_prefs(|p| p.tile_added = true)?;
        Ok(())
    }

    pub fn reload_prefs(&self) -> Result<()> {
        let fresh = Prefs::load(&self.prefs_path)?;
        let mut guard = self.prefs.write().map_err(|_| anyhow!("prefs lock poisoned"))?;
        *guard = fresh;
        drop(guard);
        self.set_synced_static(None);
        debug!(target: "reclight::control", "Prefs reloaded");
        Ok(())
    }

    pub async fn shutdown(&self) {
        self.led.stop_animation().await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::AccessStatus;
    use crate::core::shell::ShellResult;
    use std::sync::Mutex;
    use std::time::Duration;

    pub(crate) struct RecordingShell {
        pub log: Mutex<Vec<String>>,
        pub reply: Mutex<ShellResult>,
    }

    impl RecordingShell {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                log: Mutex::new(Vec::new()),
                reply: Mutex::new(ShellResult::from_exit(String::new(), String::new(), 0)),
            })
        }

        pub fn last(&self) -> Option<String> {
            self.log.lock().unwrap().last().cloned()
        }
    }

    impl ShellBackend for RecordingShell {
        async fn exec(&self, command: &str) -> ShellResult {
            self.log.lock().unwrap().push(command.to_string());
            self.reply.lock().unwrap().clone()
        }
    }

    pub(crate) fn controller(
        dir: &std::path::Path,
        status: AccessStatus,
    ) -> (Arc<Controller<RecordingShell>>, Arc<RecordingShell>) {
        let shell = RecordingShell::new();
        let access = Arc::new(AccessState::default());
        access.record(status);
        let led = LedController::new(shell.clone(), "/led");
        let ctl = Controller::new(led, access, Prefs::default(), dir.join("prefs.toml"));
        (Arc::new(ctl), shell)
    }

    #[tokio::test]
    async fn refuses_to_drive_led_when_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let (ctl, shell) = controller(dir.path(), AccessStatus::NotRunning);

        assert!(ctl.toggle().await.is_err());
        assert!(!ctl.is_light_on());
        assert!(shell.log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_uses_static_brightness() {
        let dir = tempfile::tempdir().unwrap();
        let (ctl, shell) = controller(dir.path(), AccessStatus::UsingRootDirectly);

        assert!(ctl.toggle().await.unwrap());
        assert!(ctl.is_light_on());
        assert_eq!(shell.last().as_deref(), Some("echo 100 > /led"));

        assert!(ctl.toggle().await.unwrap());
        assert!(!ctl.is_light_on());
        assert_eq!(shell.last().as_deref(), Some("echo 0 > /led"));
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let (ctl, shell) = controller(dir.path(), AccessStatus::Ready);
        *shell.reply.lock().unwrap() = ShellResult::failed("denied");

        assert!(!ctl.toggle().await.unwrap());
        assert!(!ctl.is_light_on());
    }

    #[tokio::test(start_paused = true)]
    async fn mode_change_while_on_restarts_in_new_mode() {
        let dir = tempfile::tempdir().unwrap();
        let (ctl, _shell) = controller(dir.path(), AccessStatus::UsingRootDirectly);

        ctl.turn_on().await.unwrap();
        assert!(!ctl.led().is_animating());

        ctl.set_mode(LightMode::Breathe).await.unwrap();
        assert!(ctl.led().is_animating());
        assert_eq!(Prefs::load(dir.path().join("prefs.toml")).unwrap().mode(), LightMode::Breathe);

        ctl.set_mode(LightMode::Static).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!ctl.led().is_animating());
        assert!(ctl.is_light_on());
    }

    #[tokio::test]
    async fn brightness_is_stored_per_mode() {
        let dir = tempfile::tempdir().unwrap();
        let (ctl, shell) = controller(dir.path(), AccessStatus::UsingRootDirectly);

        assert_eq!(ctl.set_brightness(400.0).await.unwrap(), 255);
        // light is off, nothing written
        assert!(shell.log.lock().unwrap().is_empty());

        ctl.turn_on().await.unwrap();
        assert_eq!(ctl.set_brightness(42.0).await.unwrap(), 42);
        assert_eq!(shell.last().as_deref(), Some("echo 42 > /led"));

        let saved = Prefs::load(dir.path().join("prefs.toml")).unwrap();
        assert_eq!(saved.brightness_for(LightMode::Static), 42);
        assert_eq!(saved.brightness_for(LightMode::Blink), 255);
    }

    #[tokio::test]
    async fn static_mode_syncs_from_hardware() {
        let dir = tempfile::tempdir().unwrap();
        let (ctl, shell) = controller(dir.path(), AccessStatus::Ready);
        *shell.reply.lock().unwrap() = ShellResult::from_exit("180\n".into(), String::new(), 0);

        ctl.sync_from_hardware().await;
        assert!(ctl.is_light_on());
        assert_eq!(ctl.prefs().brightness_for(LightMode::Static), 180);
        assert_eq!(shell.last().as_deref(), Some("cat /led"));
    }

    #[tokio::test]
    async fn synced_brightness_is_not_saved_by_other_changes() {
        let dir = tempfile::tempdir().unwrap();
        let (ctl, shell) = controller(dir.path(), AccessStatus::Ready);
        *shell.reply.lock().unwrap() = ShellResult::from_exit("7\n".into(), String::new(), 0);

        ctl.sync_from_hardware().await;
        ctl.set_speed(80.0).await.unwrap();
        ctl.mark_tile_added().unwrap();

        let saved = Prefs::load(dir.path().join("prefs.toml")).unwrap();
        assert_eq!(saved.brightness_for(LightMode::Static), 100);
        assert_eq!(saved.blink_speed, 80.0);
        assert_eq!(ctl.prefs().brightness_for(LightMode::Static), 7);

        // an explicit brightness replaces the synced value
        assert_eq!(ctl.set_brightness(30.0).await.unwrap(), 30);
        assert_eq!(ctl.prefs().brightness_for(LightMode::Static), 30);
    }

    #[tokio::test]
    async fn tile_flag_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (ctl, _) = controller(dir.path(), AccessStatus::NotInstalled);

        ctl.mark_tile_added().unwrap();
        assert!(Prefs::load(dir.path().join("prefs.toml")).unwrap().tile_added);
    }
}
