use crate::common::MAX_BRIGHTNESS;
use crate::core::shell::ShellBackend;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const BREATHE_STEPS: u32 = 10;
pub const BREATHE_STEP_MS: u64 = 50;
pub const BREATHE_HOLD_TOP_MS: u64 = 200;
pub const BREATHE_HOLD_BOTTOM_MS: u64 = 500;

pub fn clamp_brightness(value: i64) -> u8 {
    value.clamp(0, MAX_BRIGHTNESS as i64) as u8
}

/// Maps a 1..=100 speed onto a blink half-period: 1 -> 1000 ms, 100 -> 50 ms.
pub fn blink_delay_ms(speed: f32) -> u64 {
    let normalized = (speed.clamp(1.0, 100.0) - 1.0) / 99.0;
    (1000.0 - normalized * 950.0) as u64
}

/// One breathing cycle: 0..=10 steps up, then 10..=0 back down.
pub fn breathe_ramp(max: u8) -> Vec<u8> {
    let level = |i: u32| (max as u32 * i / BREATHE_STEPS) as u8;
    (0..=BREATHE_STEPS)
        .map(level)
        .chain((0..=BREATHE_STEPS).rev().map(level))
        .collect()
}

async fn write_brightness<B: ShellBackend>(shell: &B, path: &str, value: i64) -> bool {
    let clamped = clamp_brightness(value);
    shell
        .exec(&format!("echo {} > {}", clamped, path))
        .await
        .success
}

/// Drives the LED through its sysfs brightness file.
///
/// At most one animation runs at a time; anything that writes the LED
/// aborts the running animation first.
pub struct LedController<B> {
    shell: Arc<B>,
    path: String,
    animation: Mutex<Option<JoinHandle<()>>>,
}

impl<B: ShellBackend> LedController<B> {
    pub fn new(shell: Arc<B>, path: impl Into<String>) -> Self {
        Self {
            shell,
            path: path.into(),
            animation: Mutex::new(None),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation
            .lock()
            .ok()
            .and_then(|a| a.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub async fn stop_animation(&self) {
        let handle = self.animation.lock().ok().and_then(|mut a| a.take());
        if let Some(handle) = handle {
            handle.abort();
            // wait until the task is actually gone so its last write cannot land after ours
            let _ = handle.await;
            debug!(target: "reclight::led", "Animation stopped");
        }
    }

    fn replace_animation(&self, handle: JoinHandle<()>) {
        match self.animation.lock() {
            Ok(mut slot) => {
                if let Some(old) = slot.replace(handle) {
                    old.abort();
                }
            }
            Err(_) => {
                warn!(target: "reclight::led", "Animation lock poisoned, aborting new job");
                handle.abort();
            }
        }
    }

    pub async fn turn_on(&self, brightness: i64) -> bool {
        self.stop_animation().await;
        write_brightness(&*self.shell, &self.path, brightness).await
    }

    pub async fn turn_off(&self) -> bool {
        self.stop_animation().await;
        write_brightness(&*self.shell, &self.path, 0).await
    }

    pub async fn set_brightness(&self, brightness: i64) -> bool {
        if self.is_animating() {
            self.stop_animation().await;
        }
        write_brightness(&*self.shell, &self.path, brightness).await
    }

    /// Reads the LED's current value; -1 when it cannot be read or parsed.
    pub async fn current_brightness(&self) -> i32 {
        let result = self.shell.exec(&format!("cat {}", self.path)).await;
        if !result.success {
            return -1;
        }
        result.output.trim().parse().unwrap_or(-1)
    }

    pub async fn stop_blinking(&self) -> bool {
        self.turn_off().await
    }

    pub async fn start_blinking(&self, on_ms: u64, off_ms: u64, brightness: i64) -> bool {
        self.stop_animation().await;
        debug!(
            target: "reclight::led",
            "Starting blink animation (on={}ms off={}ms brightness={})",
            on_ms,
            off_ms,
            clamp_brightness(brightness)
        );

        let shell = self.shell.clone();
        let path = self.path.clone();
        let handle = tokio::spawn(async move {
            loop {
                write_brightness(&*shell, &path, brightness).await;
                tokio::time::sleep(Duration::from_millis(on_ms)).await;
                write_brightness(&*shell, &path, 0).await;
                tokio::time::sleep(Duration::from_millis(off_ms)).await;
            }
        });
        self.replace_animation(handle);
        true
    }

    pub async fn start_breathing(&self, max_brightness: i64) -> bool {
        self.stop_animation().await;
        debug!(target: "reclight::led", "Starting breathing animation (max={})", max_brightness);

        let ramp = breathe_ramp(clamp_brightness(max_brightness));
        let shell = self.shell.clone();
        let path = self.path.clone();
        let handle = tokio::spawn(async move {
            let (up, down) = ramp.split_at(ramp.len() / 2);
            loop {
                for &b in up {
                    write_brightness(&*shell, &path, b as i64).await;
                    tokio::time::sleep(Duration::from_millis(BREATHE_STEP_MS)).await;
                }
                tokio::time::sleep(Duration::from_millis(BREATHE_HOLD_TOP_MS)).await;
                for &b in down {
                    write_brightness(&*shell, &path, b as i64).await;
                    tokio::time::sleep(Duration::from_millis(BREATHE_STEP_MS)).await;
                }
                tokio::time::sleep(Duration::from_millis(BREATHE_HOLD_BOTTOM_MS)).await;
            }
        });
        self.replace_animation(handle);
        true
    }
}
