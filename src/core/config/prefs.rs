use crate::common::LightMode;
use crate::core::led::{blink_delay_ms, clamp_brightness};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flat user preferences, one value per key.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Prefs {
    #[serde(default = "default_mode")]
    pub active_mode: String,
    #[serde(default = "default_static_brightness")]
    pub static_brightness: f32,
    #[serde(default = "default_full_brightness")]
    pub blink_brightness: f32,
    #[serde(default = "default_blink_speed")]
    pub blink_speed: f32,
    #[serde(default = "default_full_brightness")]
    pub breathe_brightness: f32,
    #[serde(default)]
    pub tile_added: bool,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            active_mode: default_mode(),
            static_brightness: default_static_brightness(),
            blink_brightness: default_full_brightness(),
            blink_speed: default_blink_speed(),
            breathe_brightness: default_full_brightness(),
            tile_added: false,
        }
    }
}

impl Prefs {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(target: "reclight::config", "No prefs at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse prefs.toml")
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let toml_string = toml::to_string(self).context("Failed to serialize prefs")?;

        let temp_path = path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string).context("Failed to write temporary file")?;

        std::fs::rename(&temp_path, path).context("Failed to rename to final file")?;

        tracing::debug!(target: "reclight::config", "Prefs saved to {}", path.display());
        Ok(())
    }

    /// Unknown or garbled values read back as `Static`.
    pub fn mode(&self) -> LightMode {
        LightMode::from_str_ignore_case(&self.active_mode).unwrap_or_default()
    }

    pub fn set_mode(&mut self, mode: LightMode) {
        self.active_mode = mode.to_upper_str().to_string();
    }

    pub fn brightness_for(&self, mode: LightMode) -> u8 {
        let value = match mode {
            LightMode::Static => self.static_brightness,
            LightMode::Blink => self.blink_brightness,
            LightMode::Breathe => self.breathe_brightness,
        };
        clamp_brightness(value as i64)
    }

    pub fn set_brightness_for(&mut self, mode: LightMode, value: f32) {
        let value = value.clamp(0.0, 255.0);
        match mode {
            LightMode::Static => self.static_brightness = value,
            LightMode::Blink => self.blink_brightness = value,
            LightMode::Breathe => self.breathe_brightness = value,
        }
    }

    pub fn set_blink_speed(&mut self, speed: f32) {
        self.blink_speed = speed.clamp(1.0, 100.0);
    }

    pub fn blink_delay_ms(&self) -> u64 {
        blink_delay_ms(self.blink_speed)
    }
}

fn default_mode() -> String {
    LightMode::Static.to_upper_str().to_string()
}

fn default_static_brightness() -> f32 {
    100.0
}

fn default_full_brightness() -> f32 {
    255.0
}

fn default_blink_speed() -> f32 {
    50.0
}
