use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{BoothError, BoothResult};

/// Runtime configuration for one booth.
///
/// Every field has a default, so an empty JSON object (or no file at all) is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    /// Capture timing.
    pub capture: CaptureTiming,
    /// Export settings.
    pub export: ExportConfig,
    /// Directory with sticker artwork overrides (`<id>.png` / `<id>.svg`).
    pub sticker_dir: Option<PathBuf>,
    /// Extra `.ttf`/`.otf`/`.ttc` fonts for note text, loaded on top of the system fonts.
    pub font_dir: Option<PathBuf>,
}

/// Countdown and curtain timing for a capture cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureTiming {
    /// First value shown by the countdown.
    pub countdown_from: u8,
    /// Delay between countdown ticks, in milliseconds.
    pub tick_ms: u64,
    /// How long the curtain covers the frame before rasterization, in milliseconds.
    pub curtain_ms: u64,
}

/// Export and share settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Upscale factor applied when flattening the strip.
    pub scale: f64,
    /// Title passed to share targets.
    pub share_title: String,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            capture: CaptureTiming::default(),
            export: ExportConfig::default(),
            sticker_dir: None,
            font_dir: None,
        }
    }
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self {
            countdown_from: 3,
            tick_ms: 1000,
            curtain_ms: 800,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 3.0,
            share_title: "My Photostrip".to_string(),
        }
    }
}

impl CaptureTiming {
    /// Tick interval as a [`Duration`].
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Curtain duration as a [`Duration`].
    pub fn curtain(&self) -> Duration {
        Duration::from_millis(self.curtain_ms)
    }
}

impl BoothConfig {
    /// Read and validate a JSON config file.
    pub fn from_path(path: &Path) -> BoothResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Parse and validate JSON config text.
    pub fn from_json(text: &str) -> BoothResult<Self> {
        let cfg: Self =
            serde_json::from_str(text).map_err(|e| BoothError::config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> BoothResult<()> {
        if self.capture.countdown_from > 10 {
            return Err(BoothError::config("capture.countdown_from must be <= 10"));
        }
        if self.capture.tick_ms > 10_000 || self.capture.curtain_ms > 10_000 {
            return Err(BoothError::config(
                "capture.tick_ms and capture.curtain_ms must be <= 10000",
            ));
        }
        if !self.export.scale.is_finite() || !(0.25..=8.0).contains(&self.export.scale) {
            return Err(BoothError::config("export.scale must be within 0.25..=8"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
