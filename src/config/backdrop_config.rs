//! Backdrop configuration
//!
//! JSON description of the background video layer: which file to play,
//! the stage it is composited onto and how playback is started.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Stage (window) size the video is stretched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    #[serde(default = "default_stage_width")]
    pub width: u32,
    #[serde(default = "default_stage_height")]
    pub height: u32,
}

fn default_stage_width() -> u32 {
    1600
}

fn default_stage_height() -> u32 {
    900
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: default_stage_width(),
            height: default_stage_height(),
        }
    }
}

/// Appearance of the video layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    /// 0 (invisible) to 255 (opaque); 26 is roughly 10% opacity
    #[serde(default = "default_transparency")]
    pub transparency: i32,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_transparency() -> i32 {
    26
}

fn default_volume() -> f32 {
    1.0
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            transparency: default_transparency(),
            volume: default_volume(),
        }
    }
}

/// Playback start and tick pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Delay before the video starts, in microseconds
    #[serde(default = "default_start_delay")]
    pub start_delay: i64,
    /// Hold the video paused until the start delay has elapsed
    #[serde(default = "default_start_paused")]
    pub start_paused: bool,
    /// Frames one update may pull when catching up
    #[serde(default = "default_max_catch_up")]
    pub max_catch_up: u32,
    /// Render ticks per second for headless playback
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
}

fn default_start_delay() -> i64 {
    4_400_000
}

fn default_start_paused() -> bool {
    true
}

fn default_max_catch_up() -> u32 {
    crate::video::DEFAULT_MAX_CATCH_UP
}

fn default_tick_rate() -> u32 {
    60
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            start_delay: default_start_delay(),
            start_paused: default_start_paused(),
            max_catch_up: default_max_catch_up(),
            tick_rate: default_tick_rate(),
        }
    }
}

/// Complete backdrop configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackdropConfig {
    /// Video file, relative paths resolve against the config's directory
    #[serde(default)]
    pub video: String,
    #[serde(default)]
    pub stage: StageConfig,
    #[serde(default)]
    pub layer: LayerConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl BackdropConfig {
    /// Load from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: BackdropConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the video path against `base_dir`
    pub fn resolve_video_path(&self, base_dir: &Path) -> PathBuf {
        let path = Path::new(&self.video);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn stage_size(&self) -> (u32, u32) {
        (self.stage.width, self.stage.height)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_micros(self.timing.start_delay.max(0) as u64)
    }

    /// Interval between headless ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.timing.tick_rate.max(1)))
    }
}
