//! Runtime settings
//!
//! Persisted as a JSON file next to the score store. Every field has a
//! default, so a partial or missing file still yields a usable config.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    /// Playfield width in pixels
    pub field_width: f32,
    /// Playfield height in pixels
    pub field_height: f32,
    /// Length of a round in seconds
    pub round_seconds: u32,

    // === Loading ===
    /// How long LOADING waits for the classifier before giving up
    pub classifier_timeout_ms: u64,

    // === Feedback ===
    /// Upper bound on live particles
    pub max_particles: usize,
    /// Scores above this play the win cue even without a new record
    pub good_score_threshold: f64,

    // === Storage ===
    /// Best-score JSON file
    pub score_file: PathBuf,
    /// Folder with `<keyword>.png` sprites, if any
    pub asset_dir: Option<PathBuf>,
    /// Sprite edge length requested from the image provider
    pub sprite_size: u32,

    // === Determinism ===
    /// Fixed seed for reproducible sessions (random when unset)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: crate::consts::FIELD_WIDTH,
            field_height: crate::consts::FIELD_HEIGHT,
            round_seconds: crate::consts::ROUND_SECONDS,

            classifier_timeout_ms: 10_000,

            max_particles: 256,
            good_score_threshold: 5.0,

            score_file: PathBuf::from("scores.json"),
            asset_dir: None,
            sprite_size: 40,

            seed: None,
        }
    }
}

impl Settings {
    /// Playfield size as a vector
    pub fn field(&self) -> Vec2 {
        Vec2::new(self.field_width.max(1.0), self.field_height.max(1.0))
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Settings file {} unreadable ({e}), using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
