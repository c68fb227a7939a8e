//! Best score per game mode
//!
//! Persisted to a small JSON object keyed by mode name, e.g.
//! `{"SHOOTER": 25.0, "RESOURCE": 18.4}`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::scenario::GameMode;

/// Outcome of recording a score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreUpdate {
    /// Best score for the mode after the update
    pub best: f64,
    /// True only if the new score strictly beat the previous best
    pub is_new_record: bool,
}

/// Best-score storage, injected into the controller
pub trait ScoreRepository {
    /// Stored best for a mode (0 when nothing is stored)
    fn best(&self, mode: GameMode) -> f64;

    /// Record a finished round's score
    fn update(&mut self, mode: GameMode, score: f64) -> ScoreUpdate;
}

/// Best scores, optionally backed by a JSON file
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    best: BTreeMap<String, f64>,
    path: Option<PathBuf>,
}

impl HighScores {
    /// Create an empty, memory-only store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file-backed store
    ///
    /// A missing or corrupt file yields an empty store; the file is
    /// rewritten on the next record.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let best = match Self::read(&path) {
            Ok(best) => {
                log::info!("Loaded {} best scores from {}", best.len(), path.display());
                best
            }
            Err(PersistenceError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No score file at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                log::warn!("Ignoring score file {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            best,
            path: Some(path),
        }
    }

    fn read(path: &Path) -> Result<BTreeMap<String, f64>, PersistenceError> {
        let json = std::fs::read_to_string(path)?;
        let raw: BTreeMap<String, f64> = serde_json::from_str(&json)?;
        // Drop anything that could not have been written by us
        Ok(raw
            .into_iter()
            .filter(|(_, v)| v.is_finite() && *v >= 0.0)
            .collect())
    }

    /// Write the store back to its file (no-op when memory-only)
    pub fn save(&self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string(&self.best)?;
        std::fs::write(path, json)?;
        log::info!("Best scores saved ({} modes)", self.best.len());
        Ok(())
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }
}

impl ScoreRepository for HighScores {
    fn best(&self, mode: GameMode) -> f64 {
        self.best.get(mode.as_str()).copied().unwrap_or(0.0)
    }

    fn update(&mut self, mode: GameMode, score: f64) -> ScoreUpdate {
        let score = if score.is_finite() { score.max(0.0) } else { 0.0 };
        let previous = self.best(mode);
        if score <= previous {
            return ScoreUpdate {
                best: previous,
                is_new_record: false,
            };
        }

        self.best.insert(mode.as_str().to_string(), score);
        if let Err(e) = self.save() {
            log::warn!("Could not persist best score for {}: {e}", mode.as_str());
        }
        ScoreUpdate {
            best: score,
            is_new_record: true,
        }
    }
}
