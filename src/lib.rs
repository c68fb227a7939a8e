//! Scenario Arcade - timed mini-games built from a classified scenario
//!
//! Core modules:
//! - `sim`: Deterministic simulation (scheduler, collision, particles, the six game modes)
//! - `session`: One live round wired to its clock and particles
//! - `controller`: Menu / loading / playing / results flow
//! - `scenario`, `assets`, `audio`, `highscores`: boundaries to the outside world
//! - `settings`, `theme`: Data-driven configuration and palettes

pub mod assets;
pub mod audio;
pub mod autopilot;
pub mod controller;
pub mod error;
pub mod highscores;
pub mod scenario;
pub mod session;
pub mod settings;
pub mod sim;
pub mod theme;

pub use controller::{AppState, Grade, ResultCue, ResultsSummary, SessionController};
pub use error::{AssetError, ClassifyError, PersistenceError};
pub use highscores::{HighScores, ScoreRepository, ScoreUpdate};
pub use scenario::{GameMode, ScenarioClassifier, ScenarioDescriptor, Sentiment};
pub use session::GameSession;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default playfield size in pixels
    pub const FIELD_WIDTH: f32 = 600.0;
    pub const FIELD_HEIGHT: f32 = 400.0;

    /// Default round length
    pub use crate::sim::modes::ROUND_SECONDS;
    /// Round clock period
    pub use crate::sim::modes::COUNTDOWN_MS;
    /// Particle physics period
    pub use crate::sim::particles::PARTICLE_TICK_MS;
}
