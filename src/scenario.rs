//! Scenario descriptor and the classifier boundary
//!
//! The classifier itself lives outside this crate. All we own is the shape of
//! its answer and the validation of that answer.

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

/// Which mini-game a scenario plays as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameMode {
    Shooter,
    Resource,
    Sorter,
    Dodger,
    Collector,
    Connector,
}

impl GameMode {
    pub const ALL: [GameMode; 6] = [
        GameMode::Shooter,
        GameMode::Resource,
        GameMode::Sorter,
        GameMode::Dodger,
        GameMode::Collector,
        GameMode::Connector,
    ];

    /// Stable name, also used as the score store key
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Shooter => "SHOOTER",
            GameMode::Resource => "RESOURCE",
            GameMode::Sorter => "SORTER",
            GameMode::Dodger => "DODGER",
            GameMode::Collector => "COLLECTOR",
            GameMode::Connector => "CONNECTOR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SHOOTER" => Some(GameMode::Shooter),
            "RESOURCE" => Some(GameMode::Resource),
            "SORTER" => Some(GameMode::Sorter),
            "DODGER" => Some(GameMode::Dodger),
            "COLLECTOR" => Some(GameMode::Collector),
            "CONNECTOR" => Some(GameMode::Connector),
            _ => None,
        }
    }

    /// Fast-paced modes get the action soundtrack regardless of mood
    pub fn is_action(&self) -> bool {
        matches!(self, GameMode::Shooter | GameMode::Dodger)
    }
}

/// Mood of the scenario, drives theme and music
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
}

/// Structured classification of a scenario
///
/// Immutable once produced. Text fields may be empty; each game supplies
/// its own fallback wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDescriptor {
    pub mode: GameMode,
    #[serde(default)]
    pub verb: String,
    #[serde(default)]
    pub ent_a: String,
    #[serde(default)]
    pub ent_b: String,
    pub sentiment: Sentiment,
}

impl ScenarioDescriptor {
    pub fn new(
        mode: GameMode,
        verb: impl Into<String>,
        ent_a: impl Into<String>,
        ent_b: impl Into<String>,
        sentiment: Sentiment,
    ) -> Self {
        Self {
            mode,
            verb: verb.into(),
            ent_a: ent_a.into(),
            ent_b: ent_b.into(),
            sentiment,
        }
    }

    /// Parse and validate the classifier's JSON answer
    ///
    /// Tolerates a markdown code fence around the object, which language
    /// model backends tend to add even when told not to.
    pub fn from_json(raw: &str) -> Result<Self, ClassifyError> {
        let body = strip_code_fence(raw.trim());
        if body.is_empty() {
            return Err(ClassifyError::InvalidDescriptor("empty response".into()));
        }
        let mut descriptor: ScenarioDescriptor = serde_json::from_str(body)?;
        descriptor.verb = descriptor.verb.trim().to_uppercase();
        descriptor.ent_a = descriptor.ent_a.trim().to_string();
        descriptor.ent_b = descriptor.ent_b.trim().to_string();
        Ok(descriptor)
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Turns scenario text into a descriptor
///
/// Implementations may block; the controller always calls this from its
/// background task and enforces its own timeout.
pub trait ScenarioClassifier: Send + Sync {
    fn analyze(&self, text: &str) -> Result<ScenarioDescriptor, ClassifyError>;
}
