//! The six mini-game engines and their shared contract
//!
//! Every engine is a plain state machine: the session registers the ticks an
//! engine asks for in [`MiniGame::schedule`] and feeds them back through
//! [`MiniGame::on_tick`]. Once [`MiniGame::is_finished`] is true every tick
//! and input is ignored.

pub mod collector;
pub mod connector;
pub mod dodger;
pub mod resource;
pub mod shooter;
pub mod sorter;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

pub use collector::{Collector, CollectorTarget};
pub use connector::{Connector, ConnectorLayout, Zone};
pub use dodger::{Dodger, Enemy};
pub use resource::Resource;
pub use shooter::{Shooter, ShooterTarget};
pub use sorter::{Lane, SortItem, Sorter, Verdict};

use super::scheduler::{Periodic, TickKind};
use crate::scenario::{GameMode, ScenarioDescriptor};

/// Default round length
pub const ROUND_SECONDS: u32 = 30;
/// Countdown period
pub const COUNTDOWN_MS: u64 = 1000;

/// Player input, already translated to playfield coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Click or tap
    Click(Vec2),
    /// Pointer moved (no button required)
    PointerMove(Vec2),
    /// Left arrow / left swipe
    Left,
    /// Right arrow / right swipe
    Right,
    /// "Grow" control
    Grow,
    /// "Reduce" control
    Reduce,
}

/// Input channels a mode captures while it is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    Click,
    PointerMotion,
    ArrowKeys,
    Buttons,
}

impl InputEvent {
    /// Channel this event arrives on
    pub fn binding(&self) -> InputBinding {
        match self {
            InputEvent::Click(_) => InputBinding::Click,
            InputEvent::PointerMove(_) => InputBinding::PointerMotion,
            InputEvent::Left | InputEvent::Right => InputBinding::ArrowKeys,
            InputEvent::Grow | InputEvent::Reduce => InputBinding::Buttons,
        }
    }
}

/// Feedback an engine hands back to its session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Spawn a particle burst here
    Burst { at: Vec2 },
    /// Time was taken off the clock
    Penalty { seconds: u32 },
}

/// Per-mode game logic
pub trait MiniGame {
    /// Reset to a fresh round for this scenario
    fn start(&mut self, descriptor: &ScenarioDescriptor, duration_secs: u32);

    /// Periodic ticks this mode needs, in the order they should be registered
    fn schedule(&self) -> Vec<Periodic>;

    fn on_tick(&mut self, kind: TickKind);

    fn on_input(&mut self, event: InputEvent);

    fn is_finished(&self) -> bool;

    /// Score so far; final once finished. Never negative.
    fn final_score(&self) -> f64;

    /// Whole seconds left on the round clock
    fn time_remaining(&self) -> u32;

    /// One-line goal text for the HUD
    fn describe_goal(&self) -> String;

    /// Input channels to capture while live
    fn bindings(&self) -> &'static [InputBinding];

    /// Feedback produced since the last call
    fn drain_events(&mut self) -> Vec<GameEvent> {
        Vec::new()
    }
}

/// Round clock in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration: duration_secs,
            remaining: duration_secs,
        }
    }

    /// Take one second off. Returns true when the clock has run out.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    /// Take `secs` off, floored at zero
    pub fn penalize(&mut self, secs: u32) {
        self.remaining = self.remaining.saturating_sub(secs);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Whole seconds taken off so far
    pub fn elapsed(&self) -> u32 {
        self.duration - self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

/// Uniform sample in `[lo, hi]`, or the midpoint when the range is empty
pub(crate) fn random_between(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        (lo + hi) * 0.5
    } else {
        rng.random_range(lo..=hi)
    }
}

/// Upper-cased entity name, or the fallback when the classifier left it out
pub(crate) fn label_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_uppercase()
    }
}

/// Entity name as given, or the fallback
pub(crate) fn name_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// One engine per game mode, dispatched exhaustively
#[derive(Debug)]
pub enum ModeEngine {
    Shooter(Shooter),
    Resource(Resource),
    Sorter(Sorter),
    Dodger(Dodger),
    Collector(Collector),
    Connector(Connector),
}

macro_rules! dispatch {
    ($self:ident, $engine:ident => $body:expr) => {
        match $self {
            ModeEngine::Shooter($engine) => $body,
            ModeEngine::Resource($engine) => $body,
            ModeEngine::Sorter($engine) => $body,
            ModeEngine::Dodger($engine) => $body,
            ModeEngine::Collector($engine) => $body,
            ModeEngine::Connector($engine) => $body,
        }
    };
}

impl ModeEngine {
    /// Build the engine for `mode` on a playfield of the given size
    pub fn new(mode: GameMode, field: Vec2, seed: u64) -> Self {
        match mode {
            GameMode::Shooter => ModeEngine::Shooter(Shooter::new(field, seed)),
            GameMode::Resource => ModeEngine::Resource(Resource::new(seed)),
            GameMode::Sorter => ModeEngine::Sorter(Sorter::new(field, seed)),
            GameMode::Dodger => ModeEngine::Dodger(Dodger::new(field, seed)),
            GameMode::Collector => ModeEngine::Collector(Collector::new(field, seed)),
            GameMode::Connector => ModeEngine::Connector(Connector::new(field, seed)),
        }
    }

    pub fn mode(&self) -> GameMode {
        match self {
            ModeEngine::Shooter(_) => GameMode::Shooter,
            ModeEngine::Resource(_) => GameMode::Resource,
            ModeEngine::Sorter(_) => GameMode::Sorter,
            ModeEngine::Dodger(_) => GameMode::Dodger,
            ModeEngine::Collector(_) => GameMode::Collector,
            ModeEngine::Connector(_) => GameMode::Connector,
        }
    }
}

impl MiniGame for ModeEngine {
    fn start(&mut self, descriptor: &ScenarioDescriptor, duration_secs: u32) {
        dispatch!(self, g => g.start(descriptor, duration_secs))
    }

    fn schedule(&self) -> Vec<Periodic> {
        dispatch!(self, g => g.schedule())
    }

    fn on_tick(&mut self, kind: TickKind) {
        dispatch!(self, g => g.on_tick(kind))
    }

    fn on_input(&mut self, event: InputEvent) {
        dispatch!(self, g => g.on_input(event))
    }

    fn is_finished(&self) -> bool {
        dispatch!(self, g => g.is_finished())
    }

    fn final_score(&self) -> f64 {
        dispatch!(self, g => g.final_score())
    }

    fn time_remaining(&self) -> u32 {
        dispatch!(self, g => g.time_remaining())
    }

    fn describe_goal(&self) -> String {
        dispatch!(self, g => g.describe_goal())
    }

    fn bindings(&self) -> &'static [InputBinding] {
        dispatch!(self, g => g.bindings())
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        dispatch!(self, g => g.drain_events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Sentiment;

    #[test]
    fn test_countdown() {
        let mut c = Countdown::new(5);
        assert!(!c.tick());
        assert_eq!(c.remaining(), 4);
        c.penalize(3);
        assert_eq!(c.remaining(), 1);
        assert_eq!(c.elapsed(), 4);
        assert!(c.tick());
        assert!(c.tick());
        assert_eq!(c.remaining(), 0);
        c.penalize(3);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn test_engine_matches_mode() {
        for mode in GameMode::ALL {
            let mut engine = ModeEngine::new(mode, Vec2::new(600.0, 400.0), 1);
            let d = ScenarioDescriptor::new(mode, "", "", "", Sentiment::Positive);
            engine.start(&d, ROUND_SECONDS);
            assert_eq!(engine.mode(), mode);
            assert_eq!(engine.time_remaining(), ROUND_SECONDS);
            assert!(!engine.is_finished());
            assert_eq!(engine.final_score(), 0.0);
            assert!(!engine.describe_goal().is_empty());
            assert!(!engine.bindings().is_empty());
            assert!(
                engine.schedule().iter().any(|p| p.kind == TickKind::Countdown),
                "{mode:?} has no countdown"
            );
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(label_or("  ", "TARGET"), "TARGET");
        assert_eq!(label_or("zombie", "TARGET"), "ZOMBIE");
        assert_eq!(name_or("Hero", "A"), "Hero");
    }
}
