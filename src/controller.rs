//! App flow: menu, loading, playing, results
//!
//! The controller owns at most one [`GameSession`]. Leaving a state always
//! tears down what that state held, so a replay or a new scenario starts from
//! a clean slate. Classification runs on a background thread and hands its
//! answer back through a one-slot channel; the controller only looks at it
//! from `update` or `await_classification`.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::assets::TextureCache;
use crate::audio::{AudioSink, Cue, MusicMode};
use crate::error::ClassifyError;
use crate::highscores::ScoreRepository;
use crate::scenario::{GameMode, ScenarioClassifier, ScenarioDescriptor, Sentiment};
use crate::session::GameSession;
use crate::settings::Settings;
use crate::sim::modes::InputEvent;
use crate::theme::Theme;

type Classified = Result<ScenarioDescriptor, ClassifyError>;

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Loading,
    Playing,
    Results,
}

/// Letter grade shown on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    S,
    A,
    B,
    C,
}

impl Grade {
    /// Only the shooter has a graded scale; everything else gets C
    pub fn for_score(mode: GameMode, score: f64) -> Grade {
        match mode {
            GameMode::Shooter if score > 20.0 => Grade::S,
            GameMode::Shooter if score > 15.0 => Grade::A,
            GameMode::Shooter if score > 10.0 => Grade::B,
            _ => Grade::C,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
        }
    }
}

/// How a round ended, from the player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCue {
    NewRecord,
    Good,
    Fail,
}

impl ResultCue {
    pub fn audio(&self) -> Cue {
        match self {
            ResultCue::NewRecord | ResultCue::Good => Cue::Win,
            ResultCue::Fail => Cue::GameOver,
        }
    }
}

/// What the results screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsSummary {
    pub mode: GameMode,
    pub score: f64,
    pub best: f64,
    pub is_new_record: bool,
    pub grade: Grade,
    pub cue: ResultCue,
}

/// Gameplay music for a scenario
pub fn music_for(descriptor: &ScenarioDescriptor) -> MusicMode {
    if descriptor.mode.is_action() {
        MusicMode::Action
    } else if descriptor.sentiment == Sentiment::Negative {
        MusicMode::Drone
    } else {
        MusicMode::Arpeggio
    }
}

pub struct SessionController {
    settings: Settings,
    classifier: Arc<dyn ScenarioClassifier>,
    textures: Arc<TextureCache>,
    audio: Box<dyn AudioSink>,
    scores: Box<dyn ScoreRepository>,

    state: AppState,
    session: Option<GameSession>,
    /// Kept for replay without re-classifying
    last_descriptor: Option<ScenarioDescriptor>,
    pending: Option<Receiver<Classified>>,
    /// Time spent in LOADING, in update milliseconds
    loading_ms: u64,
    last_error: Option<ClassifyError>,
    results: Option<ResultsSummary>,
    theme: Theme,
    /// Hands out one seed per session
    seeds: Pcg32,
}

impl SessionController {
    pub fn new(
        settings: Settings,
        classifier: Arc<dyn ScenarioClassifier>,
        textures: Arc<TextureCache>,
        audio: Box<dyn AudioSink>,
        scores: Box<dyn ScoreRepository>,
    ) -> Self {
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        Self {
            settings,
            classifier,
            textures,
            audio,
            scores,
            state: AppState::Menu,
            session: None,
            last_descriptor: None,
            pending: None,
            loading_ms: 0,
            last_error: None,
            results: None,
            theme: Theme::NEUTRAL,
            seeds: Pcg32::seed_from_u64(seed),
        }
    }

    // === State ===

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn results(&self) -> Option<&ResultsSummary> {
        self.results.as_ref()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Why the last classification went back to the menu
    pub fn last_error(&self) -> Option<&ClassifyError> {
        self.last_error.as_ref()
    }

    pub fn last_descriptor(&self) -> Option<&ScenarioDescriptor> {
        self.last_descriptor.as_ref()
    }

    pub fn best(&self, mode: GameMode) -> f64 {
        self.scores.best(mode)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // === Transitions ===

    /// MENU -> LOADING. Returns false when the text is blank or we are busy.
    pub fn submit(&mut self, text: &str) -> bool {
        let text = text.trim();
        if self.state != AppState::Menu || text.is_empty() {
            return false;
        }
        self.teardown();
        self.last_error = None;

        let (tx, rx) = mpsc::sync_channel::<Classified>(1);
        let classifier = Arc::clone(&self.classifier);
        let textures = Arc::clone(&self.textures);
        let size = self.sprite_size();
        let owned = text.to_string();

        let spawned = thread::Builder::new()
            .name("classify".into())
            .spawn(move || {
                let result = classifier.analyze(&owned);
                if let Ok(descriptor) = &result {
                    textures.prefetch(&descriptor.ent_b, size);
                }
                if tx.send(result).is_err() {
                    log::debug!("Classification finished after the controller moved on");
                }
            });

        if let Err(e) = spawned {
            log::warn!("Could not start classification: {e}");
            self.last_error = Some(ClassifyError::Unavailable(e.to_string()));
            return false;
        }

        log::info!("Loading scenario: {text:?}");
        self.pending = Some(rx);
        self.loading_ms = 0;
        self.state = AppState::Loading;
        true
    }

    /// Advance by `dt_ms` of frame time
    pub fn update(&mut self, dt_ms: u64) {
        match self.state {
            AppState::Loading => self.poll_classification(dt_ms),
            AppState::Playing => {
                if let Some(session) = self.session.as_mut() {
                    session.advance(dt_ms);
                }
                self.check_finished();
            }
            AppState::Menu | AppState::Results => {}
        }
    }

    /// Block until classification answers or `budget` runs out
    pub fn await_classification(&mut self, budget: Duration) -> AppState {
        if self.state != AppState::Loading {
            return self.state;
        }
        let Some(rx) = self.pending.as_ref() else {
            self.finish_loading(Err(ClassifyError::TaskLost));
            return self.state;
        };
        let result = match rx.recv_timeout(budget) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                Err(ClassifyError::Timeout(budget.as_millis() as u64))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ClassifyError::TaskLost),
        };
        self.finish_loading(result);
        self.state
    }

    /// Route player input to the live session
    pub fn input(&mut self, event: InputEvent) {
        if self.state != AppState::Playing {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.on_input(event);
        }
        self.check_finished();
    }

    /// RESULTS -> PLAYING with the same scenario
    pub fn replay(&mut self) -> bool {
        if self.state != AppState::Results {
            return false;
        }
        let Some(descriptor) = self.last_descriptor.clone() else {
            return false;
        };
        log::info!("Replaying {}", descriptor.mode.as_str());
        self.start_game(descriptor);
        true
    }

    /// RESULTS -> MENU
    pub fn new_scenario(&mut self) -> bool {
        if self.state != AppState::Results {
            return false;
        }
        self.enter_menu();
        true
    }

    /// Abandon whatever is going on and show the menu
    pub fn return_to_menu(&mut self) {
        self.enter_menu();
    }

    /// Tear down and stop audio
    pub fn shutdown(&mut self) {
        self.teardown();
        self.pending = None;
        self.audio.shutdown();
        log::info!("Controller shut down");
    }

    /// Release the live session. Safe to call any number of times.
    pub fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
    }

    // === Internals ===

    fn sprite_size(&self) -> (u32, u32) {
        (self.settings.sprite_size, self.settings.sprite_size)
    }

    fn poll_classification(&mut self, dt_ms: u64) {
        let polled = match self.pending.as_ref() {
            Some(rx) => rx.try_recv(),
            None => Err(TryRecvError::Disconnected),
        };
        match polled {
            Ok(result) => self.finish_loading(result),
            Err(TryRecvError::Disconnected) => self.finish_loading(Err(ClassifyError::TaskLost)),
            Err(TryRecvError::Empty) => {
                self.loading_ms += dt_ms;
                if self.loading_ms > self.settings.classifier_timeout_ms {
                    self.finish_loading(Err(ClassifyError::Timeout(self.loading_ms)));
                }
            }
        }
    }

    fn finish_loading(&mut self, result: Classified) {
        // Dropping the receiver disowns any late answer
        self.pending = None;
        match result {
            Ok(descriptor) => self.start_game(descriptor),
            Err(e) => {
                log::warn!("Classification failed: {e}");
                self.enter_menu();
                self.last_error = Some(e);
            }
        }
    }

    fn start_game(&mut self, descriptor: ScenarioDescriptor) {
        self.teardown();
        self.results = None;

        let sprite = self.textures.get_image(&descriptor.ent_b, self.sprite_size());
        let seed = self.seeds.random();
        self.theme = Theme::for_sentiment(descriptor.sentiment);
        self.audio.play_cue(Cue::Start);
        self.audio.set_mode(music_for(&descriptor));

        self.session = Some(GameSession::start(descriptor.clone(), &self.settings, sprite, seed));
        self.last_descriptor = Some(descriptor);
        self.state = AppState::Playing;
    }

    fn check_finished(&mut self) {
        let finished = self.session.as_ref().is_some_and(|s| s.is_finished());
        if finished {
            self.enter_results();
        }
    }

    fn enter_results(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let mode = session.mode();
        let score = session.score();
        session.teardown();

        let update = self.scores.update(mode, score);
        let cue = if update.is_new_record {
            ResultCue::NewRecord
        } else if score > self.settings.good_score_threshold {
            ResultCue::Good
        } else {
            ResultCue::Fail
        };

        self.audio.set_mode(MusicMode::Silence);
        self.audio.play_cue(cue.audio());

        let summary = ResultsSummary {
            mode,
            score,
            best: update.best,
            is_new_record: update.is_new_record,
            grade: Grade::for_score(mode, score),
            cue,
        };
        log::info!(
            "Results: {} scored {score} (best {}, grade {}{})",
            mode.as_str(),
            summary.best,
            summary.grade.as_str(),
            if summary.is_new_record { ", new record" } else { "" }
        );
        self.results = Some(summary);
        self.state = AppState::Results;
    }

    fn enter_menu(&mut self) {
        self.teardown();
        self.pending = None;
        self.results = None;
        self.theme = Theme::NEUTRAL;
        self.audio.set_mode(Theme::NEUTRAL.music);
        self.state = AppState::Menu;
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}
