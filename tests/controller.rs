//! End-to-end flows through the session controller

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use scenario_arcade::assets::{Image, ImageProvider, TextureCache};
use scenario_arcade::audio::{AudioSink, Cue, MusicMode};
use scenario_arcade::sim::modes::{InputEvent, ModeEngine};
use scenario_arcade::theme::Theme;
use scenario_arcade::{
    AppState, AssetError, ClassifyError, GameMode, Grade, HighScores, ResultCue,
    ScenarioClassifier, ScenarioDescriptor, ScoreRepository, ScoreUpdate, SessionController,
    Sentiment, Settings,
};

const BUDGET: Duration = Duration::from_secs(5);

struct Fixed {
    answer: String,
    delay: Duration,
}

impl Fixed {
    fn json(json: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: json.to_string(),
            delay: Duration::ZERO,
        })
    }

    fn slow(json: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: json.to_string(),
            delay,
        })
    }
}

impl ScenarioClassifier for Fixed {
    fn analyze(&self, _text: &str) -> Result<ScenarioDescriptor, ClassifyError> {
        thread::sleep(self.delay);
        ScenarioDescriptor::from_json(&self.answer)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Sound {
    Mode(MusicMode),
    Cue(Cue),
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Sound>>>);

impl Recorder {
    fn take(&self) -> Vec<Sound> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl AudioSink for Recorder {
    fn set_mode(&mut self, mode: MusicMode) {
        self.0.lock().unwrap().push(Sound::Mode(mode));
    }

    fn play_cue(&mut self, cue: Cue) {
        self.0.lock().unwrap().push(Sound::Cue(cue));
    }
}

/// Shared view of the store so tests can inspect it after the controller owns it
#[derive(Clone, Default)]
struct SharedScores(Arc<Mutex<HighScores>>);

impl ScoreRepository for SharedScores {
    fn best(&self, mode: GameMode) -> f64 {
        self.0.lock().unwrap().best(mode)
    }

    fn update(&mut self, mode: GameMode, score: f64) -> ScoreUpdate {
        self.0.lock().unwrap().update(mode, score)
    }
}

struct CountingImages(Arc<AtomicUsize>);

impl ImageProvider for CountingImages {
    fn fetch(&self, keyword: &str, size: (u32, u32)) -> Result<Image, AssetError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Image {
            keyword: keyword.to_string(),
            width: size.0,
            height: size.1,
            bytes: vec![0; 4],
        })
    }
}

struct Rig {
    controller: SessionController,
    audio: Recorder,
    scores: SharedScores,
    fetches: Arc<AtomicUsize>,
}

fn rig_with(classifier: Arc<dyn ScenarioClassifier>, settings: Settings) -> Rig {
    let audio = Recorder::default();
    let scores = SharedScores::default();
    let fetches = Arc::new(AtomicUsize::new(0));
    let textures = Arc::new(TextureCache::new(CountingImages(fetches.clone())));
    let controller = SessionController::new(
        settings,
        classifier,
        textures,
        Box::new(audio.clone()),
        Box::new(scores.clone()),
    );
    Rig {
        controller,
        audio,
        scores,
        fetches,
    }
}

fn seeded() -> Settings {
    Settings {
        seed: Some(17),
        ..Settings::default()
    }
}

const SHOOTER_JSON: &str =
    r#"{"mode":"SHOOTER","verb":"FIGHT","ent_a":"Hero","ent_b":"Zombie","sentiment":"NEGATIVE"}"#;

fn play_to_end(controller: &mut SessionController) {
    for _ in 0..40 {
        if controller.state() != AppState::Playing {
            break;
        }
        controller.update(1000);
    }
}

fn first_shooter_target(controller: &SessionController) -> glam::Vec2 {
    match controller.session().map(|s| s.engine()) {
        Some(ModeEngine::Shooter(game)) => game.targets()[0].rect.center(),
        _ => panic!("no shooter session"),
    }
}

#[test]
fn test_shooter_round_end_to_end() {
    let mut rig = rig_with(Fixed::json(SHOOTER_JSON), seeded());
    assert_eq!(rig.controller.state(), AppState::Menu);

    assert!(rig.controller.submit("Fight the zombie horde"));
    assert_eq!(rig.controller.state(), AppState::Loading);
    assert_eq!(rig.controller.await_classification(BUDGET), AppState::Playing);
    assert_eq!(rig.controller.theme(), &Theme::NEGATIVE);

    let session = rig.controller.session().unwrap();
    assert_eq!(session.goal(), "MISSION: FIGHT THE ZOMBIES");
    assert!(!session.sprite().is_placeholder());
    // Prefetched during loading, served from cache at game start
    assert_eq!(rig.fetches.load(Ordering::SeqCst), 1);

    // First target appears at t=0
    rig.controller.update(0);
    let at = first_shooter_target(&rig.controller);
    rig.controller.input(InputEvent::Click(at));
    let session = rig.controller.session().unwrap();
    assert_eq!(session.score(), 1.0);
    assert_eq!(session.particles().len(), 8);

    play_to_end(&mut rig.controller);
    assert_eq!(rig.controller.state(), AppState::Results);
    assert!(rig.controller.session().is_none());

    let results = rig.controller.results().unwrap();
    assert_eq!(results.mode, GameMode::Shooter);
    assert_eq!(results.score, 1.0);
    assert!(results.is_new_record);
    assert_eq!(results.cue, ResultCue::NewRecord);
    assert_eq!(results.grade, Grade::C);
    assert_eq!(rig.scores.best(GameMode::Shooter), 1.0);

    assert_eq!(
        rig.audio.take(),
        vec![
            Sound::Cue(Cue::Start),
            Sound::Mode(MusicMode::Action),
            Sound::Mode(MusicMode::Silence),
            Sound::Cue(Cue::Win),
        ]
    );
}

#[test]
fn test_replay_reuses_descriptor() {
    let mut rig = rig_with(Fixed::json(SHOOTER_JSON), seeded());
    rig.controller.submit("Fight");
    rig.controller.await_classification(BUDGET);
    rig.controller.update(0);
    let at = first_shooter_target(&rig.controller);
    rig.controller.input(InputEvent::Click(at));
    play_to_end(&mut rig.controller);
    rig.audio.take();

    assert!(rig.controller.replay());
    assert_eq!(rig.controller.state(), AppState::Playing);
    assert_eq!(rig.controller.session().unwrap().time_remaining(), 30);
    assert!(rig.controller.results().is_none());

    play_to_end(&mut rig.controller);
    let results = rig.controller.results().unwrap();
    assert_eq!(results.score, 0.0);
    assert_eq!(results.best, 1.0);
    assert!(!results.is_new_record);
    assert_eq!(results.cue, ResultCue::Fail);
    assert_eq!(rig.audio.take().last(), Some(&Sound::Cue(Cue::GameOver)));

    assert!(rig.controller.new_scenario());
    assert_eq!(rig.controller.state(), AppState::Menu);
    assert_eq!(rig.controller.theme(), &Theme::NEUTRAL);
    assert!(!rig.controller.replay());
}

#[test]
fn test_good_score_without_record_plays_win() {
    let json = r#"{"mode":"RESOURCE","verb":"","ent_a":"","ent_b":"Reactor","sentiment":"POSITIVE"}"#;
    let mut rig = rig_with(Fixed::json(json), seeded());
    rig.scores.0.lock().unwrap().update(GameMode::Resource, 1000.0);

    rig.controller.submit("Balance the reactor");
    rig.controller.await_classification(BUDGET);
    assert_eq!(rig.audio.take()[1], Sound::Mode(MusicMode::Arpeggio));

    // Hold the gauge in the band by steering back toward 50
    for _ in 0..(30_000 / 200) {
        let value = match rig.controller.session().map(|s| s.engine()) {
            Some(ModeEngine::Resource(game)) => game.value(),
            _ => break,
        };
        if value < 45 {
            rig.controller.input(InputEvent::Grow);
        } else if value > 55 {
            rig.controller.input(InputEvent::Reduce);
        }
        rig.controller.update(200);
    }
    play_to_end(&mut rig.controller);

    let results = rig.controller.results().unwrap();
    assert!((results.score - 30.0).abs() < 1e-9, "score {}", results.score);
    assert!(!results.is_new_record);
    assert_eq!(results.cue, ResultCue::Good);
    assert_eq!(rig.audio.take().last(), Some(&Sound::Cue(Cue::Win)));
}

#[test]
fn test_blank_submit_is_ignored() {
    let mut rig = rig_with(Fixed::json(SHOOTER_JSON), seeded());
    assert!(!rig.controller.submit("   "));
    assert_eq!(rig.controller.state(), AppState::Menu);
}

#[test]
fn test_invalid_descriptor_returns_to_menu() {
    let json = r#"{"mode":"RACING","sentiment":"POSITIVE"}"#;
    let mut rig = rig_with(Fixed::json(json), seeded());
    rig.controller.submit("Race the cars");
    assert_eq!(rig.controller.await_classification(BUDGET), AppState::Menu);
    assert!(matches!(
        rig.controller.last_error(),
        Some(ClassifyError::InvalidDescriptor(_))
    ));
    assert!(rig.controller.session().is_none());

    // The menu accepts a new scenario afterwards
    assert!(rig.controller.submit("Again"));
}

#[test]
fn test_update_times_out_slow_classifier() {
    let settings = Settings {
        classifier_timeout_ms: 100,
        ..seeded()
    };
    let mut rig = rig_with(Fixed::slow(SHOOTER_JSON, Duration::from_millis(500)), settings);
    rig.controller.submit("Fight");
    rig.controller.update(60);
    assert_eq!(rig.controller.state(), AppState::Loading);
    rig.controller.update(60);
    assert_eq!(rig.controller.state(), AppState::Menu);
    assert!(matches!(rig.controller.last_error(), Some(ClassifyError::Timeout(_))));

    // The late answer has nowhere to go
    thread::sleep(Duration::from_millis(600));
    rig.controller.update(16);
    assert_eq!(rig.controller.state(), AppState::Menu);
}

#[test]
fn test_await_budget_expires() {
    let mut rig = rig_with(Fixed::slow(SHOOTER_JSON, Duration::from_millis(500)), seeded());
    rig.controller.submit("Fight");
    let state = rig.controller.await_classification(Duration::from_millis(20));
    assert_eq!(state, AppState::Menu);
    assert!(matches!(rig.controller.last_error(), Some(ClassifyError::Timeout(20))));
}

#[test]
fn test_input_outside_play_is_ignored() {
    let mut rig = rig_with(Fixed::json(SHOOTER_JSON), seeded());
    rig.controller.input(InputEvent::Click(glam::Vec2::ZERO));
    rig.controller.update(1000);
    assert_eq!(rig.controller.state(), AppState::Menu);
}

#[test]
fn test_teardown_is_idempotent() {
    let mut rig = rig_with(Fixed::json(SHOOTER_JSON), seeded());
    rig.controller.submit("Fight");
    rig.controller.await_classification(BUDGET);
    rig.controller.update(2500);

    rig.controller.return_to_menu();
    rig.controller.teardown();
    rig.controller.teardown();
    assert_eq!(rig.controller.state(), AppState::Menu);
    assert!(rig.controller.session().is_none());
    assert!(rig.controller.results().is_none());
    // Abandoned rounds are not scored
    assert_eq!(rig.scores.best(GameMode::Shooter), 0.0);

    rig.controller.shutdown();
    rig.controller.shutdown();
}

#[test]
fn test_connector_goal_ends_round_on_input() {
    let json = r#"{"mode":"CONNECTOR","verb":"LINK","ent_a":"Plug","ent_b":"Socket","sentiment":"POSITIVE"}"#;
    let mut rig = rig_with(Fixed::json(json), seeded());
    rig.controller.submit("Connect the plug to the socket");
    rig.controller.await_classification(BUDGET);

    let layout = match rig.controller.session().map(|s| s.engine()) {
        Some(ModeEngine::Connector(game)) => game.layout().clone(),
        _ => panic!("no connector session"),
    };
    rig.controller.input(InputEvent::PointerMove(layout.start.center()));
    rig.controller.update(2000);
    for p in &layout.path {
        rig.controller.input(InputEvent::PointerMove(*p));
    }

    assert_eq!(rig.controller.state(), AppState::Results);
    let results = rig.controller.results().unwrap();
    assert_eq!(results.score, 28.0);
    assert!(results.is_new_record);
}

#[test]
fn test_descriptor_mode_picks_engine() {
    for mode in GameMode::ALL {
        let json = serde_json::json!({
            "mode": mode.as_str(),
            "sentiment": "POSITIVE",
        })
        .to_string();
        let mut rig = rig_with(Fixed::json(&json), seeded());
        rig.controller.submit("anything");
        rig.controller.await_classification(BUDGET);
        let session = rig.controller.session().unwrap();
        assert_eq!(session.engine().mode(), mode);
        assert_eq!(session.descriptor().sentiment, Sentiment::Positive);
    }
}
