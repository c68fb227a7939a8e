//! Scenario Arcade headless runner
//!
//! Classifies a scenario with a local keyword table, lets the autopilot play
//! the resulting game in simulated time and prints the results.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scenario_arcade::assets::{DirectoryImages, Image, ImageProvider, TextureCache};
use scenario_arcade::audio::{AudioEngine, AudioSink, LogTone, NullAudio};
use scenario_arcade::autopilot::Autopilot;
use scenario_arcade::{
    AppState, AssetError, ClassifyError, HighScores, ScenarioClassifier, ScenarioDescriptor,
    SessionController, Settings,
};

/// Simulated frame length
const FRAME_MS: u64 = 16;

/// Verb keyword -> mode name
const MODE_KEYWORDS: &[(&str, &str)] = &[
    ("shoot", "SHOOTER"),
    ("fight", "SHOOTER"),
    ("destroy", "SHOOTER"),
    ("zap", "SHOOTER"),
    ("balance", "RESOURCE"),
    ("manage", "RESOURCE"),
    ("maintain", "RESOURCE"),
    ("sort", "SORTER"),
    ("separate", "SORTER"),
    ("classify", "SORTER"),
    ("avoid", "DODGER"),
    ("dodge", "DODGER"),
    ("escape", "DODGER"),
    ("survive", "DODGER"),
    ("collect", "COLLECTOR"),
    ("gather", "COLLECTOR"),
    ("catch", "COLLECTOR"),
    ("connect", "CONNECTOR"),
    ("guide", "CONNECTOR"),
    ("deliver", "CONNECTOR"),
];

const NEGATIVE_WORDS: &[&str] = &[
    "zombie", "monster", "virus", "fire", "war", "enemy", "dark", "storm", "attack", "escape",
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "to", "from", "of", "and", "in", "on", "with", "into",
];

/// Offline stand-in for a language-model classifier
struct KeywordClassifier;

impl KeywordClassifier {
    fn words(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

impl ScenarioClassifier for KeywordClassifier {
    fn analyze(&self, text: &str) -> Result<ScenarioDescriptor, ClassifyError> {
        let words = Self::words(text);
        let (verb_index, mode) = words
            .iter()
            .enumerate()
            .find_map(|(i, w)| {
                MODE_KEYWORDS
                    .iter()
                    .find(|(k, _)| w.starts_with(k))
                    .map(|(_, mode)| (i, *mode))
            })
            .ok_or_else(|| ClassifyError::Unavailable(format!("no game idea for {text:?}")))?;

        let nouns: Vec<&String> = words
            .iter()
            .enumerate()
            .filter(|(i, w)| *i != verb_index && !STOP_WORDS.contains(&w.as_str()))
            .map(|(_, w)| w)
            .collect();
        let ent_a = nouns.first().map(|w| w.as_str()).unwrap_or("");
        let ent_b = nouns.last().map(|w| w.as_str()).unwrap_or("");
        let negative = words.iter().any(|w| NEGATIVE_WORDS.contains(&w.as_str()));

        // Same wire shape a remote classifier would send back
        let json = serde_json::json!({
            "mode": mode,
            "verb": words[verb_index],
            "ent_a": ent_a,
            "ent_b": ent_b,
            "sentiment": if negative { "NEGATIVE" } else { "POSITIVE" },
        });
        ScenarioDescriptor::from_json(&json.to_string())
    }
}

/// Image source when no asset folder is configured
struct NoImages;

impl ImageProvider for NoImages {
    fn fetch(&self, keyword: &str, _size: (u32, u32)) -> Result<Image, AssetError> {
        Err(AssetError::NotFound(keyword.to_string()))
    }
}

struct Args {
    settings: PathBuf,
    seed: Option<u64>,
    rounds: u32,
    mute: bool,
    scenario: String,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        settings: PathBuf::from("settings.json"),
        seed: None,
        rounds: 1,
        mute: false,
        scenario: String::new(),
    };
    let mut words = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--settings" => {
                i += 1;
                if i < args.len() {
                    parsed.settings = PathBuf::from(&args[i]);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    parsed.seed = Some(args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --seed value: {}", args[i]);
                        std::process::exit(1);
                    }));
                }
            }
            "--rounds" => {
                i += 1;
                if i < args.len() {
                    parsed.rounds = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --rounds value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--mute" => parsed.mute = true,
            "--help" | "-h" => {
                println!(
                    "Usage: scenario-arcade [--settings FILE] [--seed S] [--rounds N] [--mute] <scenario>"
                );
                println!();
                println!("Example: scenario-arcade \"Shoot the zombies attacking the base\"");
                std::process::exit(0);
            }
            other => words.push(other.to_string()),
        }
        i += 1;
    }
    parsed.scenario = words.join(" ");
    parsed
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args();
    if args.scenario.trim().is_empty() {
        eprintln!("No scenario given. Try --help.");
        std::process::exit(1);
    }

    let mut settings = Settings::load(&args.settings);
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    log::info!(
        "Scenario Arcade starting ({}x{} field)",
        settings.field_width,
        settings.field_height
    );

    let textures = Arc::new(match &settings.asset_dir {
        Some(dir) => TextureCache::new(DirectoryImages::new(dir)),
        None => TextureCache::new(NoImages),
    });
    let audio: Box<dyn AudioSink> = if args.mute {
        Box::new(NullAudio)
    } else {
        Box::new(AudioEngine::start(LogTone))
    };
    let scores = Box::new(HighScores::open(&settings.score_file));
    let timeout = Duration::from_millis(settings.classifier_timeout_ms);
    let field = settings.field();

    let mut controller =
        SessionController::new(settings, Arc::new(KeywordClassifier), textures, audio, scores);

    if !controller.submit(&args.scenario) {
        eprintln!("Could not start loading the scenario");
        std::process::exit(1);
    }
    if controller.await_classification(timeout) != AppState::Playing {
        let reason = controller
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".into());
        eprintln!("Classification failed: {reason}");
        controller.shutdown();
        std::process::exit(1);
    }

    let mut pilot = Autopilot::new(field);
    for round in 1..=args.rounds.max(1) {
        if round > 1 && !controller.replay() {
            break;
        }
        pilot.reset();
        if let Some(session) = controller.session() {
            println!("Round {round}: {}", session.goal());
        }

        while controller.state() == AppState::Playing {
            let events = match controller.session() {
                Some(session) => pilot.plan(session, FRAME_MS),
                None => Vec::new(),
            };
            for event in events {
                controller.input(event);
            }
            controller.update(FRAME_MS);
        }

        if let Some(results) = controller.results() {
            println!(
                "  {} score {:.1} | best {:.1} | grade {}{}",
                results.mode.as_str(),
                results.score,
                results.best,
                results.grade.as_str(),
                if results.is_new_record { " | NEW RECORD" } else { "" }
            );
        }
    }

    controller.shutdown();
}
