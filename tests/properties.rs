//! Property-based tests for the game runtime.

use glam::Vec2;
use proptest::prelude::*;

use scenario_arcade::assets::Sprite;
use scenario_arcade::sim::collision::{nearest_to_edge, nearest_to_point};
use scenario_arcade::sim::modes::{Connector, InputEvent, MiniGame, connector};
use scenario_arcade::sim::particles::{PARTICLE_LIFE, ParticleSystem};
use scenario_arcade::sim::scheduler::TickKind;
use scenario_arcade::{
    GameMode, GameSession, HighScores, ScenarioDescriptor, ScoreRepository, Sentiment, Settings,
};

const FIELD: Vec2 = Vec2::new(600.0, 400.0);

/// Strategy: any game mode.
fn mode_strategy() -> impl Strategy<Value = GameMode> {
    prop::sample::select(GameMode::ALL.to_vec())
}

/// Strategy: a point somewhere on (or just off) the playfield.
fn point_strategy() -> impl Strategy<Value = Vec2> {
    (-20.0f32..620.0, -20.0f32..420.0).prop_map(|(x, y)| Vec2::new(x, y))
}

/// Strategy: any player input.
fn input_strategy() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        point_strategy().prop_map(InputEvent::Click),
        point_strategy().prop_map(InputEvent::PointerMove),
        Just(InputEvent::Left),
        Just(InputEvent::Right),
        Just(InputEvent::Grow),
        Just(InputEvent::Reduce),
    ]
}

/// Strategy: a script of (delay before input in ms, input).
fn script_strategy() -> impl Strategy<Value = Vec<(u64, InputEvent)>> {
    prop::collection::vec((0u64..700, input_strategy()), 0..80)
}

fn start(mode: GameMode, seed: u64) -> GameSession {
    let d = ScenarioDescriptor::new(mode, "", "Alpha", "Beta", Sentiment::Negative);
    GameSession::start(d, &Settings::default(), Sprite::Placeholder, seed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // 1. Scores stay non-negative and the clock never runs backwards
    #[test]
    fn score_and_clock_monotone(mode in mode_strategy(), seed in any::<u64>(), script in script_strategy()) {
        let mut session = start(mode, seed);
        let mut last_time = session.time_remaining();
        for (delay, event) in script {
            session.advance(delay);
            session.on_input(event);
            prop_assert!(session.score() >= 0.0);
            prop_assert!(session.time_remaining() <= last_time);
            last_time = session.time_remaining();
        }
    }

    // 2. Every clock-driven mode ends within the round
    #[test]
    fn rounds_end_by_thirty_seconds(mode in mode_strategy(), seed in any::<u64>(), script in script_strategy()) {
        prop_assume!(mode != GameMode::Connector);
        let mut session = start(mode, seed);
        for (delay, event) in script {
            session.advance(delay.min(200));
            session.on_input(event);
        }
        let left = 30_000u64.saturating_sub(session.elapsed_ms());
        session.advance(left);
        prop_assert!(session.is_finished());
        prop_assert!(!session.is_running());
    }

    // 3. A finished round ignores everything afterwards
    #[test]
    fn finished_round_is_frozen(mode in mode_strategy(), seed in any::<u64>(), script in script_strategy()) {
        prop_assume!(mode != GameMode::Connector);
        let mut session = start(mode, seed);
        session.advance(30_000);
        let score = session.score();
        let left = session.time_remaining();
        for (delay, event) in script {
            session.advance(delay);
            session.on_input(event);
        }
        prop_assert_eq!(session.score(), score);
        prop_assert_eq!(session.time_remaining(), left);
    }

    // 4. The store keeps the running maximum and flags strict improvements only
    #[test]
    fn score_store_keeps_maximum(quarters in prop::collection::vec(0u32..400, 1..30)) {
        // Quarter steps survive the JSON round trip exactly
        let scores: Vec<f64> = quarters.iter().map(|q| *q as f64 / 4.0).collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let mut store = HighScores::open(&path);
        let mut best = 0.0f64;
        for s in &scores {
            let update = store.update(GameMode::Collector, *s);
            prop_assert_eq!(update.is_new_record, *s > best);
            best = best.max(*s);
            prop_assert_eq!(update.best, best);
        }
        let reopened = HighScores::open(&path);
        prop_assert_eq!(reopened.best(GameMode::Collector), best);
        prop_assert_eq!(reopened.best(GameMode::Shooter), 0.0);
    }

    // 5. Connector time only moves by one-second ticks or three-second penalties
    #[test]
    fn connector_time_steps(seed in any::<u64>(), moves in prop::collection::vec((point_strategy(), any::<bool>()), 1..120)) {
        let d = ScenarioDescriptor::new(GameMode::Connector, "", "", "", Sentiment::Positive);
        let mut game = Connector::new(FIELD, seed);
        game.start(&d, 30);
        for (at, tick) in moves {
            let before = game.time_remaining();
            let was_active = game.is_active();
            let was_finished = game.is_finished();
            if tick {
                game.on_tick(TickKind::Countdown);
                let expected = if was_active && !was_finished { before.saturating_sub(1) } else { before };
                prop_assert_eq!(game.time_remaining(), expected);
            } else {
                let penalties = game.penalties();
                game.on_input(InputEvent::PointerMove(at));
                if game.penalties() > penalties {
                    prop_assert!(was_active);
                    prop_assert!(!game.is_active());
                    prop_assert_eq!(game.time_remaining(), before.saturating_sub(connector::PENALTY_SECS));
                } else {
                    prop_assert_eq!(game.time_remaining(), before);
                }
            }
            if game.is_finished() && !game.reached_goal() {
                prop_assert_eq!(game.final_score(), 0.0);
            }
        }
    }

    // 6. Particles never outlive their lifespan
    #[test]
    fn particles_expire(seed in any::<u64>(), bursts in prop::collection::vec(point_strategy(), 1..20)) {
        let mut particles = ParticleSystem::new(64, seed);
        for at in bursts {
            particles.burst(at, 8);
            prop_assert!(particles.len() <= 64);
        }
        for _ in 0..PARTICLE_LIFE {
            particles.tick();
        }
        prop_assert!(particles.is_empty());
    }

    // 7. Nearest-point lookup really is the nearest
    #[test]
    fn nearest_point_is_minimal(at in point_strategy(), points in prop::collection::vec(point_strategy(), 1..20)) {
        let index = nearest_to_point(at, points.iter().copied().enumerate()).unwrap();
        let best = points[index].distance(at);
        prop_assert!(points.iter().all(|p| p.distance(at) >= best));
    }

    // 8. Nearest-to-edge picks the item closest to the floor
    #[test]
    fn nearest_edge_is_minimal(ys in prop::collection::vec(0.0f32..400.0, 1..20)) {
        let index = nearest_to_edge(400.0, ys.iter().copied().enumerate()).unwrap();
        prop_assert!(ys.iter().all(|y| *y <= ys[index]));
    }
}
