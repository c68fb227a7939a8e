//! Collector: grab short-lived targets before they vanish

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{COUNTDOWN_MS, Countdown, InputBinding, InputEvent, MiniGame, label_or, random_between};
use crate::scenario::ScenarioDescriptor;
use crate::sim::collision::nearest_to_point;
use crate::sim::scheduler::{Periodic, TickKind};

pub const SPAWN_MS: u64 = 800;
/// Ageing tick for target lifetimes
pub const AGE_MS: u64 = 50;
pub const TARGET_RADIUS: f32 = 15.0;
/// Untouched targets vanish after this long
pub const TARGET_TTL_MS: u64 = 1500;
const SPAWN_MARGIN: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorTarget {
    pub id: u32,
    pub center: Vec2,
    /// Time left before the target vanishes
    pub ttl_ms: u64,
}

#[derive(Debug)]
pub struct Collector {
    field: Vec2,
    rng: Pcg32,
    targets: Vec<CollectorTarget>,
    next_id: u32,
    collected: u32,
    countdown: Countdown,
    finished: bool,
    goal: String,
}

impl Collector {
    pub fn new(field: Vec2, seed: u64) -> Self {
        Self {
            field,
            rng: Pcg32::seed_from_u64(seed),
            targets: Vec::new(),
            next_id: 1,
            collected: 0,
            countdown: Countdown::new(super::ROUND_SECONDS),
            finished: false,
            goal: String::new(),
        }
    }

    pub fn targets(&self) -> &[CollectorTarget] {
        &self.targets
    }

    fn spawn(&mut self) {
        let center = Vec2::new(
            random_between(&mut self.rng, SPAWN_MARGIN, self.field.x - SPAWN_MARGIN),
            random_between(&mut self.rng, SPAWN_MARGIN, self.field.y - SPAWN_MARGIN),
        );
        let id = self.next_id;
        self.next_id += 1;
        self.targets.push(CollectorTarget {
            id,
            center,
            ttl_ms: TARGET_TTL_MS,
        });
    }

    fn age(&mut self) {
        self.targets.retain_mut(|t| {
            t.ttl_ms = t.ttl_ms.saturating_sub(AGE_MS);
            t.ttl_ms > 0
        });
    }

    /// Take the target nearest to the pointer, wherever it is
    fn collect(&mut self, at: Vec2) {
        let nearest = nearest_to_point(
            at,
            self.targets.iter().enumerate().map(|(i, t)| (i, t.center)),
        );
        if let Some(index) = nearest {
            self.targets.remove(index);
            self.collected += 1;
        }
    }
}

impl MiniGame for Collector {
    fn start(&mut self, descriptor: &ScenarioDescriptor, duration_secs: u32) {
        self.targets.clear();
        self.collected = 0;
        self.finished = false;
        self.countdown = Countdown::new(duration_secs);
        self.goal = format!("COLLECT: {}", label_or(&descriptor.ent_a, "ITEM"));
    }

    fn schedule(&self) -> Vec<Periodic> {
        vec![
            Periodic::every(TickKind::Move, AGE_MS),
            Periodic::every(TickKind::Spawn, SPAWN_MS).starting_now(),
            Periodic::every(TickKind::Countdown, COUNTDOWN_MS),
        ]
    }

    fn on_tick(&mut self, kind: TickKind) {
        if self.finished {
            return;
        }
        match kind {
            TickKind::Spawn => self.spawn(),
            TickKind::Move => self.age(),
            TickKind::Countdown => {
                if self.countdown.tick() {
                    self.finished = true;
                }
            }
            TickKind::Particles => {}
        }
    }

    fn on_input(&mut self, event: InputEvent) {
        if self.finished {
            return;
        }
        if let InputEvent::Click(at) = event {
            self.collect(at);
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn final_score(&self) -> f64 {
        self.collected as f64
    }

    fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    fn describe_goal(&self) -> String {
        self.goal.clone()
    }

    fn bindings(&self) -> &'static [InputBinding] {
        &[InputBinding::Click]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{GameMode, Sentiment};

    fn started() -> Collector {
        let mut game = Collector::new(Vec2::new(600.0, 400.0), 5);
        let d = ScenarioDescriptor::new(
            GameMode::Collector,
            "gather",
            "coins",
            "",
            Sentiment::Positive,
        );
        game.start(&d, 30);
        game
    }

    #[test]
    fn test_goal_text() {
        assert_eq!(started().describe_goal(), "COLLECT: COINS");
    }

    #[test]
    fn test_spawn_inside_margins() {
        let mut game = started();
        for _ in 0..100 {
            game.on_tick(TickKind::Spawn);
        }
        for t in game.targets() {
            assert!((20.0..=580.0).contains(&t.center.x));
            assert!((20.0..=380.0).contains(&t.center.y));
        }
    }

    #[test]
    fn test_targets_expire_after_ttl() {
        let mut game = started();
        game.on_tick(TickKind::Spawn);
        for _ in 0..29 {
            game.on_tick(TickKind::Move);
        }
        assert_eq!(game.targets().len(), 1);
        game.on_tick(TickKind::Move);
        assert!(game.targets().is_empty());
        assert_eq!(game.final_score(), 0.0);
    }

    #[test]
    fn test_click_takes_nearest_target() {
        let mut game = started();
        game.targets = vec![
            CollectorTarget {
                id: 1,
                center: Vec2::new(100.0, 100.0),
                ttl_ms: 1500,
            },
            CollectorTarget {
                id: 2,
                center: Vec2::new(400.0, 300.0),
                ttl_ms: 1500,
            },
        ];
        // Far from both, but closer to the second
        game.on_input(InputEvent::Click(Vec2::new(500.0, 390.0)));
        assert_eq!(game.final_score(), 1.0);
        assert_eq!(game.targets().len(), 1);
        assert_eq!(game.targets()[0].id, 1);
    }

    #[test]
    fn test_click_with_nothing_on_screen() {
        let mut game = started();
        game.on_input(InputEvent::Click(Vec2::new(10.0, 10.0)));
        assert_eq!(game.final_score(), 0.0);
    }
}
