//! Dodger: keep the pointer marker away from bouncing enemies

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{COUNTDOWN_MS, Countdown, InputBinding, InputEvent, MiniGame, label_or, random_between};
use crate::scenario::ScenarioDescriptor;
use crate::sim::collision::{Rect, boxes_overlap};
use crate::sim::scheduler::{Periodic, TickKind};

pub const MOVE_MS: u64 = 30;
pub const ENEMY_COUNT: usize = 5;
pub const ENEMY_SIZE: f32 = 30.0;
pub const PLAYER_SIZE: f32 = 20.0;
/// Per-axis enemy speed in pixels per move tick
pub const ENEMY_SPEED: f32 = 4.0;
/// Spawn window for enemy top-left corners
const SPAWN_MIN: Vec2 = Vec2::new(50.0, 50.0);
const SPAWN_MAX: Vec2 = Vec2::new(500.0, 300.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub rect: Rect,
    pub vel: Vec2,
}

#[derive(Debug)]
pub struct Dodger {
    field: Vec2,
    rng: Pcg32,
    player: Rect,
    enemies: Vec<Enemy>,
    countdown: Countdown,
    finished: bool,
    survived: u32,
    caught: bool,
    goal: String,
}

impl Dodger {
    pub fn new(field: Vec2, seed: u64) -> Self {
        Self {
            field,
            rng: Pcg32::seed_from_u64(seed),
            player: Self::player_at(Vec2::splat(PLAYER_SIZE / 2.0)),
            enemies: Vec::new(),
            countdown: Countdown::new(super::ROUND_SECONDS),
            finished: false,
            survived: 0,
            caught: false,
            goal: String::new(),
        }
    }

    fn player_at(center: Vec2) -> Rect {
        Rect::from_center(center, Vec2::splat(PLAYER_SIZE))
    }

    pub fn player(&self) -> Rect {
        self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// True once an enemy touched the player
    pub fn was_caught(&self) -> bool {
        self.caught
    }

    fn spawn_enemies(&mut self) {
        self.enemies.clear();
        let max = SPAWN_MAX.min(self.field - Vec2::splat(ENEMY_SIZE));
        for id in 0..ENEMY_COUNT as u32 {
            let origin = Vec2::new(
                random_between(&mut self.rng, SPAWN_MIN.x, max.x),
                random_between(&mut self.rng, SPAWN_MIN.y, max.y),
            );
            let vel = Vec2::new(self.random_speed(), self.random_speed());
            self.enemies.push(Enemy {
                id,
                rect: Rect::from_origin(origin, Vec2::splat(ENEMY_SIZE)),
                vel,
            });
        }
    }

    fn random_speed(&mut self) -> f32 {
        if self.rng.random_bool(0.5) {
            ENEMY_SPEED
        } else {
            -ENEMY_SPEED
        }
    }

    fn advance(&mut self) {
        let field = self.field;
        for enemy in &mut self.enemies {
            enemy.rect.translate(enemy.vel);
            if enemy.rect.min.x <= 0.0 || enemy.rect.max.x >= field.x {
                enemy.vel.x = -enemy.vel.x;
            }
            if enemy.rect.min.y <= 0.0 || enemy.rect.max.y >= field.y {
                enemy.vel.y = -enemy.vel.y;
            }
            if boxes_overlap(&self.player, &enemy.rect) {
                self.caught = true;
                self.finished = true;
                self.survived = self.countdown.elapsed();
                log::debug!("Dodger caught by enemy {} after {}s", enemy.id, self.survived);
                return;
            }
        }
    }
}

impl MiniGame for Dodger {
    fn start(&mut self, descriptor: &ScenarioDescriptor, duration_secs: u32) {
        self.countdown = Countdown::new(duration_secs);
        self.finished = false;
        self.caught = false;
        self.survived = 0;
        self.player = Self::player_at(Vec2::splat(PLAYER_SIZE / 2.0));
        self.goal = format!("SURVIVE: AVOID {}", label_or(&descriptor.ent_b, "HAZARDS"));
        self.spawn_enemies();
    }

    fn schedule(&self) -> Vec<Periodic> {
        vec![
            Periodic::every(TickKind::Move, MOVE_MS),
            Periodic::every(TickKind::Countdown, COUNTDOWN_MS),
        ]
    }

    fn on_tick(&mut self, kind: TickKind) {
        if self.finished {
            return;
        }
        match kind {
            TickKind::Move => self.advance(),
            TickKind::Countdown => {
                if self.countdown.tick() {
                    self.finished = true;
                    self.survived = self.countdown.duration();
                }
            }
            TickKind::Spawn | TickKind::Particles => {}
        }
    }

    fn on_input(&mut self, event: InputEvent) {
        if self.finished {
            return;
        }
        if let InputEvent::PointerMove(at) = event {
            self.player = Self::player_at(at);
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whole seconds survived; the full round when never caught
    fn final_score(&self) -> f64 {
        if self.finished {
            self.survived as f64
        } else {
            self.countdown.elapsed() as f64
        }
    }

    fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    fn describe_goal(&self) -> String {
        self.goal.clone()
    }

    fn bindings(&self) -> &'static [InputBinding] {
        &[InputBinding::PointerMotion]
    }
}
