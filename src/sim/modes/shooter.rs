//! Shooter: click falling targets before they leave the field

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{
    COUNTDOWN_MS, Countdown, GameEvent, InputBinding, InputEvent, MiniGame, label_or,
    random_between,
};
use crate::scenario::ScenarioDescriptor;
use crate::sim::collision::Rect;
use crate::sim::scheduler::{Periodic, TickKind};

pub const SPAWN_MS: u64 = 1000;
pub const MOVE_MS: u64 = 50;
/// Target edge length
pub const TARGET_SIZE: f32 = 40.0;
/// Pixels a target falls per move tick
pub const FALL_STEP: f32 = 5.0;
/// Keep spawn columns this far from the side walls
const SPAWN_MARGIN: f32 = 30.0;

/// A falling target
#[derive(Debug, Clone, PartialEq)]
pub struct ShooterTarget {
    pub id: u32,
    pub rect: Rect,
    /// Entity name shown on the target
    pub label: String,
}

#[derive(Debug)]
pub struct Shooter {
    field: Vec2,
    rng: Pcg32,
    /// Oldest first; later entries are drawn on top
    targets: Vec<ShooterTarget>,
    next_id: u32,
    hits: u32,
    countdown: Countdown,
    finished: bool,
    label: String,
    goal: String,
    events: Vec<GameEvent>,
}

impl Shooter {
    pub fn new(field: Vec2, seed: u64) -> Self {
        Self {
            field,
            rng: Pcg32::seed_from_u64(seed),
            targets: Vec::new(),
            next_id: 1,
            hits: 0,
            countdown: Countdown::new(super::ROUND_SECONDS),
            finished: false,
            label: String::new(),
            goal: String::new(),
            events: Vec::new(),
        }
    }

    pub fn targets(&self) -> &[ShooterTarget] {
        &self.targets
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    fn spawn(&mut self) {
        let x = random_between(&mut self.rng, SPAWN_MARGIN, self.field.x - SPAWN_MARGIN);
        let id = self.next_id;
        self.next_id += 1;
        self.targets.push(ShooterTarget {
            id,
            rect: Rect::from_origin(
                Vec2::new(x - TARGET_SIZE / 2.0, 0.0),
                Vec2::splat(TARGET_SIZE),
            ),
            label: self.label.clone(),
        });
    }

    fn advance(&mut self) {
        let floor = self.field.y;
        for target in &mut self.targets {
            target.rect.translate(Vec2::new(0.0, FALL_STEP));
        }
        // Escaped targets cost nothing
        self.targets.retain(|t| t.rect.max.y <= floor);
    }

    fn shoot(&mut self, at: Vec2) {
        let Some(index) = self.targets.iter().rposition(|t| t.rect.contains(at)) else {
            return;
        };
        let target = self.targets.remove(index);
        self.hits += 1;
        self.events.push(GameEvent::Burst { at });
        log::debug!("Shooter hit target {} ({} hits)", target.id, self.hits);
    }
}

impl MiniGame for Shooter {
    fn start(&mut self, descriptor: &ScenarioDescriptor, duration_secs: u32) {
        self.targets.clear();
        self.events.clear();
        self.hits = 0;
        self.finished = false;
        self.countdown = Countdown::new(duration_secs);
        self.label = label_or(&descriptor.ent_b, "TARGET");
        self.goal = format!(
            "MISSION: {} THE {}S",
            label_or(&descriptor.verb, "ELIMINATE"),
            self.label
        );
    }

    fn schedule(&self) -> Vec<Periodic> {
        vec![
            Periodic::every(TickKind::Move, MOVE_MS),
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
            TickKind::Move => self.advance(),
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
            self.shoot(at);
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn final_score(&self) -> f64 {
        self.hits as f64
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

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
