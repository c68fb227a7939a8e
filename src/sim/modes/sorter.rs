//! Sorter: send falling labels to the left or right bin

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{COUNTDOWN_MS, Countdown, InputBinding, InputEvent, MiniGame, name_or};
use crate::scenario::ScenarioDescriptor;
use crate::sim::collision::nearest_to_edge;
use crate::sim::scheduler::{Periodic, TickKind};

pub const SPAWN_MS: u64 = 1500;
pub const MOVE_MS: u64 = 50;
/// Pixels an item falls per move tick
pub const FALL_STEP: f32 = 3.0;
/// How long a sorted item stays visible with its verdict
pub const LINGER_MS: u64 = 200;

/// Which bin an item belongs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// First entity (`ent_a`)
    Left,
    /// Second entity (`ent_b`)
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// A falling label
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    pub id: u32,
    pub lane: Lane,
    pub label: String,
    pub pos: Vec2,
    /// Still falling and sortable
    pub active: bool,
    pub verdict: Option<Verdict>,
    linger_ms: u64,
}

#[derive(Debug)]
pub struct Sorter {
    field: Vec2,
    rng: Pcg32,
    items: Vec<SortItem>,
    next_id: u32,
    correct: u32,
    countdown: Countdown,
    finished: bool,
    /// Spawned item labels
    left_label: String,
    right_label: String,
    /// Short names for the goal header
    left_goal: String,
    right_goal: String,
}

impl Sorter {
    pub fn new(field: Vec2, seed: u64) -> Self {
        Self {
            field,
            rng: Pcg32::seed_from_u64(seed),
            items: Vec::new(),
            next_id: 1,
            correct: 0,
            countdown: Countdown::new(super::ROUND_SECONDS),
            finished: false,
            left_label: String::new(),
            right_label: String::new(),
            left_goal: String::new(),
            right_goal: String::new(),
        }
    }

    /// Falling and recently sorted items, oldest first
    pub fn items(&self) -> &[SortItem] {
        &self.items
    }

    pub fn labels(&self) -> (&str, &str) {
        (&self.left_label, &self.right_label)
    }

    fn spawn(&mut self) {
        let lane = if self.rng.random_bool(0.5) {
            Lane::Left
        } else {
            Lane::Right
        };
        let label = match lane {
            Lane::Left => self.left_label.clone(),
            Lane::Right => self.right_label.clone(),
        };
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(SortItem {
            id,
            lane,
            label,
            pos: Vec2::new(self.field.x / 2.0, 0.0),
            active: true,
            verdict: None,
            linger_ms: 0,
        });
    }

    fn advance(&mut self) {
        let floor = self.field.y;
        self.items.retain_mut(|item| {
            if item.active {
                item.pos.y += FALL_STEP;
                // Missed items just fall out
                item.pos.y <= floor
            } else {
                item.linger_ms = item.linger_ms.saturating_sub(MOVE_MS);
                item.linger_ms > 0
            }
        });
    }

    /// Whether `side` is a right answer for `label`. Equal names make both sides right.
    fn accepts(&self, side: Lane, label: &str) -> bool {
        match side {
            Lane::Left => label == self.left_label,
            Lane::Right => label == self.right_label,
        }
    }

    /// Resolve the lowest active item against the chosen side
    fn sort(&mut self, side: Lane) {
        let lowest = nearest_to_edge(
            self.field.y,
            self.items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.active)
                .map(|(index, item)| (index, item.pos.y)),
        );
        let Some(index) = lowest else {
            return;
        };

        let width = self.field.x;
        let verdict = if self.accepts(side, &self.items[index].label) {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
        let item = &mut self.items[index];
        item.active = false;
        item.verdict = Some(verdict);
        item.linger_ms = LINGER_MS;
        item.pos.x = match side {
            Lane::Left => width / 4.0,
            Lane::Right => width * 3.0 / 4.0,
        };
        if verdict == Verdict::Correct {
            self.correct += 1;
        }
    }
}

impl MiniGame for Sorter {
    fn start(&mut self, descriptor: &ScenarioDescriptor, duration_secs: u32) {
        self.items.clear();
        self.correct = 0;
        self.finished = false;
        self.countdown = Countdown::new(duration_secs);
        self.left_label = name_or(&descriptor.ent_a, "Category A");
        self.right_label = name_or(&descriptor.ent_b, "Category B");
        self.left_goal = name_or(&descriptor.ent_a, "A");
        self.right_goal = name_or(&descriptor.ent_b, "B");
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
        match event {
            InputEvent::Left => self.sort(Lane::Left),
            InputEvent::Right => self.sort(Lane::Right),
            _ => {}
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn final_score(&self) -> f64 {
        self.correct as f64
    }

    fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    fn describe_goal(&self) -> String {
        format!("SORT: {} (LEFT) vs {} (RIGHT)", self.left_goal, self.right_goal)
    }

    fn bindings(&self) -> &'static [InputBinding] {
        &[InputBinding::ArrowKeys]
    }
}
