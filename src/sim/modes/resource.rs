//! Resource: keep a drifting gauge inside the stable band

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::{COUNTDOWN_MS, Countdown, InputBinding, InputEvent, MiniGame, label_or};
use crate::scenario::ScenarioDescriptor;
use crate::sim::scheduler::{Periodic, TickKind};

pub const DRIFT_MS: u64 = 200;
pub const VALUE_MIN: i32 = 0;
pub const VALUE_MAX: i32 = 100;
pub const VALUE_START: i32 = 50;
/// Inclusive stable band
pub const STABLE_LOW: i32 = 40;
pub const STABLE_HIGH: i32 = 60;
/// Score credited per drift tick spent in the band
pub const STABLE_CREDIT: f64 = 0.2;
/// Size of one Grow/Reduce press
pub const NUDGE: i32 = 10;
const DRIFT_STEPS: [i32; 3] = [-1, 0, 1];

#[derive(Debug)]
pub struct Resource {
    rng: Pcg32,
    value: i32,
    stable_ticks: u32,
    countdown: Countdown,
    finished: bool,
    goal: String,
}

impl Resource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            value: VALUE_START,
            stable_ticks: 0,
            countdown: Countdown::new(super::ROUND_SECONDS),
            finished: false,
            goal: String::new(),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn is_stable(&self) -> bool {
        (STABLE_LOW..=STABLE_HIGH).contains(&self.value)
    }

    fn shift(&mut self, delta: i32) {
        self.value = (self.value + delta).clamp(VALUE_MIN, VALUE_MAX);
    }

    fn drift(&mut self) {
        let step = *DRIFT_STEPS.choose(&mut self.rng).unwrap_or(&0);
        self.shift(step);
        if self.is_stable() {
            self.stable_ticks += 1;
        }
    }
}

impl MiniGame for Resource {
    fn start(&mut self, descriptor: &ScenarioDescriptor, duration_secs: u32) {
        self.value = VALUE_START;
        self.stable_ticks = 0;
        self.finished = false;
        self.countdown = Countdown::new(duration_secs);
        self.goal = format!(
            "GOAL: {} {}",
            label_or(&descriptor.verb, "BALANCE"),
            label_or(&descriptor.ent_b, "SYSTEM")
        );
    }

    fn schedule(&self) -> Vec<Periodic> {
        vec![
            Periodic::every(TickKind::Move, DRIFT_MS),
            Periodic::every(TickKind::Countdown, COUNTDOWN_MS),
        ]
    }

    fn on_tick(&mut self, kind: TickKind) {
        if self.finished {
            return;
        }
        match kind {
            TickKind::Move => self.drift(),
            TickKind::Countdown => {
                if self.countdown.tick() {
                    self.finished = true;
                }
            }
            TickKind::Spawn | TickKind::Particles => {}
        }
    }

    fn on_input(&mut self, event: InputEvent) {
        if self.finished {
            return;
        }
        match event {
            InputEvent::Grow => self.shift(NUDGE),
            InputEvent::Reduce => self.shift(-NUDGE),
            _ => {}
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    /// Seconds of stability, accumulated in 0.2 s steps
    fn final_score(&self) -> f64 {
        self.stable_ticks as f64 * STABLE_CREDIT
    }

    fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    fn describe_goal(&self) -> String {
        self.goal.clone()
    }

    fn bindings(&self) -> &'static [InputBinding] {
        &[InputBinding::Buttons]
    }
}
