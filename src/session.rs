//! One live round: a mode engine, its clock and its particles
//!
//! Everything here runs on the caller's thread. `advance` pulls due ticks
//! from the scheduler one by one and stops the moment the engine reports it
//! is finished, so no tick ever reaches an ended game.

use crate::assets::Sprite;
use crate::scenario::{GameMode, ScenarioDescriptor};
use crate::settings::Settings;
use crate::sim::modes::{GameEvent, InputBinding, InputEvent, MiniGame, ModeEngine};
use crate::sim::particles::{BURST_SIZE, PARTICLE_TICK_MS, ParticleSystem};
use crate::sim::scheduler::{Periodic, Scheduler, TickKind};

#[derive(Debug)]
pub struct GameSession {
    descriptor: ScenarioDescriptor,
    engine: ModeEngine,
    scheduler: Scheduler,
    particles: ParticleSystem,
    sprite: Sprite,
    /// Cleared on finish or teardown; never set again
    running: bool,
    /// Input channels captured while running
    bindings: Vec<InputBinding>,
    seed: u64,
}

impl GameSession {
    /// Build and start a round for `descriptor`
    pub fn start(
        descriptor: ScenarioDescriptor,
        settings: &Settings,
        sprite: Sprite,
        seed: u64,
    ) -> Self {
        let mut engine = ModeEngine::new(descriptor.mode, settings.field(), seed);
        engine.start(&descriptor, settings.round_seconds);

        let mut scheduler = Scheduler::new();
        for periodic in engine.schedule() {
            scheduler.add(periodic);
        }
        scheduler.add(Periodic::every(TickKind::Particles, PARTICLE_TICK_MS));

        let bindings = engine.bindings().to_vec();
        log::info!(
            "Session started: {} ({}), seed {seed}",
            descriptor.mode.as_str(),
            engine.describe_goal()
        );

        Self {
            descriptor,
            engine,
            scheduler,
            particles: ParticleSystem::new(settings.max_particles, seed ^ 0x9e37_79b9_7f4a_7c15),
            sprite,
            running: true,
            bindings,
            seed,
        }
    }

    /// Run simulated time forward by `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        if !self.running {
            return;
        }
        let target = self.scheduler.now_ms() + dt_ms;
        while self.running {
            let Some(due) = self.scheduler.next_due(target) else {
                break;
            };
            match due.kind {
                TickKind::Particles => self.particles.tick(),
                kind => self.engine.on_tick(kind),
            }
            self.after_engine_step();
        }
        // A finished round keeps the time of its final tick
        if self.running {
            self.scheduler.settle(target);
        }
    }

    /// Forward input to the engine if its channel is captured
    pub fn on_input(&mut self, event: InputEvent) {
        if !self.running || !self.bindings.contains(&event.binding()) {
            return;
        }
        self.engine.on_input(event);
        self.after_engine_step();
    }

    fn after_engine_step(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                GameEvent::Burst { at } => self.particles.burst(at, BURST_SIZE),
                GameEvent::Penalty { seconds } => {
                    log::debug!("Penalty: -{seconds}s, {}s left", self.engine.time_remaining())
                }
            }
        }
        if self.engine.is_finished() {
            log::info!(
                "Session finished: {} scored {}",
                self.descriptor.mode.as_str(),
                self.engine.final_score()
            );
            self.running = false;
        }
    }

    /// Stop everything. Safe to call any number of times.
    pub fn teardown(&mut self) {
        if self.running || self.scheduler.task_count() > 0 {
            log::debug!("Session teardown");
        }
        self.running = false;
        self.scheduler.cancel_all();
        self.particles.clear();
        self.bindings.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    pub fn score(&self) -> f64 {
        self.engine.final_score().max(0.0)
    }

    pub fn time_remaining(&self) -> u32 {
        self.engine.time_remaining()
    }

    /// Simulated time since the round started
    pub fn elapsed_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn goal(&self) -> String {
        self.engine.describe_goal()
    }

    pub fn mode(&self) -> GameMode {
        self.descriptor.mode
    }

    pub fn descriptor(&self) -> &ScenarioDescriptor {
        &self.descriptor
    }

    pub fn engine(&self) -> &ModeEngine {
        &self.engine
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn bindings(&self) -> &[InputBinding] {
        &self.bindings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scheduled_tasks(&self) -> usize {
        self.scheduler.task_count()
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
