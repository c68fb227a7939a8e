//! Connector: trace a narrow path from start to goal without leaving it
//!
//! The clock only runs once the pointer has touched the start zone. Straying
//! off the path costs three seconds and closes the gate again until the
//! pointer returns to the start.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{COUNTDOWN_MS, Countdown, GameEvent, InputBinding, InputEvent, MiniGame, name_or};
use crate::scenario::ScenarioDescriptor;
use crate::sim::collision::{Rect, point_on_polyline};
use crate::sim::scheduler::{Periodic, TickKind};

/// Width of the start and goal zones
pub const ZONE_WIDTH: f32 = 60.0;
pub const ZONE_HALF_HEIGHT: f32 = 30.0;
/// Stroke width of the safe path
pub const PATH_WIDTH: f32 = 40.0;
/// Jittered points between start and goal
pub const WAYPOINTS: usize = 5;
/// Maximum vertical jitter of a waypoint
pub const JITTER: i32 = 100;
/// Waypoints stay this far from the top and bottom edges
const EDGE_MARGIN: f32 = 50.0;
/// Seconds lost for leaving the path
pub const PENALTY_SECS: u32 = 3;

/// Where a point lies on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Start,
    Goal,
    Path,
    Outside,
}

/// Board geometry, fixed for a session
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorLayout {
    pub start: Rect,
    pub goal: Rect,
    /// Path midline from the start edge to the goal edge
    pub path: Vec<Vec2>,
}

impl ConnectorLayout {
    /// Lay out a board with a randomly jittered path
    pub fn generate(field: Vec2, rng: &mut Pcg32) -> Self {
        let (w, h) = (field.x, field.y);
        let mid = h / 2.0;
        let start = Rect::new(
            Vec2::new(0.0, mid - ZONE_HALF_HEIGHT),
            Vec2::new(ZONE_WIDTH, mid + ZONE_HALF_HEIGHT),
        );
        let goal = Rect::new(
            Vec2::new(w - ZONE_WIDTH, mid - ZONE_HALF_HEIGHT),
            Vec2::new(w, mid + ZONE_HALF_HEIGHT),
        );

        let low = EDGE_MARGIN.min(mid);
        let high = (h - EDGE_MARGIN).max(mid);
        let seg_len = (w - 2.0 * ZONE_WIDTH) / WAYPOINTS as f32;

        let mut path = Vec::with_capacity(WAYPOINTS + 2);
        path.push(Vec2::new(ZONE_WIDTH, mid));
        for i in 1..=WAYPOINTS {
            let jitter = rng.random_range(-JITTER..=JITTER) as f32;
            path.push(Vec2::new(
                ZONE_WIDTH + i as f32 * seg_len,
                (mid + jitter).clamp(low, high),
            ));
        }
        path.push(Vec2::new(w - ZONE_WIDTH, mid));

        Self { start, goal, path }
    }

    /// Classify a point; the goal wins over the path it overlaps
    pub fn zone_at(&self, point: Vec2) -> Zone {
        if self.goal.contains(point) {
            Zone::Goal
        } else if self.start.contains(point) {
            Zone::Start
        } else if point_on_polyline(point, &self.path, PATH_WIDTH / 2.0) {
            Zone::Path
        } else {
            Zone::Outside
        }
    }
}

#[derive(Debug)]
pub struct Connector {
    field: Vec2,
    rng: Pcg32,
    layout: ConnectorLayout,
    countdown: Countdown,
    /// Activation gate: the clock runs only while open
    active: bool,
    finished: bool,
    reached_goal: bool,
    penalties: u32,
    goal: String,
    events: Vec<GameEvent>,
}

impl Connector {
    pub fn new(field: Vec2, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let layout = ConnectorLayout::generate(field, &mut rng);
        Self {
            field,
            rng,
            layout,
            countdown: Countdown::new(super::ROUND_SECONDS),
            active: false,
            finished: false,
            reached_goal: false,
            penalties: 0,
            goal: String::new(),
            events: Vec::new(),
        }
    }

    pub fn layout(&self) -> &ConnectorLayout {
        &self.layout
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn penalties(&self) -> u32 {
        self.penalties
    }

    pub fn reached_goal(&self) -> bool {
        self.reached_goal
    }

    fn track(&mut self, at: Vec2) {
        let zone = self.layout.zone_at(at);
        if !self.active {
            if zone == Zone::Start {
                self.active = true;
                log::debug!("Connector gate open");
            }
            return;
        }

        match zone {
            Zone::Goal => {
                self.reached_goal = true;
                self.finished = true;
            }
            Zone::Start | Zone::Path => {}
            Zone::Outside => {
                self.countdown.penalize(PENALTY_SECS);
                self.active = false;
                self.penalties += 1;
                self.events.push(GameEvent::Penalty {
                    seconds: PENALTY_SECS,
                });
                log::debug!("Connector penalty, {}s left", self.countdown.remaining());
            }
        }
    }
}

impl MiniGame for Connector {
    fn start(&mut self, descriptor: &ScenarioDescriptor, duration_secs: u32) {
        self.layout = ConnectorLayout::generate(self.field, &mut self.rng);
        self.countdown = Countdown::new(duration_secs);
        self.active = false;
        self.finished = false;
        self.reached_goal = false;
        self.penalties = 0;
        self.events.clear();
        self.goal = format!(
            "CONNECT: {} -> {}",
            name_or(&descriptor.ent_a, "START"),
            name_or(&descriptor.ent_b, "GOAL")
        );
    }

    fn schedule(&self) -> Vec<Periodic> {
        vec![Periodic::every(TickKind::Countdown, COUNTDOWN_MS)]
    }

    fn on_tick(&mut self, kind: TickKind) {
        if self.finished || kind != TickKind::Countdown {
            return;
        }
        if self.active {
            self.countdown.tick();
        }
        // Penalties can also drain the clock; either way the next tick ends it
        if self.countdown.is_expired() {
            self.finished = true;
        }
    }

    fn on_input(&mut self, event: InputEvent) {
        if self.finished {
            return;
        }
        if let InputEvent::PointerMove(at) = event {
            self.track(at);
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    /// Seconds left when the goal was reached; zero on timeout
    fn final_score(&self) -> f64 {
        if self.reached_goal {
            self.countdown.remaining() as f64
        } else {
            0.0
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

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
