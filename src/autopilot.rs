//! Demo player
//!
//! Produces plausible input for whatever mode is live, so the headless binary
//! (and attract-style previews) can play a full round without a human. It
//! reads engine state through the public accessors only.

use glam::Vec2;

use crate::session::GameSession;
use crate::sim::collision::nearest_to_edge;
use crate::sim::modes::{InputEvent, Lane, ModeEngine, resource};

/// Minimum time between discrete actions (clicks, sorts, nudges)
pub const REACTION_MS: u64 = 250;
/// Pointer speed when tracing the connector route, px per plan call
const TRACE_STEP: f32 = 6.0;
/// Pointer step when dodging
const DODGE_STEP: f32 = 12.0;
/// Sorter items are judged once they fall this far
const SORT_LINE: f32 = 120.0;

#[derive(Debug, Clone)]
pub struct Autopilot {
    field: Vec2,
    cooldown_ms: u64,
    cursor: Vec2,
    /// Distance travelled along the connector route
    travelled: f32,
}

impl Autopilot {
    pub fn new(field: Vec2) -> Self {
        Self {
            field,
            cooldown_ms: 0,
            cursor: Vec2::new(10.0, 10.0),
            travelled: 0.0,
        }
    }

    /// Forget per-round state before a new session
    pub fn reset(&mut self) {
        *self = Self::new(self.field);
    }

    /// Inputs to send this frame
    pub fn plan(&mut self, session: &GameSession, dt_ms: u64) -> Vec<InputEvent> {
        self.cooldown_ms = self.cooldown_ms.saturating_sub(dt_ms);
        if !session.is_running() {
            return Vec::new();
        }

        let floor = self.field.y;
        let event = match session.engine() {
            ModeEngine::Shooter(game) => self.act(|| {
                // Lowest target is the one about to escape
                game.targets()
                    .iter()
                    .max_by(|a, b| a.rect.max.y.total_cmp(&b.rect.max.y))
                    .map(|t| InputEvent::Click(t.rect.center()))
            }),
            ModeEngine::Resource(game) => self.act(|| {
                let mid = (resource::STABLE_LOW + resource::STABLE_HIGH) / 2;
                let value = game.value();
                if value < mid - 5 {
                    Some(InputEvent::Grow)
                } else if value > mid + 5 {
                    Some(InputEvent::Reduce)
                } else {
                    None
                }
            }),
            ModeEngine::Sorter(game) => self.act(|| {
                let items = game.items();
                let index = nearest_to_edge(
                    floor,
                    items
                        .iter()
                        .enumerate()
                        .filter(|(_, item)| item.active && item.pos.y >= SORT_LINE)
                        .map(|(i, item)| (i, item.pos.y)),
                )?;
                Some(match items[index].lane {
                    Lane::Left => InputEvent::Left,
                    Lane::Right => InputEvent::Right,
                })
            }),
            ModeEngine::Dodger(game) => {
                let threats: Vec<Vec2> = game.enemies().iter().map(|e| e.rect.center()).collect();
                self.cursor = self.safest_step(game.player().center(), &threats);
                Some(InputEvent::PointerMove(self.cursor))
            }
            ModeEngine::Collector(game) => self.act(|| {
                // Grab whatever is about to vanish
                game.targets()
                    .iter()
                    .min_by_key(|t| t.ttl_ms)
                    .map(|t| InputEvent::Click(t.center))
            }),
            ModeEngine::Connector(game) => {
                let layout = game.layout();
                let mut route = Vec::with_capacity(layout.path.len() + 2);
                route.push(layout.start.center());
                route.extend_from_slice(&layout.path);
                route.push(layout.goal.center());

                if !game.is_active() {
                    // Back to the start after a slip
                    self.travelled = 0.0;
                } else {
                    self.travelled += TRACE_STEP;
                }
                self.cursor = point_along(&route, self.travelled);
                Some(InputEvent::PointerMove(self.cursor))
            }
        };
        event.into_iter().collect()
    }

    /// Gate a discrete action behind the reaction cooldown
    fn act(&mut self, choose: impl FnOnce() -> Option<InputEvent>) -> Option<InputEvent> {
        if self.cooldown_ms > 0 {
            return None;
        }
        let event = choose()?;
        self.cooldown_ms = REACTION_MS;
        Some(event)
    }

    /// Move to whichever neighbouring point is farthest from every threat
    fn safest_step(&self, from: Vec2, threats: &[Vec2]) -> Vec2 {
        let clearance = |p: Vec2| {
            threats
                .iter()
                .map(|t| t.distance(p))
                .fold(f32::INFINITY, f32::min)
        };
        let margin = Vec2::splat(10.0);
        let max = (self.field - margin).max(margin);

        let mut best = from;
        let mut best_clearance = clearance(from);
        for i in 0..8 {
            let angle = i as f32 * std::f32::consts::FRAC_PI_4;
            let candidate = (from + Vec2::from_angle(angle) * DODGE_STEP).clamp(margin, max);
            let c = clearance(candidate);
            if c > best_clearance {
                best = candidate;
                best_clearance = c;
            }
        }
        best
    }
}

/// Point `distance` along a polyline, clamped to its ends
fn point_along(route: &[Vec2], mut distance: f32) -> Vec2 {
    let Some(&first) = route.first() else {
        return Vec2::ZERO;
    };
    let mut last = first;
    for pair in route.windows(2) {
        let len = pair[0].distance(pair[1]);
        if distance <= len {
            if len <= f32::EPSILON {
                return pair[1];
            }
            return pair[0].lerp(pair[1], distance / len);
        }
        distance -= len;
        last = pair[1];
    }
    last
}
