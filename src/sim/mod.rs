//! Deterministic game simulation
//!
//! Pure state and logic only:
//! - Simulated milliseconds, never wall time
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod modes;
pub mod particles;
pub mod scheduler;

pub use collision::{
    Rect, boxes_overlap, nearest_to_edge, nearest_to_point, point_in_box, point_on_polyline,
};
pub use modes::{GameEvent, InputBinding, InputEvent, MiniGame, ModeEngine};
pub use particles::{Particle, ParticleSystem};
pub use scheduler::{Periodic, Scheduler, TickKind};
