//! Hit-feedback particles
//!
//! Purely visual: nothing here affects scoring. Particles live a fixed number
//! of physics ticks and fall under unit gravity.

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

/// Physics tick period for particles
pub const PARTICLE_TICK_MS: u64 = 30;
/// Ticks a fresh particle lives
pub const PARTICLE_LIFE: i32 = 15;
/// Particles spawned per hit
pub const BURST_SIZE: usize = 8;
/// Downward velocity gained per tick
pub const PARTICLE_GRAVITY: f32 = 1.0;
/// Velocity components a burst draws from
const BURST_SPEEDS: [f32; 4] = [-5.0, -3.0, 3.0, 5.0];

/// A single particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining ticks; dead at zero
    pub life: i32,
}

impl Particle {
    /// Advance one tick. Returns false once the particle has expired.
    pub fn update(&mut self) -> bool {
        self.life -= 1;
        self.pos += self.vel;
        self.vel.y += PARTICLE_GRAVITY;
        self.life > 0
    }
}

/// Bounded particle pool owned by one game session
#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    capacity: usize,
    rng: Pcg32,
}

impl ParticleSystem {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(1024)),
            capacity,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Spawn `count` particles at `at` with randomised velocities
    ///
    /// When the pool is full the oldest particles make room.
    pub fn burst(&mut self, at: Vec2, count: usize) {
        if self.capacity == 0 {
            return;
        }
        for _ in 0..count {
            if self.particles.len() >= self.capacity {
                self.particles.remove(0);
            }
            let vx = *BURST_SPEEDS.choose(&mut self.rng).unwrap_or(&3.0);
            let vy = *BURST_SPEEDS.choose(&mut self.rng).unwrap_or(&3.0);
            self.particles.push(Particle {
                pos: at,
                vel: Vec2::new(vx, vy),
                life: PARTICLE_LIFE,
            });
        }
    }

    /// One physics tick: move, apply gravity, drop the dead
    pub fn tick(&mut self) {
        self.particles.retain_mut(|p| p.update());
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
