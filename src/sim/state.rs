//! World state and core simulation types
//!
//! Everything an episode owns lives here. Entities are created fresh on
//! reset, mutated once per step, and discarded at the next reset.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::weapon::WeaponKind;
use crate::wrap_angle;

/// An axis-aligned rectangular wall. Immutable for the episode's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A combatant in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Position of the body center
    pub pos: Vec2,
    /// Heading angle in radians, wrapped to (-π, π]
    pub angle: f32,
    /// Remaining health, floor-clamped at 0
    pub health: f32,
    /// Equipped weapon
    pub weapon: WeaponKind,
    pub alive: bool,
    /// Steps until the weapon may fire again
    pub cooldown_steps: u32,
    /// Displacement produced by the last movement pass. Tracked for the
    /// observation encoder only; it does not feed back into physics.
    pub vel: Vec2,
}

impl Agent {
    pub fn new(pos: Vec2, angle: f32, weapon: WeaponKind) -> Self {
        Self {
            pos,
            angle: wrap_angle(angle),
            health: MAX_HEALTH,
            weapon,
            alive: true,
            cooldown_steps: 0,
            vel: Vec2::ZERO,
        }
    }

    /// Apply damage, clamping health at zero and flipping the alive flag.
    /// Returns true if this hit killed the agent.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.alive = false;
            return true;
        }
        false
    }
}

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Index of the agent that fired it; never hits its owner
    pub owner: usize,
    pub age_steps: u32,
    pub active: bool,
}

/// RNG state wrapper so a world can be reseeded and serialized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete arena state for one episode (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    /// Episode seed for reproducibility
    pub seed: u64,
    /// Arena dimensions
    pub bounds: Vec2,
    pub walls: Vec<Wall>,
    /// Fixed-size agent roster for the episode
    pub agents: Vec<Agent>,
    /// Active projectiles; purged once inactive
    pub projectiles: Vec<Projectile>,
    pub step_count: u32,
    /// Step duration in milliseconds; only ever used to convert weapon
    /// cooldown times into step counts
    pub step_ms: f32,
    /// Per-instance RNG. Owning it here is what makes identically seeded
    /// instances reproduce identical episodes when run in parallel.
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

impl WorldState {
    /// Create an empty world with the given seed. Walls and agents are
    /// placed by the spawn sampler during episode reset.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            bounds: Vec2::new(ARENA_WIDTH, ARENA_HEIGHT),
            walls: Vec::new(),
            agents: Vec::new(),
            projectiles: Vec::new(),
            step_count: 0,
            step_ms: STEP_MS,
            rng: RngState::new(seed).to_rng(),
        }
    }

    /// Diagonal length of the arena, the maximum possible ray distance
    #[inline]
    pub fn diagonal(&self) -> f32 {
        self.bounds.length()
    }

    /// Number of agents still alive
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    /// Euclidean distance between two agents
    #[inline]
    pub fn distance_between(&self, a: usize, b: usize) -> f32 {
        self.agents[a].pos.distance(self.agents[b].pos)
    }

    /// Absolute world angle from agent `from` toward agent `to`
    #[inline]
    pub fn angle_to(&self, from: usize, to: usize) -> f32 {
        let d = self.agents[to].pos - self.agents[from].pos;
        d.y.atan2(d.x)
    }

    /// True if no wall blocks the segment between the two agents' centers.
    /// Cheap enough for scripted opponents to call every step.
    pub fn line_of_sight(&self, a: usize, b: usize) -> bool {
        !crate::sim::geom::line_blocked_by_walls(
            self.agents[a].pos,
            self.agents[b].pos,
            &self.walls,
        )
    }
}
