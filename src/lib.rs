//! Arena Bots - deterministic top-down arena combat simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, world state, weapons, episodes)
//! - `config`: Environment configuration and validation
//! - `bot`: Scripted opponents layered on top of the core's queries
//! - `snapshot`: Read-only world snapshot and the `Renderer` capability
//!
//! The `sim` module is the reproducible core consumed by external training
//! harnesses through `reset`/`step`; everything else is a thin collaborator.

pub mod bot;
pub mod config;
pub mod sim;
pub mod snapshot;

pub use config::{EnvConfig, WeaponRoster};
pub use sim::episode::{ArenaEnv, StepOutcome, StepResult};

/// Simulation constants
pub mod consts {
    /// Arena width in world units
    pub const ARENA_WIDTH: f32 = 900.0;
    /// Arena height in world units
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Agent body radius
    pub const AGENT_RADIUS: f32 = 20.0;
    /// Starting and maximum health
    pub const MAX_HEALTH: f32 = 100.0;
    /// Displacement per step for both move and strafe components
    pub const MOVE_SPEED: f32 = 5.0;
    /// Heading change per turn input, radians per step
    pub const TURN_SPEED: f32 = 0.15;

    /// Fixed duration of one simulation step, used only to convert weapon
    /// cooldown times into step counts
    pub const STEP_MS: f32 = 50.0;

    /// Raycast sensor marching increment. Coarse on purpose: the rays are a
    /// low-precision wall sensor, and trained policies expect this
    /// granularity.
    pub const RAY_MARCH_STEP: f32 = 25.0;
    /// Number of wall-sensor rays per agent
    pub const NUM_RAYS: usize = 8;

    /// Other-agent slots in the observation vector
    pub const OBS_AGENT_SLOTS: usize = 4;
    /// Threat-projectile slots in the observation vector
    pub const OBS_PROJECTILE_SLOTS: usize = 5;
    /// Projectiles beyond this distance are not reported as threats
    pub const THREAT_RADIUS: f32 = 400.0;

    /// Minimum distance from arena edges for spawn candidates
    pub const SPAWN_EDGE_MARGIN: f32 = 40.0;
    /// Extra clearance between a spawning agent and walls
    pub const SPAWN_WALL_BUFFER: f32 = 10.0;
    /// Minimum separation between spawned agents
    pub const SPAWN_MIN_SEPARATION: f32 = 150.0;
    /// Rejection-sampling attempts before falling back
    pub const SPAWN_MAX_ATTEMPTS: u32 = 100;
    /// Documented fallback spawn position when sampling is exhausted
    pub const SPAWN_FALLBACK: (f32, f32) = (100.0, 100.0);

    /// Placement attempts per generated wall
    pub const WALL_PLACE_ATTEMPTS: u32 = 20;
    /// Occupancy-grid cell size for wall placement rejection
    pub const WALL_GRID_CELL: f32 = 50.0;
}

/// Wrap an angle to (-π, π]
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = (angle + PI) % TAU;
    if a <= 0.0 {
        a += TAU;
    }
    a - PI
}

/// Shortest signed angular difference `target - source`, wrapped to (-π, π]
#[inline]
pub fn angle_diff(target: f32, source: f32) -> f32 {
    wrap_angle(target - source)
}
