//! Deterministic simulation module
//!
//! All combat logic lives here. This module must be pure and deterministic:
//! - Fixed step only, no wall-clock time
//! - Seeded RNG only, owned by the world state
//! - Stable iteration order (ascending agent index)
//! - No rendering or platform dependencies

pub mod episode;
pub mod geom;
pub mod movement;
pub mod observe;
pub mod spawn;
pub mod state;
pub mod weapon;

pub use episode::{ArenaEnv, StepOutcome, StepResult};
pub use geom::{cast_ray, circle_overlaps_rect, line_intersects_rect, point_in_rect, segments_intersect};
pub use state::{Agent, Projectile, Wall, WorldState};
pub use weapon::{FireModel, WeaponKind, WeaponSpec};
