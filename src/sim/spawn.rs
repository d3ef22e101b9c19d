//! Procedural wall layout and collision-free spawn placement
//!
//! Wall generation uses a coarse occupancy grid with one cell of padding to
//! reject overlapping placements. Overlap-free layouts are a goal rather
//! than an invariant: the spawn sampler never trusts the layout and guards
//! every placement with its own rejection tests.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::sim::geom::circle_overlaps_any_wall;
use crate::sim::state::{Agent, Wall};

/// Number of walls drawn per episode
const WALL_COUNT_MIN: u32 = 4;
const WALL_COUNT_MAX: u32 = 6;
/// Wall long-side range
const WALL_LENGTH_MIN: f32 = 50.0;
const WALL_LENGTH_MAX: f32 = 250.0;
/// Wall short-side range
const WALL_THICKNESS_MIN: f32 = 20.0;
const WALL_THICKNESS_MAX: f32 = 40.0;
/// Walls keep this much clearance from the arena edges
const WALL_EDGE_MARGIN: f32 = 50.0;

/// Occupancy grid over the arena for wall placement rejection
struct OccupancyGrid {
    cols: usize,
    rows: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    fn new(bounds: Vec2) -> Self {
        let cols = (bounds.x / WALL_GRID_CELL).ceil() as usize;
        let rows = (bounds.y / WALL_GRID_CELL).ceil() as usize;
        Self { cols, rows, cells: vec![false; cols * rows] }
    }

    /// Cell range covered by a wall, padded by one cell on every side
    fn padded_range(&self, wall: &Wall) -> (usize, usize, usize, usize) {
        let c0 = ((wall.x / WALL_GRID_CELL) as isize - 1).max(0) as usize;
        let r0 = ((wall.y / WALL_GRID_CELL) as isize - 1).max(0) as usize;
        let c1 = (((wall.x + wall.width) / WALL_GRID_CELL) as usize + 1).min(self.cols - 1);
        let r1 = (((wall.y + wall.height) / WALL_GRID_CELL) as usize + 1).min(self.rows - 1);
        (c0, r0, c1, r1)
    }

    fn is_free(&self, wall: &Wall) -> bool {
        let (c0, r0, c1, r1) = self.padded_range(wall);
        for r in r0..=r1 {
            for c in c0..=c1 {
                if self.cells[r * self.cols + c] {
                    return false;
                }
            }
        }
        true
    }

    fn occupy(&mut self, wall: &Wall) {
        let (c0, r0, c1, r1) = self.padded_range(wall);
        for r in r0..=r1 {
            for c in c0..=c1 {
                self.cells[r * self.cols + c] = true;
            }
        }
    }
}

/// Draw one candidate wall rectangle, randomly oriented
fn sample_wall(rng: &mut Pcg32, bounds: Vec2) -> Wall {
    let length = rng.random_range(WALL_LENGTH_MIN..=WALL_LENGTH_MAX);
    let thickness = rng.random_range(WALL_THICKNESS_MIN..=WALL_THICKNESS_MAX);

    let (width, height) = if rng.random_bool(0.5) {
        (length, thickness)
    } else {
        (thickness, length)
    };

    let x = rng.random_range(WALL_EDGE_MARGIN..=(bounds.x - WALL_EDGE_MARGIN - width));
    let y = rng.random_range(WALL_EDGE_MARGIN..=(bounds.y - WALL_EDGE_MARGIN - height));
    Wall { x, y, width, height }
}

/// Generate the episode's wall layout.
///
/// Each wall gets a bounded number of placement attempts against the padded
/// occupancy grid; a wall whose attempts are exhausted is skipped, so an
/// episode may end up with fewer walls than drawn.
pub fn generate_walls(rng: &mut Pcg32, bounds: Vec2) -> Vec<Wall> {
    let count = rng.random_range(WALL_COUNT_MIN..=WALL_COUNT_MAX);
    let mut grid = OccupancyGrid::new(bounds);
    let mut walls = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let mut placed = false;
        for _ in 0..WALL_PLACE_ATTEMPTS {
            let candidate = sample_wall(rng, bounds);
            if grid.is_free(&candidate) {
                grid.occupy(&candidate);
                walls.push(candidate);
                placed = true;
                break;
            }
        }
        if !placed {
            log::debug!("wall placement attempts exhausted, skipping wall");
        }
    }

    log::info!("generated {} walls", walls.len());
    walls
}

/// Sample a spawn position clear of walls and other agents.
///
/// Rejection sampling with a bounded attempt count. When the budget is
/// exhausted the fixed fallback position is returned so episode
/// construction never loops unboundedly and never yields an undefined
/// placement.
pub fn sample_spawn_position(rng: &mut Pcg32, bounds: Vec2, walls: &[Wall], existing: &[Agent]) -> Vec2 {
    for _ in 0..SPAWN_MAX_ATTEMPTS {
        let x = rng.random_range(SPAWN_EDGE_MARGIN..=(bounds.x - SPAWN_EDGE_MARGIN));
        let y = rng.random_range(SPAWN_EDGE_MARGIN..=(bounds.y - SPAWN_EDGE_MARGIN));

        if circle_overlaps_any_wall(x, y, AGENT_RADIUS + SPAWN_WALL_BUFFER, walls) {
            continue;
        }
        let candidate = Vec2::new(x, y);
        if existing.iter().any(|a| a.pos.distance(candidate) < SPAWN_MIN_SEPARATION) {
            continue;
        }
        return candidate;
    }

    log::warn!("spawn sampling exhausted, using fallback position");
    Vec2::new(SPAWN_FALLBACK.0, SPAWN_FALLBACK.1)
}
