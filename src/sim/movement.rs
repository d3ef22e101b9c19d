//! Movement resolution with wall-collision rejection
//!
//! Turning is applied before movement and the heading change is always
//! kept. Position updates are all-or-nothing: a candidate that overlaps
//! any wall after bounds clamping is discarded entirely, with no sliding.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{AGENT_RADIUS, MOVE_SPEED, TURN_SPEED};
use crate::sim::geom::circle_overlaps_any_wall;
use crate::sim::state::{Wall, WorldState};
use crate::wrap_angle;

/// Forward/backward intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveDir {
    #[default]
    None,
    Forward,
    Backward,
}

/// Sideways intent, perpendicular to heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrafeDir {
    #[default]
    None,
    Left,
    Right,
}

/// Turning intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnDir {
    #[default]
    None,
    Left,
    Right,
}

/// One agent's decoded movement intent for a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub movement: MoveDir,
    pub strafe: StrafeDir,
    pub turn: TurnDir,
}

/// Apply one agent's movement intent. Dead agents never move or turn.
pub fn apply_movement(world: &mut WorldState, idx: usize, intent: MoveIntent) {
    if !world.agents[idx].alive {
        return;
    }

    let angle = match intent.turn {
        TurnDir::Left => wrap_angle(world.agents[idx].angle + TURN_SPEED),
        TurnDir::Right => wrap_angle(world.agents[idx].angle - TURN_SPEED),
        TurnDir::None => world.agents[idx].angle,
    };

    let heading = Vec2::new(angle.cos(), angle.sin());
    let mut delta = Vec2::ZERO;
    match intent.movement {
        MoveDir::Forward => delta += heading * MOVE_SPEED,
        MoveDir::Backward => delta -= heading * MOVE_SPEED,
        MoveDir::None => {}
    }
    match intent.strafe {
        // Left is +90° from heading in this coordinate system
        StrafeDir::Left => delta += heading.perp() * MOVE_SPEED,
        StrafeDir::Right => delta -= heading.perp() * MOVE_SPEED,
        StrafeDir::None => {}
    }

    let candidate = (world.agents[idx].pos + delta).clamp(
        Vec2::splat(AGENT_RADIUS),
        world.bounds - Vec2::splat(AGENT_RADIUS),
    );
    let blocked = collides(candidate, &world.walls);

    let agent = &mut world.agents[idx];
    agent.angle = angle;
    if blocked {
        // Discard the whole displacement; the turn is still applied
        agent.vel = Vec2::ZERO;
    } else {
        agent.vel = candidate - agent.pos;
        agent.pos = candidate;
    }
}

#[inline]
fn collides(pos: Vec2, walls: &[Wall]) -> bool {
    circle_overlaps_any_wall(pos.x, pos.y, AGENT_RADIUS, walls)
}
