//! Read-only world snapshot for rendering collaborators
//!
//! The simulation core never draws. Renderers consume an immutable snapshot
//! of exactly the state they need and produce frames on their own side of
//! the boundary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::state::WorldState;
use crate::sim::weapon::WeaponKind;

/// One agent's renderable state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub pos: Vec2,
    pub angle: f32,
    pub health: f32,
    pub alive: bool,
    pub weapon: WeaponKind,
}

/// One wall's renderable state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Immutable view of one simulation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub bounds: Vec2,
    pub step_count: u32,
    pub walls: Vec<WallView>,
    pub agents: Vec<AgentView>,
    /// Positions of active projectiles only
    pub projectiles: Vec<Vec2>,
}

impl WorldSnapshot {
    pub fn capture(world: &WorldState) -> Self {
        Self {
            bounds: world.bounds,
            step_count: world.step_count,
            walls: world
                .walls
                .iter()
                .map(|w| WallView { x: w.x, y: w.y, width: w.width, height: w.height })
                .collect(),
            agents: world
                .agents
                .iter()
                .map(|a| AgentView {
                    pos: a.pos,
                    angle: a.angle,
                    health: a.health,
                    alive: a.alive,
                    weapon: a.weapon,
                })
                .collect(),
            projectiles: world
                .projectiles
                .iter()
                .filter(|p| p.active)
                .map(|p| p.pos)
                .collect(),
        }
    }
}

/// Rendering capability. Implementations live entirely outside the
/// simulation core; the core only ever hands them snapshots.
pub trait Renderer {
    /// Pixel or buffer type the renderer produces
    type Frame;

    fn draw_frame(&mut self, snapshot: &WorldSnapshot) -> Self::Frame;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Agent, Projectile, Wall};

    #[test]
    fn test_capture_reflects_world() {
        let mut world = WorldState::new(5);
        world.walls.push(Wall { x: 10.0, y: 20.0, width: 100.0, height: 30.0 });
        world.agents.push(Agent::new(Vec2::new(100.0, 100.0), 0.5, WeaponKind::Smg));
        world.projectiles.push(Projectile {
            pos: Vec2::new(200.0, 200.0),
            vel: Vec2::new(12.0, 0.0),
            owner: 0,
            age_steps: 1,
            active: true,
        });
        world.projectiles.push(Projectile {
            pos: Vec2::new(300.0, 300.0),
            vel: Vec2::new(12.0, 0.0),
            owner: 0,
            age_steps: 9,
            active: false,
        });

        let snap = WorldSnapshot::capture(&world);
        assert_eq!(snap.walls.len(), 1);
        assert_eq!(snap.agents.len(), 1);
        assert_eq!(snap.agents[0].weapon, WeaponKind::Smg);
        // Inactive projectiles never reach a renderer
        assert_eq!(snap.projectiles, vec![Vec2::new(200.0, 200.0)]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let world = WorldState::new(5);
        let snap = WorldSnapshot::capture(&world);
        let json = serde_json::to_string(&snap).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
