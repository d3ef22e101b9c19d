//! Weapon registry and damage resolution
//!
//! One weapon system with two resolution strategies: hitscan shots resolve
//! instantaneously through line-of-sight geometry, projectile shots spawn a
//! bullet that the per-step physics pass advances and retires. Which
//! strategy a weapon uses is part of its registry entry.
//!
//! Cooldown policy: every attempted fire consumes the cooldown, hit or
//! miss. Fire rate stays deterministic and rapid no-op attempts buy
//! nothing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::angle_diff;
use crate::consts::AGENT_RADIUS;
use crate::sim::geom::{line_blocked_by_walls, point_in_rect};
use crate::sim::state::{Projectile, WorldState};

/// Closed weapon enumeration. Slot order is also the observation one-hot
/// order, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Default weapon; unknown identifiers resolve here
    #[default]
    Pistol,
    Smg,
    Sniper,
    Blaster,
}

/// Number of registered weapons (observation one-hot width)
pub const WEAPON_COUNT: usize = 4;

impl WeaponKind {
    /// All registered weapons in one-hot slot order
    pub const ALL: [WeaponKind; WEAPON_COUNT] =
        [WeaponKind::Pistol, WeaponKind::Smg, WeaponKind::Sniper, WeaponKind::Blaster];

    /// One-hot slot index
    #[inline]
    pub fn index(self) -> usize {
        match self {
            WeaponKind::Pistol => 0,
            WeaponKind::Smg => 1,
            WeaponKind::Sniper => 2,
            WeaponKind::Blaster => 3,
        }
    }

    /// Resolve a loose identifier to a registered weapon. Unknown names map
    /// to the default pistol rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "pistol" => WeaponKind::Pistol,
            "smg" => WeaponKind::Smg,
            "sniper" => WeaponKind::Sniper,
            "blaster" => WeaponKind::Blaster,
            _ => WeaponKind::default(),
        }
    }

    /// Static registry entry for this weapon
    #[inline]
    pub fn spec(self) -> &'static WeaponSpec {
        &WEAPON_TABLE[self.index()]
    }
}

/// How a weapon's fire attempt resolves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FireModel {
    /// Instantaneous line-of-sight resolution out to `range`
    Hitscan { range: f32 },
    /// Spawn a bullet; effective range is `lifetime_steps * speed`
    Projectile { speed: f32, lifetime_steps: u32, radius: f32 },
}

/// Registry entry: fixed weapon properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub damage: f32,
    /// Cooldown between fire attempts, in milliseconds
    pub cooldown_ms: f32,
    /// Half-angle of the aim cone, radians
    pub aim_cone: f32,
    pub model: FireModel,
}

impl WeaponSpec {
    /// Cooldown converted to steps at the given step duration: rounded,
    /// never below one step
    pub fn cooldown_steps(&self, step_ms: f32) -> u32 {
        ((self.cooldown_ms / step_ms).round() as u32).max(1)
    }
}

/// The static weapon table, indexed by `WeaponKind::index`
static WEAPON_TABLE: [WeaponSpec; WEAPON_COUNT] = [
    // Pistol: the all-rounder every agent can fall back to
    WeaponSpec {
        damage: 20.0,
        cooldown_ms: 90.0,
        aim_cone: 0.3,
        model: FireModel::Hitscan { range: 600.0 },
    },
    // Smg: fast, weak, short reach
    WeaponSpec {
        damage: 8.0,
        cooldown_ms: 60.0,
        aim_cone: 0.3,
        model: FireModel::Hitscan { range: 400.0 },
    },
    // Sniper: slow, heavy, needs a tight line
    WeaponSpec {
        damage: 60.0,
        cooldown_ms: 900.0,
        aim_cone: 0.12,
        model: FireModel::Hitscan { range: 1100.0 },
    },
    // Blaster: projectile variant of the pistol
    WeaponSpec {
        damage: 20.0,
        cooldown_ms: 90.0,
        aim_cone: 0.3,
        model: FireModel::Projectile { speed: 12.0, lifetime_steps: 50, radius: 10.0 },
    },
];

/// Damage events produced by one resolution pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub shooter: usize,
    pub target: usize,
    pub damage: f32,
    pub lethal: bool,
}

/// Resolve one fire attempt for `shooter_idx`.
///
/// No-op while the shooter is dead or cooling down. Otherwise the cooldown
/// is consumed and, for hitscan weapons, at most one target is damaged.
/// Projectile weapons spawn their bullet here; hits happen later in
/// [`advance_projectiles`].
pub fn fire(world: &mut WorldState, shooter_idx: usize) -> Option<HitEvent> {
    let shooter = &world.agents[shooter_idx];
    if !shooter.alive || shooter.cooldown_steps > 0 {
        return None;
    }

    let spec = shooter.weapon.spec();
    world.agents[shooter_idx].cooldown_steps = spec.cooldown_steps(world.step_ms);

    match spec.model {
        FireModel::Hitscan { range } => resolve_hitscan(world, shooter_idx, spec, range),
        FireModel::Projectile { speed, .. } => {
            spawn_projectile(world, shooter_idx, speed);
            None
        }
    }
}

/// Walk targets nearest-first and damage the first one inside range, inside
/// the aim cone, and not occluded by a wall.
fn resolve_hitscan(
    world: &mut WorldState,
    shooter_idx: usize,
    spec: &WeaponSpec,
    range: f32,
) -> Option<HitEvent> {
    let origin = world.agents[shooter_idx].pos;
    let heading = world.agents[shooter_idx].angle;

    let mut candidates: Vec<(f32, usize)> = world
        .agents
        .iter()
        .enumerate()
        .filter(|(idx, a)| *idx != shooter_idx && a.alive)
        .map(|(idx, a)| (origin.distance(a.pos), idx))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (dist, target_idx) in candidates {
        if dist > range {
            continue;
        }
        let to_target = world.agents[target_idx].pos - origin;
        let aim_err = angle_diff(to_target.y.atan2(to_target.x), heading).abs();
        if aim_err > spec.aim_cone {
            continue;
        }
        if line_blocked_by_walls(origin, world.agents[target_idx].pos, &world.walls) {
            continue;
        }

        // First target passing every gate takes the hit; hitscan never
        // pierces through to a second one
        let lethal = world.agents[target_idx].take_damage(spec.damage);
        return Some(HitEvent {
            shooter: shooter_idx,
            target: target_idx,
            damage: spec.damage,
            lethal,
        });
    }

    None
}

/// Spawn a bullet just past the shooter's own radius so it cannot collide
/// with its owner on the spawn step.
fn spawn_projectile(world: &mut WorldState, shooter_idx: usize, speed: f32) {
    let shooter = &world.agents[shooter_idx];
    let dir = Vec2::new(shooter.angle.cos(), shooter.angle.sin());
    world.projectiles.push(Projectile {
        pos: shooter.pos + dir * (AGENT_RADIUS + 2.0),
        vel: dir * speed,
        owner: shooter_idx,
        age_steps: 0,
        active: true,
    });
}

/// Advance every active projectile one step, resolve hits, and purge
/// inactive bullets. Runs once per step after all fire attempts.
pub fn advance_projectiles(world: &mut WorldState) -> Vec<HitEvent> {
    let mut events = Vec::new();
    let bounds = world.bounds;

    for i in 0..world.projectiles.len() {
        if !world.projectiles[i].active {
            continue;
        }

        let p = &mut world.projectiles[i];
        p.pos += p.vel;
        p.age_steps += 1;

        let spec = world.agents[p.owner].weapon.spec();
        let (lifetime, radius, damage) = match spec.model {
            FireModel::Projectile { lifetime_steps, radius, .. } => {
                (lifetime_steps, radius, spec.damage)
            }
            // A hitscan owner cannot have live bullets; retire defensively
            FireModel::Hitscan { .. } => {
                p.active = false;
                continue;
            }
        };

        if p.age_steps > lifetime {
            p.active = false;
            continue;
        }
        if p.pos.x < 0.0 || p.pos.x > bounds.x || p.pos.y < 0.0 || p.pos.y > bounds.y {
            p.active = false;
            continue;
        }
        if world.walls.iter().any(|w| point_in_rect(p.pos.x, p.pos.y, w, 0.0)) {
            world.projectiles[i].active = false;
            continue;
        }

        let (pos, owner) = (world.projectiles[i].pos, world.projectiles[i].owner);
        let hit = world
            .agents
            .iter()
            .enumerate()
            .find(|(idx, a)| {
                *idx != owner && a.alive && a.pos.distance(pos) < AGENT_RADIUS + radius
            })
            .map(|(idx, _)| idx);

        if let Some(target_idx) = hit {
            let lethal = world.agents[target_idx].take_damage(damage);
            world.projectiles[i].active = false;
            events.push(HitEvent { shooter: owner, target: target_idx, damage, lethal });
        }
    }

    world.projectiles.retain(|p| p.active);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_HEALTH, STEP_MS};
    use crate::sim::state::{Agent, Wall};

    fn duel_world(weapon: WeaponKind, separation: f32) -> WorldState {
        let mut world = WorldState::new(0);
        // Shooter at the left, facing right at the target
        world.agents.push(Agent::new(Vec2::new(200.0, 300.0), 0.0, weapon));
        world.agents.push(Agent::new(
            Vec2::new(200.0 + separation, 300.0),
            std::f32::consts::PI,
            weapon,
        ));
        world
    }

    #[test]
    fn test_registry_cooldown_steps() {
        assert_eq!(WeaponKind::Pistol.spec().cooldown_steps(STEP_MS), 2);
        assert_eq!(WeaponKind::Smg.spec().cooldown_steps(STEP_MS), 1);
        assert_eq!(WeaponKind::Sniper.spec().cooldown_steps(STEP_MS), 18);
        // Conversion never yields zero steps, even at huge step durations
        for kind in WeaponKind::ALL {
            assert!(kind.spec().cooldown_steps(STEP_MS) >= 1);
            assert_eq!(kind.spec().cooldown_steps(10_000.0), 1);
        }
    }

    #[test]
    fn test_unknown_weapon_name_defaults_to_pistol() {
        assert_eq!(WeaponKind::from_name("pistol"), WeaponKind::Pistol);
        assert_eq!(WeaponKind::from_name("SMG"), WeaponKind::Smg);
        assert_eq!(WeaponKind::from_name("railgun"), WeaponKind::Pistol);
        assert_eq!(WeaponKind::from_name(""), WeaponKind::Pistol);
    }

    #[test]
    fn test_hitscan_hit_and_cooldown() {
        let mut world = duel_world(WeaponKind::Pistol, 100.0);
        let event = fire(&mut world, 0).expect("clean shot should land");
        assert_eq!(event.target, 1);
        assert_eq!(world.agents[1].health, MAX_HEALTH - 20.0);
        assert_eq!(world.agents[0].cooldown_steps, 2);

        // Second attempt inside the cooldown window is a no-op
        assert!(fire(&mut world, 0).is_none());
        assert_eq!(world.agents[1].health, MAX_HEALTH - 20.0);
    }

    #[test]
    fn test_hitscan_miss_still_consumes_cooldown() {
        let mut world = duel_world(WeaponKind::Pistol, 100.0);
        // Aim straight away from the target
        world.agents[0].angle = std::f32::consts::PI;
        assert!(fire(&mut world, 0).is_none());
        assert_eq!(world.agents[0].cooldown_steps, 2);
        assert_eq!(world.agents[1].health, MAX_HEALTH);
    }

    #[test]
    fn test_hitscan_out_of_range() {
        let mut world = duel_world(WeaponKind::Smg, 450.0);
        assert!(fire(&mut world, 0).is_none());
        assert_eq!(world.agents[1].health, MAX_HEALTH);
    }

    #[test]
    fn test_hitscan_occluded_by_wall() {
        let mut world = duel_world(WeaponKind::Pistol, 200.0);
        world.walls.push(Wall { x: 290.0, y: 200.0, width: 20.0, height: 200.0 });
        assert!(fire(&mut world, 0).is_none());
        assert_eq!(world.agents[1].health, MAX_HEALTH);
    }

    #[test]
    fn test_hitscan_first_match_only() {
        let mut world = duel_world(WeaponKind::Pistol, 100.0);
        // A further target on the same line
        world
            .agents
            .push(Agent::new(Vec2::new(450.0, 300.0), std::f32::consts::PI, WeaponKind::Pistol));

        let event = fire(&mut world, 0).unwrap();
        assert_eq!(event.target, 1);
        assert_eq!(world.agents[1].health, MAX_HEALTH - 20.0);
        assert_eq!(world.agents[2].health, MAX_HEALTH);
    }

    #[test]
    fn test_hitscan_nearest_first_ignores_dead() {
        let mut world = duel_world(WeaponKind::Pistol, 100.0);
        world.agents[1].alive = false;
        world
            .agents
            .push(Agent::new(Vec2::new(450.0, 300.0), std::f32::consts::PI, WeaponKind::Pistol));

        let event = fire(&mut world, 0).unwrap();
        // The dead body in front never soaks the shot
        assert_eq!(event.target, 2);
    }

    #[test]
    fn test_dead_shooter_cannot_fire() {
        let mut world = duel_world(WeaponKind::Pistol, 100.0);
        world.agents[0].alive = false;
        assert!(fire(&mut world, 0).is_none());
        assert_eq!(world.agents[0].cooldown_steps, 0);
    }

    #[test]
    fn test_projectile_spawn_offset_and_flight() {
        let mut world = duel_world(WeaponKind::Blaster, 300.0);
        assert!(fire(&mut world, 0).is_none());
        assert_eq!(world.projectiles.len(), 1);

        let p = &world.projectiles[0];
        assert_eq!(p.owner, 0);
        // Spawned past the shooter's radius, moving along its heading
        assert!((p.pos.x - (200.0 + AGENT_RADIUS + 2.0)).abs() < 1e-4);
        assert!((p.vel.x - 12.0).abs() < 1e-4);

        // 300 units of separation minus the spawn offset, at 12/step with a
        // 30-unit combined hit radius: lands within ~21 steps
        let mut hits = Vec::new();
        for _ in 0..25 {
            hits.extend(advance_projectiles(&mut world));
            if !hits.is_empty() {
                break;
            }
        }
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, 1);
        assert_eq!(world.agents[1].health, MAX_HEALTH - 20.0);
        // Bullet consumed on hit
        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_never_hits_owner() {
        let mut world = duel_world(WeaponKind::Blaster, 300.0);
        fire(&mut world, 0);
        // Reverse the bullet straight back through its owner
        world.projectiles[0].vel = Vec2::new(-12.0, 0.0);
        for _ in 0..10 {
            let hits = advance_projectiles(&mut world);
            assert!(hits.is_empty());
        }
        assert_eq!(world.agents[0].health, MAX_HEALTH);
    }

    #[test]
    fn test_projectile_expires_by_lifetime() {
        let mut world = duel_world(WeaponKind::Blaster, 300.0);
        fire(&mut world, 0);
        // Point it somewhere harmless and slow so only lifetime retires it
        world.projectiles[0].vel = Vec2::new(0.0, 0.1);
        for _ in 0..50 {
            advance_projectiles(&mut world);
        }
        assert_eq!(world.projectiles.len(), 1);
        advance_projectiles(&mut world);
        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_stopped_by_wall() {
        let mut world = duel_world(WeaponKind::Blaster, 300.0);
        world.walls.push(Wall { x: 300.0, y: 200.0, width: 30.0, height: 200.0 });
        fire(&mut world, 0);
        for _ in 0..30 {
            let hits = advance_projectiles(&mut world);
            assert!(hits.is_empty());
        }
        assert!(world.projectiles.is_empty());
        assert_eq!(world.agents[1].health, MAX_HEALTH);
    }

    #[test]
    fn test_projectile_leaves_bounds() {
        let mut world = WorldState::new(0);
        world.agents.push(Agent::new(Vec2::new(850.0, 300.0), 0.0, WeaponKind::Blaster));
        world.agents.push(Agent::new(Vec2::new(100.0, 100.0), 0.0, WeaponKind::Blaster));
        fire(&mut world, 0);
        for _ in 0..10 {
            advance_projectiles(&mut world);
        }
        assert!(world.projectiles.is_empty());
    }
}
