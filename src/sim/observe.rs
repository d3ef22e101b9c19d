//! Per-agent observation encoding
//!
//! Builds the fixed-length feature vector an external policy consumes.
//! Every feature is normalized into [-1, 1], the layout never changes with
//! the number of living agents, and encoding has no effect on world state.
//!
//! Other agents are sorted dead-last, then by distance, so living threats
//! always occupy the earliest slots. Sorting by raw index instead makes
//! policies fixate on nearby corpses; the ordering is load-bearing.

use glam::Vec2;

use crate::angle_diff;
use crate::consts::*;
use crate::sim::geom::cast_ray;
use crate::sim::state::WorldState;
use crate::sim::weapon::{FireModel, WEAPON_COUNT};

/// Features per other-agent slot:
/// alive, rel x, rel y, distance, cos(rel angle), sin(rel angle), health
const AGENT_SLOT_WIDTH: usize = 7;
/// Features per threat-projectile slot: rel x, rel y, rel vx, rel vy
const PROJECTILE_SLOT_WIDTH: usize = 4;
/// Cooldown normalization ceiling, in steps
const COOLDOWN_NORM: f32 = 20.0;

/// Fixed observation layout for one environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObsLayout {
    /// Whether the self block carries velocity + cooldown and the threat
    /// projectile block is present (the projectile weapon variant)
    pub track_projectiles: bool,
}

impl ObsLayout {
    /// Layout for a roster: projectile extensions appear as soon as any
    /// equipped weapon resolves via projectiles.
    pub fn for_world(world: &WorldState) -> Self {
        let track = world
            .agents
            .iter()
            .any(|a| matches!(a.weapon.spec().model, FireModel::Projectile { .. }));
        Self { track_projectiles: track }
    }

    /// Total feature-vector length
    pub fn len(&self) -> usize {
        let self_block = 5 + WEAPON_COUNT + if self.track_projectiles { 3 } else { 0 };
        let rays = NUM_RAYS;
        let others = OBS_AGENT_SLOTS * AGENT_SLOT_WIDTH;
        let threats = if self.track_projectiles {
            OBS_PROJECTILE_SLOTS * PROJECTILE_SLOT_WIDTH
        } else {
            0
        };
        self_block + rays + others + threats
    }
}

/// Encode the observation vector for `agent_idx`
pub fn encode(world: &WorldState, layout: ObsLayout, agent_idx: usize) -> Vec<f32> {
    let agent = &world.agents[agent_idx];
    let bounds = world.bounds;
    let max_dist = world.diagonal();
    let mut obs = Vec::with_capacity(layout.len());

    // Self block
    obs.push((agent.pos.x / bounds.x) * 2.0 - 1.0);
    obs.push((agent.pos.y / bounds.y) * 2.0 - 1.0);
    obs.push(agent.angle.cos());
    obs.push(agent.angle.sin());
    obs.push((agent.health / MAX_HEALTH) * 2.0 - 1.0);

    let mut one_hot = [0.0_f32; WEAPON_COUNT];
    one_hot[agent.weapon.index()] = 1.0;
    obs.extend_from_slice(&one_hot);

    if layout.track_projectiles {
        obs.push((agent.vel.x / MOVE_SPEED).clamp(-1.0, 1.0));
        obs.push((agent.vel.y / MOVE_SPEED).clamp(-1.0, 1.0));
        obs.push((agent.cooldown_steps as f32 / COOLDOWN_NORM).clamp(0.0, 1.0));
    }

    // Ray block: evenly spaced sweep relative to the agent's heading
    for i in 0..NUM_RAYS {
        let theta = agent.angle + (std::f32::consts::TAU * i as f32) / NUM_RAYS as f32;
        let d = cast_ray(agent.pos.x, agent.pos.y, theta, &world.walls, bounds, max_dist, RAY_MARCH_STEP);
        obs.push((d / max_dist) * 2.0 - 1.0);
    }

    // Other-agents block, dead-last then nearest-first
    let mut others: Vec<(bool, f32, usize)> = world
        .agents
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != agent_idx)
        .map(|(idx, a)| (!a.alive, agent.pos.distance(a.pos), idx))
        .collect();
    others.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    for slot in 0..OBS_AGENT_SLOTS {
        match others.get(slot) {
            Some(&(_, dist, idx)) => {
                let other = &world.agents[idx];
                let d = other.pos - agent.pos;
                let rel_angle = angle_diff(d.y.atan2(d.x), agent.angle);
                obs.push(if other.alive { 1.0 } else { 0.0 });
                // Component-wise over the full bound keeps these in [-1, 1]
                obs.push(d.x / bounds.x);
                obs.push(d.y / bounds.y);
                obs.push((dist / max_dist) * 2.0 - 1.0);
                obs.push(rel_angle.cos());
                obs.push(rel_angle.sin());
                obs.push((other.health / MAX_HEALTH) * 2.0 - 1.0);
            }
            None => obs.extend_from_slice(&[0.0; AGENT_SLOT_WIDTH]),
        }
    }

    // Threat-projectile block: nearest hostile bullets inside the threat
    // radius; the agent's own bullets are not threats
    if layout.track_projectiles {
        let mut threats: Vec<(f32, Vec2, Vec2)> = world
            .projectiles
            .iter()
            .filter(|p| p.active && p.owner != agent_idx)
            .map(|p| (agent.pos.distance(p.pos), p.pos - agent.pos, p.vel))
            .filter(|(dist, _, _)| *dist < THREAT_RADIUS)
            .collect();
        threats.sort_by(|a, b| a.0.total_cmp(&b.0));

        for slot in 0..OBS_PROJECTILE_SLOTS {
            match threats.get(slot) {
                Some(&(_, rel, vel)) => {
                    obs.push(rel.x / bounds.x);
                    obs.push(rel.y / bounds.y);
                    obs.push(projectile_vel_norm(vel.x));
                    obs.push(projectile_vel_norm(vel.y));
                }
                None => obs.extend_from_slice(&[0.0; PROJECTILE_SLOT_WIDTH]),
            }
        }
    }

    debug_assert_eq!(obs.len(), layout.len());
    obs
}

/// Normalize a projectile velocity component by the fastest registered
/// bullet speed
#[inline]
fn projectile_vel_norm(v: f32) -> f32 {
    let max_speed = crate::sim::weapon::WeaponKind::ALL
        .iter()
        .filter_map(|k| match k.spec().model {
            FireModel::Projectile { speed, .. } => Some(speed),
            FireModel::Hitscan { .. } => None,
        })
        .fold(1.0_f32, f32::max);
    (v / max_speed).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Agent, Projectile, Wall};
    use crate::sim::weapon::WeaponKind;

    fn world_with(weapon: WeaponKind, positions: &[(f32, f32)]) -> WorldState {
        let mut world = WorldState::new(0);
        for &(x, y) in positions {
            world.agents.push(Agent::new(Vec2::new(x, y), 0.0, weapon));
        }
        world
    }

    #[test]
    fn test_layout_lengths() {
        let hitscan = ObsLayout { track_projectiles: false };
        // 5 self + 4 one-hot + 8 rays + 4*7 others
        assert_eq!(hitscan.len(), 45);

        let projectile = ObsLayout { track_projectiles: true };
        // adds vx, vy, cooldown and 5*4 threat slots
        assert_eq!(projectile.len(), 68);
    }

    #[test]
    fn test_layout_detected_from_roster() {
        let world = world_with(WeaponKind::Pistol, &[(100.0, 100.0), (300.0, 300.0)]);
        assert!(!ObsLayout::for_world(&world).track_projectiles);

        let world = world_with(WeaponKind::Blaster, &[(100.0, 100.0), (300.0, 300.0)]);
        assert!(ObsLayout::for_world(&world).track_projectiles);
    }

    #[test]
    fn test_shape_invariant_under_deaths() {
        let mut world = world_with(
            WeaponKind::Pistol,
            &[(100.0, 100.0), (300.0, 300.0), (500.0, 400.0), (700.0, 200.0)],
        );
        let layout = ObsLayout::for_world(&world);
        let before = encode(&world, layout, 0).len();

        world.agents[1].alive = false;
        world.agents[2].alive = false;
        world.agents[3].alive = false;
        assert_eq!(encode(&world, layout, 0).len(), before);
    }

    #[test]
    fn test_all_features_bounded() {
        let mut world = world_with(
            WeaponKind::Blaster,
            &[(40.0, 40.0), (860.0, 560.0), (450.0, 300.0)],
        );
        world.walls.push(Wall { x: 400.0, y: 100.0, width: 40.0, height: 300.0 });
        world.projectiles.push(Projectile {
            pos: Vec2::new(430.0, 300.0),
            vel: Vec2::new(-12.0, 0.0),
            owner: 1,
            age_steps: 3,
            active: true,
        });

        let layout = ObsLayout::for_world(&world);
        for idx in 0..world.agents.len() {
            for (i, f) in encode(&world, layout, idx).iter().enumerate() {
                assert!((-1.0..=1.0).contains(f), "feature {i} = {f} out of range");
            }
        }
    }

    #[test]
    fn test_dead_sorted_behind_living() {
        let mut world = world_with(
            WeaponKind::Pistol,
            &[(100.0, 300.0), (150.0, 300.0), (600.0, 300.0)],
        );
        // The nearest other agent is dead; the living one is far away
        world.agents[1].alive = false;

        let layout = ObsLayout::for_world(&world);
        let obs = encode(&world, layout, 0);

        let others_base = 5 + WEAPON_COUNT + NUM_RAYS;
        let slot0_alive = obs[others_base];
        let slot1_alive = obs[others_base + AGENT_SLOT_WIDTH];
        assert_eq!(slot0_alive, 1.0, "living agent must come first");
        assert_eq!(slot1_alive, 0.0);

        // Within the first slot, the relative x points at the far living
        // agent, not the nearby corpse
        let slot0_rel_x = obs[others_base + 1];
        assert!(slot0_rel_x > 0.5, "rel x = {slot0_rel_x}");
    }

    #[test]
    fn test_slots_distance_ascending_within_groups() {
        let mut world = world_with(
            WeaponKind::Pistol,
            &[
                (100.0, 300.0),
                (700.0, 300.0),
                (300.0, 300.0),
                (850.0, 300.0),
                (500.0, 300.0),
            ],
        );
        // One dead agent nearer than every living one
        world.agents[2].alive = false;

        let layout = ObsLayout::for_world(&world);
        let obs = encode(&world, layout, 0);
        let others_base = 5 + WEAPON_COUNT + NUM_RAYS;

        let slot = |i: usize| {
            let base = others_base + i * AGENT_SLOT_WIDTH;
            (obs[base], obs[base + 3]) // (alive flag, normalized distance)
        };

        // Living agents fill the first slots in ascending distance, the
        // dead one comes last
        assert_eq!(slot(0).0, 1.0);
        assert_eq!(slot(1).0, 1.0);
        assert_eq!(slot(2).0, 1.0);
        assert_eq!(slot(3).0, 0.0);
        assert!(slot(0).1 < slot(1).1);
        assert!(slot(1).1 < slot(2).1);
        // The dead agent is physically nearest, so its normalized distance
        // is smaller than every living slot's despite sorting last
        assert!(slot(3).1 < slot(0).1);
    }

    #[test]
    fn test_empty_slots_zero_filled() {
        let world = world_with(WeaponKind::Pistol, &[(100.0, 100.0), (300.0, 300.0)]);
        let layout = ObsLayout::for_world(&world);
        let obs = encode(&world, layout, 0);

        // Slots 1..4 of the others block are unused and must be zero
        let others_base = 5 + WEAPON_COUNT + NUM_RAYS;
        for slot in 1..OBS_AGENT_SLOTS {
            let base = others_base + slot * AGENT_SLOT_WIDTH;
            for i in 0..AGENT_SLOT_WIDTH {
                assert_eq!(obs[base + i], 0.0);
            }
        }
    }

    #[test]
    fn test_own_projectiles_not_threats() {
        let mut world = world_with(WeaponKind::Blaster, &[(100.0, 300.0), (500.0, 300.0)]);
        world.projectiles.push(Projectile {
            pos: Vec2::new(150.0, 300.0),
            vel: Vec2::new(12.0, 0.0),
            owner: 0,
            age_steps: 1,
            active: true,
        });

        let layout = ObsLayout::for_world(&world);
        let obs = encode(&world, layout, 0);
        let threat_base = layout.len() - OBS_PROJECTILE_SLOTS * PROJECTILE_SLOT_WIDTH;
        assert!(obs[threat_base..].iter().all(|&f| f == 0.0));

        // The same bullet is a threat to the other agent
        let obs = encode(&world, layout, 1);
        assert!(obs[threat_base..].iter().any(|&f| f != 0.0));
    }

    #[test]
    fn test_encode_has_no_side_effects() {
        let mut world = world_with(WeaponKind::Pistol, &[(100.0, 100.0), (300.0, 300.0)]);
        world.walls.push(Wall { x: 400.0, y: 100.0, width: 40.0, height: 300.0 });
        let layout = ObsLayout::for_world(&world);

        let snapshot = format!("{world:?}");
        let _ = encode(&world, layout, 0);
        let _ = encode(&world, layout, 1);
        assert_eq!(snapshot, format!("{world:?}"));
    }
}
