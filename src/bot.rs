//! Scripted opponents
//!
//! Simple reactive policies for the non-learning side of an arena. They
//! live outside the simulation core and drive it through the same action
//! integers a trained policy would, using only the core's cheap distance,
//! angle and line-of-sight queries.
//!
//! Each bot owns its own RNG so its noise never perturbs the world's
//! random stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::angle_diff;
use crate::sim::episode::{encode_action, Action};
use crate::sim::movement::{MoveDir, MoveIntent, StrafeDir, TurnDir};
use crate::sim::state::WorldState;

/// Opponent skill tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    /// Stands still and never fires; a target dummy
    Static,
    #[default]
    Easy,
    Hard,
}

/// Tier tuning: aim noise, engagement envelope, trigger discipline
struct Tuning {
    aim_noise: f32,
    advance_beyond: f32,
    retreat_within: f32,
    fire_cone: f32,
    fire_range: f32,
    /// Probability of firing when lined up
    trigger_chance: f64,
    /// Probability of a random strafe impulse
    strafe_chance: f64,
}

impl Difficulty {
    fn tuning(self) -> Option<Tuning> {
        match self {
            Difficulty::Static => None,
            Difficulty::Easy => Some(Tuning {
                aim_noise: 0.5,
                advance_beyond: 300.0,
                retreat_within: 100.0,
                fire_cone: 0.5,
                fire_range: 500.0,
                trigger_chance: 0.05,
                strafe_chance: 0.1,
            }),
            Difficulty::Hard => Some(Tuning {
                aim_noise: 0.1,
                advance_beyond: 250.0,
                retreat_within: 150.0,
                fire_cone: 0.3,
                fire_range: 600.0,
                trigger_chance: 1.0,
                strafe_chance: 0.2,
            }),
        }
    }
}

/// A scripted opponent controlling one agent index
#[derive(Debug)]
pub struct ScriptedBot {
    pub agent_idx: usize,
    pub difficulty: Difficulty,
    rng: Pcg32,
}

impl ScriptedBot {
    pub fn new(agent_idx: usize, difficulty: Difficulty, seed: u64) -> Self {
        Self { agent_idx, difficulty, rng: Pcg32::seed_from_u64(seed) }
    }

    /// Pick this step's action against the nearest living opponent.
    /// Returns the all-noop action when dead or with nobody left to fight.
    pub fn act(&mut self, world: &WorldState) -> i64 {
        let me = &world.agents[self.agent_idx];
        let Some(tuning) = self.difficulty.tuning() else {
            return 0;
        };
        if !me.alive {
            return 0;
        }

        let target = world
            .agents
            .iter()
            .enumerate()
            .filter(|(idx, a)| *idx != self.agent_idx && a.alive)
            .min_by(|a, b| {
                me.pos.distance(a.1.pos).total_cmp(&me.pos.distance(b.1.pos))
            })
            .map(|(idx, _)| idx);
        let Some(target_idx) = target else {
            return 0;
        };

        let dist = world.distance_between(self.agent_idx, target_idx);
        let desired = world.angle_to(self.agent_idx, target_idx);
        let aim_err = self.rng.random_range(-tuning.aim_noise..=tuning.aim_noise);
        let diff = angle_diff(desired + aim_err, me.angle);

        let movement = if dist > tuning.advance_beyond {
            MoveDir::Forward
        } else if dist < tuning.retreat_within {
            MoveDir::Backward
        } else {
            MoveDir::None
        };

        let strafe = if self.rng.random_bool(tuning.strafe_chance) {
            if self.rng.random_bool(0.5) { StrafeDir::Left } else { StrafeDir::Right }
        } else {
            StrafeDir::None
        };

        let turn = if diff > 0.1 {
            TurnDir::Left
        } else if diff < -0.1 {
            TurnDir::Right
        } else {
            TurnDir::None
        };

        let lined_up = diff.abs() < tuning.fire_cone
            && dist < tuning.fire_range
            && world.line_of_sight(self.agent_idx, target_idx);
        let shoot = lined_up && self.rng.random_bool(tuning.trigger_chance);

        encode_action(Action {
            intent: MoveIntent { movement, strafe, turn },
            shoot,
        })
    }
}
