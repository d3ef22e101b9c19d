//! Episode orchestration: reset, step, termination
//!
//! The controller owns the world for one episode at a time and advances it
//! in a fixed order every step: cooldowns, action decode, movement in
//! ascending agent index, fire attempts in ascending agent index, one
//! projectile pass, then termination. It reports raw outcome signals and
//! leaves reward shaping to the training harness.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::EnvConfig;
use crate::sim::movement::{self, MoveDir, MoveIntent, StrafeDir, TurnDir};
use crate::sim::observe::{self, ObsLayout};
use crate::sim::spawn;
use crate::sim::state::{Agent, WorldState};
use crate::sim::weapon;
use crate::snapshot::WorldSnapshot;

/// Action-space radices, least significant first: shoot, turn, strafe, move
const N_SHOOT: i64 = 2;
const N_TURN: i64 = 3;
const N_STRAFE: i64 = 3;
const N_MOVE: i64 = 3;
/// Size of the discrete action space
pub const ACTION_SPACE: i64 = N_SHOOT * N_TURN * N_STRAFE * N_MOVE;

/// One agent's decoded action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Action {
    pub intent: MoveIntent,
    pub shoot: bool,
}

/// Decode a discrete action integer, mixed radix with shoot least
/// significant. Negative and oversized inputs are normalized with a
/// euclidean remainder first, so decoding is total.
pub fn decode_action(action: i64) -> Action {
    let mut a = action.rem_euclid(ACTION_SPACE);

    let shoot = a % N_SHOOT == 1;
    a /= N_SHOOT;
    let turn = match a % N_TURN {
        1 => TurnDir::Left,
        2 => TurnDir::Right,
        _ => TurnDir::None,
    };
    a /= N_TURN;
    let strafe = match a % N_STRAFE {
        1 => StrafeDir::Left,
        2 => StrafeDir::Right,
        _ => StrafeDir::None,
    };
    a /= N_STRAFE;
    let movement = match a % N_MOVE {
        1 => MoveDir::Forward,
        2 => MoveDir::Backward,
        _ => MoveDir::None,
    };

    Action { intent: MoveIntent { movement, strafe, turn }, shoot }
}

/// Encode an action back into its integer form (inverse of `decode_action`)
pub fn encode_action(action: Action) -> i64 {
    let shoot = action.shoot as i64;
    let turn = match action.intent.turn {
        TurnDir::None => 0,
        TurnDir::Left => 1,
        TurnDir::Right => 2,
    };
    let strafe = match action.intent.strafe {
        StrafeDir::None => 0,
        StrafeDir::Left => 1,
        StrafeDir::Right => 2,
    };
    let movement = match action.intent.movement {
        MoveDir::None => 0,
        MoveDir::Forward => 1,
        MoveDir::Backward => 2,
    };
    ((movement * N_STRAFE + strafe) * N_TURN + turn) * N_SHOOT + shoot
}

/// Episode lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Constructed but never reset
    Unstarted,
    Active,
    Terminal,
}

/// Raw per-agent outcome signals for one step. The controller never folds
/// these into a scalar reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    /// Opponents this agent killed this step
    pub kills: u32,
    /// This agent died this step
    pub died: bool,
    /// This agent is the sole survivor as of this step
    pub won: bool,
}

/// What `step` returns: per-agent observations and outcomes plus the shared
/// done flag
#[derive(Debug, Clone)]
pub struct StepResult {
    pub observations: Vec<Vec<f32>>,
    pub outcomes: Vec<StepOutcome>,
    pub done: bool,
}

/// The arena environment: the `reset`/`step` contract the training harness
/// drives.
#[derive(Debug, Clone)]
pub struct ArenaEnv {
    config: EnvConfig,
    world: WorldState,
    layout: ObsLayout,
    phase: Phase,
}

impl ArenaEnv {
    /// Build an environment. Invalid configurations are rejected here, not
    /// discovered mid-episode.
    pub fn new(config: EnvConfig) -> Result<Self, crate::config::ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            world: WorldState::new(0),
            layout: ObsLayout { track_projectiles: false },
            phase: Phase::Unstarted,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Observation vector length under the current configuration
    pub fn observation_len(&self) -> usize {
        self.layout.len()
    }

    /// Size of the discrete per-agent action space
    pub fn action_space(&self) -> i64 {
        ACTION_SPACE
    }

    /// Read-only world access for collaborators (scripted opponents)
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable world access for staging scenarios in tests and tooling.
    /// External mutation mid-episode voids seed reproducibility.
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// Start a fresh episode: seed the RNG, regenerate walls, spawn every
    /// agent alive at full health with a random heading, zero the step
    /// counter. Returns the initial observation per agent.
    pub fn reset(&mut self, seed: u64) -> Vec<Vec<f32>> {
        let mut world = WorldState::new(seed);
        world.step_ms = self.config.step_ms;
        world.walls = spawn::generate_walls(&mut world.rng, world.bounds);

        for idx in 0..self.config.num_agents {
            let pos =
                spawn::sample_spawn_position(&mut world.rng, world.bounds, &world.walls, &world.agents);
            let angle = world.rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
            let weapon = self.config.roster.weapon_for(idx);
            world.agents.push(Agent::new(pos, angle, weapon));
        }

        log::info!(
            "episode reset: seed={seed}, {} agents, {} walls",
            world.agents.len(),
            world.walls.len()
        );

        self.layout = ObsLayout::for_world(&world);
        self.world = world;
        self.phase = Phase::Active;
        self.observations()
    }

    /// Reset without a caller-chosen seed: one is drawn from OS entropy and
    /// then owned by this instance, so replaying it still reproduces the
    /// episode exactly.
    pub fn reset_from_entropy(&mut self) -> Vec<Vec<f32>> {
        let seed = rand::rng().random::<u64>();
        self.reset(seed)
    }

    /// Seed used by the current episode
    pub fn seed(&self) -> u64 {
        self.world.seed
    }

    /// Advance the episode by one step. `actions` must hold one integer per
    /// agent; entries for dead agents are ignored.
    pub fn step(&mut self, actions: &[i64]) -> StepResult {
        assert_eq!(
            actions.len(),
            self.world.agents.len(),
            "one action per agent required"
        );

        self.world.step_count += 1;
        let mut outcomes = vec![StepOutcome::default(); self.world.agents.len()];

        // 1. Cooldowns tick down for everyone, floored at zero
        for agent in &mut self.world.agents {
            agent.cooldown_steps = agent.cooldown_steps.saturating_sub(1);
        }

        // 2. Decode every action up front
        let decoded: Vec<Action> = actions.iter().map(|&a| decode_action(a)).collect();

        // 3. Movement, ascending index
        for (idx, action) in decoded.iter().enumerate() {
            movement::apply_movement(&mut self.world, idx, action.intent);
        }

        // 4. Fire attempts, ascending index, then one projectile pass
        for (idx, action) in decoded.iter().enumerate() {
            if !action.shoot {
                continue;
            }
            if let Some(hit) = weapon::fire(&mut self.world, idx) {
                record_hit(&mut outcomes, hit);
            }
        }
        for hit in weapon::advance_projectiles(&mut self.world) {
            record_hit(&mut outcomes, hit);
        }

        // 5. Termination: last one standing, or the step budget ran out
        let alive = self.world.alive_count();
        let done = alive <= 1 || self.world.step_count >= self.config.max_steps;
        if done {
            self.phase = Phase::Terminal;
            if alive == 1
                && let Some(winner) = self.world.agents.iter().position(|a| a.alive)
            {
                outcomes[winner].won = true;
            }
            log::debug!(
                "episode done at step {}: {alive} alive",
                self.world.step_count
            );
        }

        StepResult { observations: self.observations(), outcomes, done }
    }

    /// Encode every agent's observation against the current world
    fn observations(&self) -> Vec<Vec<f32>> {
        (0..self.world.agents.len())
            .map(|idx| observe::encode(&self.world, self.layout, idx))
            .collect()
    }

    /// Read-only snapshot for rendering collaborators
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world)
    }
}

fn record_hit(outcomes: &mut [StepOutcome], hit: weapon::HitEvent) {
    outcomes[hit.shooter].damage_dealt += hit.damage;
    outcomes[hit.target].damage_taken += hit.damage;
    if hit.lethal {
        outcomes[hit.shooter].kills += 1;
        outcomes[hit.target].died = true;
    }
}
