//! Environment configuration and validation
//!
//! Recognized options for constructing an arena. Validation happens once at
//! construction; a config that passes `validate` can never put the episode
//! controller in an undefined state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::weapon::WeaponKind;

/// Fewest agents an arena supports (termination assumes a potential opponent)
pub const MIN_AGENTS: usize = 2;
/// Most agents an arena supports
pub const MAX_AGENTS: usize = 5;

/// Which weapons agents carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponRoster {
    /// Every agent carries the same weapon
    Fixed(WeaponKind),
    /// The full registry, assigned round-robin by agent index on reset
    FullSet,
}

impl Default for WeaponRoster {
    fn default() -> Self {
        WeaponRoster::Fixed(WeaponKind::Pistol)
    }
}

impl WeaponRoster {
    /// Weapon for a given agent index under this roster
    pub fn weapon_for(&self, agent_idx: usize) -> WeaponKind {
        match self {
            WeaponRoster::Fixed(kind) => *kind,
            WeaponRoster::FullSet => WeaponKind::ALL[agent_idx % WeaponKind::ALL.len()],
        }
    }
}

/// Invalid configuration at construction
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("arena needs between {MIN_AGENTS} and {MAX_AGENTS} agents, got {0}")]
    BadAgentCount(usize),
    #[error("max_steps must be at least 1")]
    ZeroMaxSteps,
    #[error("step duration must be positive, got {0} ms")]
    BadStepDuration(f32),
}

/// Arena environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Total agents in the arena, self-play or learner-plus-scripted alike
    pub num_agents: usize,
    /// Episode step budget; the episode always terminates by this step
    pub max_steps: u32,
    /// Weapon assignment
    pub roster: WeaponRoster,
    /// Step duration in milliseconds, used only to convert weapon cooldown
    /// times into step counts
    pub step_ms: f32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_agents: 2,
            max_steps: 600,
            roster: WeaponRoster::default(),
            step_ms: crate::consts::STEP_MS,
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_agents < MIN_AGENTS || self.num_agents > MAX_AGENTS {
            return Err(ConfigError::BadAgentCount(self.num_agents));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroMaxSteps);
        }
        if !(self.step_ms > 0.0) {
            return Err(ConfigError::BadStepDuration(self.step_ms));
        }
        Ok(())
    }
}
