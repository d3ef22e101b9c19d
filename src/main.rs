//! Arena Bots entry point
//!
//! Headless self-play demo: scripted bots fight a handful of episodes and
//! the outcomes are logged. Doubles as an executable smoke test of the
//! reset/step contract.

use arena_bots::bot::{Difficulty, ScriptedBot};
use arena_bots::config::WeaponRoster;
use arena_bots::sim::weapon::WeaponKind;
use arena_bots::{ArenaEnv, EnvConfig};

const EPISODES: u64 = 5;
const NUM_AGENTS: usize = 3;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EnvConfig {
        num_agents: NUM_AGENTS,
        max_steps: 600,
        roster: WeaponRoster::Fixed(WeaponKind::Pistol),
        ..Default::default()
    };
    let mut env = match ArenaEnv::new(config) {
        Ok(env) => env,
        Err(err) => {
            log::error!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    for episode in 0..EPISODES {
        let seed = 1000 + episode;
        env.reset(seed);

        let mut bots: Vec<ScriptedBot> = (0..NUM_AGENTS)
            .map(|idx| ScriptedBot::new(idx, Difficulty::Hard, seed.wrapping_add(idx as u64)))
            .collect();

        let mut total_damage = vec![0.0_f32; NUM_AGENTS];
        let mut steps = 0;
        loop {
            let actions: Vec<i64> = bots.iter_mut().map(|b| b.act(env.world())).collect();
            let result = env.step(&actions);
            steps += 1;

            for (idx, outcome) in result.outcomes.iter().enumerate() {
                total_damage[idx] += outcome.damage_dealt;
            }

            if result.done {
                let winner = result.outcomes.iter().position(|o| o.won);
                match winner {
                    Some(idx) => log::info!(
                        "episode {episode} (seed {seed}): agent {idx} won after {steps} steps"
                    ),
                    None => log::info!(
                        "episode {episode} (seed {seed}): draw after {steps} steps"
                    ),
                }
                for (idx, dmg) in total_damage.iter().enumerate() {
                    log::info!("  agent {idx}: {dmg:.0} damage dealt");
                }
                break;
            }
        }
    }

    // Final world snapshot, the same view a renderer would consume
    match serde_json::to_string_pretty(&env.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("snapshot serialization failed: {err}"),
    }
}
