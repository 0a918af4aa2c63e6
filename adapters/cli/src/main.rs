#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the overworld in a terminal.

mod battle;
mod input;
mod terminal;

use std::{env, io};

use anyhow::{Context, Result};
use clap::Parser;
use overworld_system_session::{Progress, Session, SessionConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{battle::Announcer, input::LineInput, terminal::Terminal};

/// Environment variable that fixes the random seed of a run.
const SEED_VAR: &str = "OVERWORLD_SEED";

/// Explore a procedurally generated overworld of trainers.
#[derive(Debug, Parser)]
#[command(name = "overworld")]
struct Args {
    /// Trainers placed on every newly generated map.
    #[arg(long = "numtrainers", value_name = "COUNT", default_value_t = 10)]
    num_trainers: usize,
}

/// Entry point for the overworld command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let seed = seed()?;
    log::info!("starting with seed {seed} and {} trainers per map", args.num_trainers);
    let rng = ChaCha8Rng::seed_from_u64(seed);

    let stdin = io::stdin();
    let input = LineInput::new(stdin.lock(), Terminal::new(io::stdout()));
    let battles = Announcer::new(Terminal::new(io::stdout()));
    let config = SessionConfig {
        trainers_per_map: args.num_trainers,
    };
    let mut session =
        Session::generate(config, rng, input, battles).context("failed to start the session")?;

    let mut events = Vec::new();
    while session.step(&mut events)? == Progress::Running {
        events.clear();
    }
    println!("Goodbye.");
    Ok(())
}

fn seed() -> Result<u64> {
    match env::var(SEED_VAR) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{SEED_VAR} must be an unsigned integer, got {value:?}")),
        Err(env::VarError::NotPresent) => Ok(rand::thread_rng().gen()),
        Err(error) => Err(error).with_context(|| format!("failed to read {SEED_VAR}")),
    }
}
