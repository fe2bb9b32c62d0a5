//! Prisoner's Dilemma in the terminal
//!
//! Play one of six computer strategies over a random number of rounds;
//! wins are tallied per strategy across runs.

mod console;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dilemma_engine::{FileCareerStore, MemoryStore, RoundConfig, SeededRng, SessionController};

use crate::console::ConsolePort;

#[derive(Parser, Debug)]
#[command(name = "dilemma", about = "Iterated Prisoner's Dilemma against a computer strategy")]
struct Args {
    /// Career record file
    #[arg(long, default_value = "scores.txt")]
    record: PathBuf,

    /// Seed for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for per-session JSON transcripts
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Skip the instructions screen
    #[arg(long)]
    no_intro: bool,

    /// Keep the career record in memory only
    #[arg(long)]
    ephemeral: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("{:<32}{:<32}", "session seed", seed);

    if !args.no_intro {
        console::print_instructions(&RoundConfig::standard());
    }

    let port = ConsolePort::new(args.transcript.clone());
    let mut controller = SessionController::new(port, SeededRng::from_seed(seed));

    let summaries = if args.ephemeral {
        controller.run(&MemoryStore::default())?
    } else {
        let store = FileCareerStore::new(&args.record);
        controller
            .run(&store)
            .with_context(|| format!("playing with career record {}", store.path().display()))?
    };

    let wins = summaries.iter().filter(|s| s.player_won()).count();
    println!("Thanks for playing: {} won out of {} games.", wins, summaries.len());
    Ok(())
}
