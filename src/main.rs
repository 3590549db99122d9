//! ucb-go: a 9x9 stone-capture game engine.
//!
//! ## Usage
//!
//! - `ucb-go` - Play a self-play game and print the result
//! - `ucb-go selfplay` - Same, explicitly
//! - `ucb-go gtp` - Start a GTP server for GUI integration

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ucb_go::board::BoardState;
use ucb_go::constants::{DEFAULT_EXPLORATION, DEFAULT_SEARCH_SECS, KOMI, MAX_GAME_MOVES};
use ucb_go::driver::{Budget, PlayConfig, play_game};
use ucb_go::gtp::GtpEngine;
use ucb_go::mcts::{Mcts, MctsConfig, Policy};

/// ucb-go: a 9x9 stone-capture game engine driven by UCB1 tree search
#[derive(Parser)]
#[command(name = "ucb-go")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Seconds of search per move
    #[arg(long, global = true, default_value_t = DEFAULT_SEARCH_SECS)]
    seconds: f64,

    /// Search a fixed number of iterations per move instead of a time budget
    #[arg(long, global = true)]
    iterations: Option<u64>,

    /// How the final move is picked from the root's children
    #[arg(long, global = true, value_enum, default_value_t = Policy::Max)]
    policy: Policy,

    /// UCB1 exploration constant
    #[arg(long, global = true, default_value_t = DEFAULT_EXPLORATION)]
    exploration: f64,

    /// Seed for the search's random source
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Points added to White's score
    #[arg(long, global = true, default_value_t = KOMI)]
    komi: f64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Let the engine play a whole game against itself
    Selfplay {
        /// Plies after which the game is abandoned
        #[arg(long, default_value_t = MAX_GAME_MOVES)]
        max_moves: usize,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Logs go to stderr so GTP responses on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    fn mcts_config(&self) -> Result<MctsConfig> {
        if !(self.exploration.is_finite() && self.exploration >= 0.0) {
            bail!("exploration must be finite and >= 0 (got {})", self.exploration);
        }
        Ok(MctsConfig {
            exploration: self.exploration,
            seed: self.seed,
        })
    }

    fn play_config(&self, max_moves: usize) -> Result<PlayConfig> {
        let budget = match self.iterations {
            Some(n) => Budget::Iterations(n),
            None => Budget::Time(
                Duration::try_from_secs_f64(self.seconds)
                    .with_context(|| format!("invalid --seconds {}", self.seconds))?,
            ),
        };
        Ok(PlayConfig {
            budget,
            policy: self.policy,
            max_moves,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.as_ref() {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::new(cli.mcts_config()?, cli.play_config(MAX_GAME_MOVES)?)
                .with_komi(cli.komi);
            engine
                .run(std::io::stdin().lock(), std::io::stdout())
                .context("GTP session failed")?;
        }
        Some(Commands::Selfplay { max_moves }) => run_selfplay(&cli, *max_moves)?,
        None => run_selfplay(&cli, MAX_GAME_MOVES)?,
    }
    Ok(())
}

fn run_selfplay(cli: &Cli, max_moves: usize) -> Result<()> {
    let mut mcts = Mcts::new(cli.mcts_config()?);
    let cfg = cli.play_config(max_moves)?;
    let start = BoardState::with_komi(cli.komi);

    let record = play_game(&mut mcts, start, &cfg, |state, _| {
        println!("{state}");
    })
    .context("self-play failed")?;

    info!(nodes = mcts.arena().len(), "game over");
    match record.winner {
        Some(score) if score > 0.0 => println!("Black wins by {score}"),
        Some(score) if score < 0.0 => println!("White wins by {}", -score),
        Some(_) => println!("Draw"),
        None => println!("Game abandoned after {} moves", record.state.history().len()),
    }
    Ok(())
}
