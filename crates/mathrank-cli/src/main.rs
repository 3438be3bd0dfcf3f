//! mathrank CLI: rank three arithmetic expressions against the clock.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use mathrank_core::expression::Difficulty;
use mathrank_core::session::GameMode;

mod commands;

#[derive(Parser)]
#[command(name = "mathrank", version, about = "Rank arithmetic expressions from lowest to highest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a session in the terminal
    Play {
        /// Game mode: main, practice-15, practice-20
        #[arg(long)]
        mode: Option<GameMode>,

        /// Difficulty: medium, hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// RNG seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,

        /// Seconds per round
        #[arg(long)]
        round_seconds: Option<u32>,

        /// Do not write a session report
        #[arg(long)]
        no_save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print freshly generated rounds
    Generate {
        /// Difficulty: medium, hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Number of rounds
        #[arg(long, default_value = "5")]
        count: u32,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Auto-play a full session with a simulated player
    Simulate {
        /// Game mode: main, practice-15, practice-20
        #[arg(long)]
        mode: Option<GameMode>,

        /// Difficulty: medium, hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Probability that the simulated player ranks a round correctly
        #[arg(long, default_value = "0.85")]
        accuracy: f64,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the session report to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a saved session report
    Summary {
        /// Report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mathrank=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            mode,
            difficulty,
            seed,
            round_seconds,
            no_save,
            config,
        } => commands::play::execute(mode, difficulty, seed, round_seconds, no_save, config).await,
        Commands::Generate {
            difficulty,
            count,
            seed,
            format,
            config,
        } => commands::generate::execute(difficulty, count, seed, format, config),
        Commands::Simulate {
            mode,
            difficulty,
            accuracy,
            seed,
            output,
            format,
            config,
        } => commands::simulate::execute(mode, difficulty, accuracy, seed, output, format, config),
        Commands::Summary { report, format } => commands::summary::execute(report, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
