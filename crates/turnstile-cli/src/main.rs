//! Turnstile unified CLI.
//!
//! Discrete-event simulation for queueing-network models.
//!
//! # Quick Start
//!
//! ```bash
//! # Run a model and print its statistics summary
//! turnstile run clinic.json
//!
//! # Run every replication the model declares
//! turnstile run clinic.json --replications 10
//!
//! # Check the engine against queueing theory
//! turnstile validate --threshold 0.05
//! ```

mod commands;
mod style;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Turnstile - discrete-event simulation for queueing networks.
#[derive(Parser)]
#[command(name = "turnstile")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Run a model description and print the statistics summary.
    Run {
        /// Path to the model JSON file.
        path: String,

        /// Override the model's replication count.
        #[arg(short, long)]
        replications: Option<u32>,

        /// Record and print the event trace.
        #[arg(long)]
        trace: bool,
    },

    /// Validate the engine against M/M/1 and M/M/c theory.
    Validate {
        /// Relative-error threshold for each metric.
        #[arg(short, long, default_value_t = 0.05)]
        threshold: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => commands::version::run(),
        Commands::Run {
            path,
            replications,
            trace,
        } => commands::run::run(&path, replications, trace),
        Commands::Validate { threshold } => commands::validate::run(threshold),
    }
}
