//! Cartwheel CLI - Cart command replay tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply a script of cart commands and print the resulting cart
//! cartwheel replay cart.yaml
//!
//! # Same, as JSON
//! cartwheel replay cart.json --format json
//!
//! # Print the built-in demo script
//! cartwheel scenario > demo.yaml
//! ```
//!
//! # Commands
//!
//! - `replay` - Apply a YAML or JSON list of cart commands to an empty cart
//! - `scenario` - Print a demo command script as YAML

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "cartwheel")]
#[command(author, version, about = "Cartwheel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a command script to an empty cart and print the result
    Replay {
        /// Script path (.yaml/.yml for YAML, anything else is read as JSON)
        script: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the demo command script as YAML
    Scenario,
}

/// How the resulting cart is printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable cart listing
    Text,
    /// Cart state with totals as JSON
    Json,
}

fn main() {
    // Logs go to stderr so stdout stays clean for the printed cart
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cartwheel_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Replay { script, format } => commands::replay::run(&script, format, &mut out),
        Commands::Scenario => commands::replay::print_scenario(&mut out),
    }
}
