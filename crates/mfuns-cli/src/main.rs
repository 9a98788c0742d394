//! Mfuns CLI - Headless Player Driver
//!
//! Features:
//! - Preset composition from JSON config files
//! - Scripted playback against a headless video
//! - Event log in text or JSON

use clap::{Parser, Subcommand};
use mfuns_plugins::Preset;
use output::OutputFormat;
use std::path::PathBuf;

mod commands;
mod output;
mod script;

/// Mfuns CLI - Player plugin toolkit
#[derive(Parser)]
#[command(name = "mfuns-cli")]
#[command(version)]
#[command(about = "Compose and exercise Mfuns player configurations", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a player and run a playback script
    Run {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Preset to compose against (basic, standard); overrides the file
        #[arg(short, long)]
        preset: Option<Preset>,

        /// Comma separated steps, e.g. "play,seek:30,webfull,fullscreen,ended"
        #[arg(short, long, default_value = "")]
        script: String,
    },

    /// Print the composed configuration
    Config {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Preset to compose against (basic, standard); overrides the file
        #[arg(short, long)]
        preset: Option<Preset>,
    },

    /// List presets and built-in component names
    Presets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr so reports stay parseable.
    let level = if cli.verbose { "debug" } else { "warn" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr);
    if OutputFormat::from(cli.format.as_str()) == OutputFormat::Json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    mfuns_core::init();

    match cli.command {
        Commands::Run { config, preset, script } => {
            commands::run(config.as_deref(), preset, &script, &cli.format).await?;
        }
        Commands::Config { config, preset } => {
            commands::config(config.as_deref(), preset, &cli.format)?;
        }
        Commands::Presets => {
            commands::presets(&cli.format)?;
        }
    }

    Ok(())
}
