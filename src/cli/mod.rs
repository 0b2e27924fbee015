//! CLI interface for pulse-feed
//!
//! Provides subcommands for:
//! - `run`: Stream live prices from the dashboard feed
//! - `config`: Show the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pulse-feed")]
#[command(about = "Resilient WebSocket client for the Crypto Pulse dashboard feed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream live prices from the dashboard feed
    Run(RunArgs),
    /// Show the effective configuration
    Config,
}
