use clap::Parser;
use pulse_feed::cli::{Cli, Commands};
use pulse_feed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _telemetry = pulse_feed::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting dashboard feed client");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {}", config.feed.url);
            println!(
                "  Backoff: {}ms x{}, cap {}ms, {} attempts",
                config.backoff.initial_delay_ms,
                config.backoff.multiplier,
                config.backoff.max_delay_ms,
                config.backoff.max_attempts
            );
            println!(
                "  Analysis: {} ({})",
                if config.analysis.enabled {
                    "enabled"
                } else {
                    "disabled"
                },
                config.analysis.url
            );
            println!(
                "  Telemetry: {} ({})",
                config.telemetry.log_level, config.telemetry.log_format
            );
        }
    }

    Ok(())
}
