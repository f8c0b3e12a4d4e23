use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use std::time::Duration;
use tracing::{error, info};

use token_dash_collector::config::get_config;
use token_dash_collector::logging::init_logging;
use token_dash_collector::{ClaudeCodeCollector, Collector, UsageEvent};

const MEASUREMENT: &str = "token_usage";

#[derive(Parser)]
#[command(name = "token-dash-collector")]
#[command(about = "Token usage telemetry collector for LLM tooling logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single collection cycle and print the events
    Once {
        /// Output events as JSON instead of line protocol
        #[arg(long)]
        json: bool,
    },
    /// Run collection cycles on a fixed interval until interrupted
    Run {
        /// Seconds between cycles (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Show what the collector can see without emitting anything
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging();

    match cli.command.unwrap_or(Commands::Once { json: false }) {
        Commands::Once { json } => {
            let mut collector = ClaudeCodeCollector::new();
            match collector.collect().await {
                Ok(events) => {
                    print_events(&events, json)?;
                    collector.close();
                    Ok(())
                }
                Err(e) => handle_error(e, json),
            }
        }
        Commands::Run { interval } => {
            let secs = interval.unwrap_or_else(|| get_config().collection.interval_secs);
            run_loop(secs).await
        }
        Commands::Status => {
            let collector = ClaudeCodeCollector::new();
            println!("{}", serde_json::to_string_pretty(&collector.summary())?);
            Ok(())
        }
    }
}

/// Scheduled collection until ctrl-c. A failed cycle is logged and retried
/// on the next tick; nothing here is fatal.
async fn run_loop(interval_secs: u64) -> Result<()> {
    let mut collector = ClaudeCodeCollector::new();
    info!(
        interval_secs,
        configured = collector.is_configured(),
        collector = collector.name(),
        "collector starting"
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                match collector.collect().await {
                    Ok(events) => {
                        info!(events = events.len(), "collection cycle complete");
                        print_events(&events, false)?;
                    }
                    Err(e) => {
                        error!(error = %e, "collection cycle failed");
                    }
                }
            }
        }
    }

    collector.close();
    info!("shutdown complete");
    Ok(())
}

fn print_events(events: &[UsageEvent], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(events)?);
    } else {
        for event in events {
            println!("{}", event.to_line_protocol(MEASUREMENT));
        }
    }
    Ok(())
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "error": e.to_string() }));
    } else {
        eprintln!("Error: {}", e);
    }
    process::exit(1);
}
