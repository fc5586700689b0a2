//! capstand — the capstan scaling daemon.
//!
//! Assembles the HTTP control-plane clients and the scaling engine from a
//! `capstan.toml`, then drives read-decide-act passes:
//!
//! ```text
//! capstand once --config capstan.toml
//! capstand run --config capstan.toml --interval 60
//! ```
//!
//! `once` executes a single pass and prints the structured report as JSON
//! ("scaling not required" is a success). `run` repeats passes on a fixed
//! interval until ctrl-c; a failed pass is logged and the next interval
//! retries by virtue of the schedule — there are no in-process retries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};

use capstan_cloud::{HttpFleetControl, HttpMetricSource, HttpTaskGroupControl};
use capstan_core::CapstanConfig;
use capstan_scaler::{Outcome, ScalingEngine};

type HttpEngine = ScalingEngine<HttpMetricSource, HttpFleetControl, HttpTaskGroupControl>;

#[derive(Parser)]
#[command(name = "capstand", about = "Capstan scaling daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single scaling pass and print the report as JSON.
    Once {
        /// Path to capstan.toml.
        #[arg(long, default_value = "capstan.toml")]
        config: PathBuf,
    },

    /// Run scaling passes on a fixed interval until ctrl-c.
    Run {
        /// Path to capstan.toml.
        #[arg(long, default_value = "capstan.toml")]
        config: PathBuf,

        /// Seconds between passes.
        #[arg(long, default_value = "60")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,capstand=debug,capstan=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Once { config } => run_once(&config).await,
        Command::Run { config, interval } => {
            run_scheduled(&config, Duration::from_secs(interval)).await
        }
    }
}

/// Load the config and assemble an engine over the HTTP control planes.
fn build_engine(path: &Path) -> anyhow::Result<HttpEngine> {
    let config = CapstanConfig::from_file(path)?;
    let policy = config.scaling_policy()?;
    let window = config.metric_window()?;

    info!(
        fleet = %config.fleet.fleet_name,
        group = %config.tasks.group_name,
        "scaling engine configured"
    );

    Ok(ScalingEngine::new(
        HttpMetricSource::new(&config.metric),
        HttpFleetControl::new(&config.fleet),
        HttpTaskGroupControl::new(&config.tasks),
        policy,
        window,
    )?)
}

async fn run_once(path: &Path) -> anyhow::Result<()> {
    let engine = build_engine(path)?;
    let outcome = engine.run_pass().await?;

    if outcome == Outcome::NoActionNeeded {
        info!("scaling not required");
    }

    println!("{}", serde_json::to_string_pretty(&outcome.report())?);
    Ok(())
}

async fn run_scheduled(path: &Path, interval: Duration) -> anyhow::Result<()> {
    let engine = build_engine(path)?;

    info!(interval_secs = interval.as_secs(), "capstan daemon started");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                match engine.run_pass().await {
                    Ok(Outcome::Scaled { decision, report }) => {
                        info!(
                            ?decision,
                            fleet_updated = report.fleet_updated,
                            tasks_updated = report.tasks_updated,
                            "scaling pass complete"
                        );
                    }
                    Ok(Outcome::NoActionNeeded) => {
                        info!("scaling not required");
                    }
                    // The schedule is the retry policy: log and let the
                    // next interval re-run the pass.
                    Err(e) => {
                        error!(error = %e, "scaling pass failed");
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                info!("capstan daemon stopped");
                break;
            }
        }
    }

    Ok(())
}
