//! Local development agent running against a mock cluster described by a YAML fixture.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kage_agent::{AgentConfig, Application, ConfigArgs, run_agent};
use kage_cluster_mock::MockCluster;
use kage_monitor::Monitor;
use kage_reporter::ReporterRegistry;
use kage_store::StateStore;
use kage_store_memory::MemoryStore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Agent library error
    #[error(transparent)]
    Agent(#[from] kage_agent::Error),

    /// Cluster fixture or bootstrap error
    #[error("mock cluster error: {0}")]
    Fixture(#[from] kage_cluster_mock::Error),

    /// Reporter error
    #[error(transparent)]
    Reporter(#[from] kage_reporter::Error),
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML file describing the mock cluster
    #[arg(long, env = "KAGE_CLUSTER_FIXTURE")]
    cluster_fixture: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let config = AgentConfig::load(&args.config)?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .init();

    info!(
        "using mock cluster from {}, bootstrapping from {}",
        args.cluster_fixture.display(),
        config.kafka.brokers.join(",")
    );
    let cluster = MockCluster::from_fixture_file(&args.cluster_fixture)?;
    cluster.bootstrap(&config.kafka.brokers)?;

    let reporters =
        ReporterRegistry::with_defaults().build(&config.reporters, &config.reporter_config())?;

    let store = MemoryStore::new();
    let monitor = Monitor::new(Arc::new(cluster), store.sender(), config.monitor_config());
    let application = Arc::new(Application::new(store, monitor, reporters));

    // Create shared shutdown token
    let shutdown_token = CancellationToken::new();

    // Set up signal handlers
    let signal_shutdown_token = shutdown_token.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            match (
                signal(SignalKind::terminate()),
                signal(SignalKind::interrupt()),
            ) {
                (Ok(mut sigterm), Ok(mut sigint)) => {
                    tokio::select! {
                        _ = sigterm.recv() => info!("received SIGTERM"),
                        _ = sigint.recv() => info!("received SIGINT"),
                    }
                }
                _ => {
                    error!("cannot install signal handlers, falling back to ctrl-c");
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("received interrupt signal");
        }

        info!("shutting down");
        signal_shutdown_token.cancel();
    });

    run_agent(application, &config, shutdown_token).await?;

    Ok(())
}
