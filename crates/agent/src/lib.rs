//! Wires a cluster monitor, a state store and reporters into a long-running agent.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod app;
mod config;
mod error;
mod serde_duration;
mod server;

pub use app::Application;
pub use config::{
    AgentConfig, ConfigArgs, DEFAULT_COLLECT_INTERVAL, DEFAULT_PORT, DEFAULT_REPORT_INTERVAL,
    IntervalsConfig, KafkaConfig, LogConfig, ServerConfig,
};
pub use error::Error;
pub use server::router;

use std::future::{Future, IntoFuture};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use kage_cluster::ClusterClient;
use kage_store::StateStore;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

/// Runs the agent until `shutdown_token` is cancelled, then closes the application.
///
/// Collection and reporting run on their own tickers; the status server is
/// started when enabled.
///
/// # Errors
///
/// Returns an error if the monitor cannot start or the status server cannot bind.
pub async fn run_agent<S: StateStore, C: ClusterClient>(
    application: Arc<Application<S, C>>,
    config: &AgentConfig,
    shutdown_token: CancellationToken,
) -> Result<(), Error> {
    let task_tracker = TaskTracker::new();

    let listener = if config.server.enabled {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
        Some(
            tokio::net::TcpListener::bind(addr)
                .await
                .map_err(Error::Bind)?,
        )
    } else {
        None
    };

    application.start()?;

    let app = application.clone();
    spawn_ticker(
        &task_tracker,
        "collect",
        config.intervals.collect,
        shutdown_token.clone(),
        move || {
            let app = app.clone();
            async move {
                app.collect().await;
            }
        },
    );

    let app = application.clone();
    spawn_ticker(
        &task_tracker,
        "report",
        config.intervals.report,
        shutdown_token.clone(),
        move || {
            let app = app.clone();
            async move { app.report().await }
        },
    );

    if let Some(listener) = listener {
        info!("starting status server on port {}", config.server.port);

        let router = server::router(application.clone());
        let server_shutdown = shutdown_token.clone();
        task_tracker.spawn(async move {
            tokio::select! {
                e = axum::serve(listener, router.into_make_service()).into_future() => {
                    error!("status server exited {:?}", e);
                }
                () = server_shutdown.cancelled() => {}
            };
        });
    }

    task_tracker.close();
    info!(
        "agent running, collecting every {} and reporting every {}",
        serde_duration::format(config.intervals.collect),
        serde_duration::format(config.intervals.report)
    );

    shutdown_token.cancelled().await;

    info!("agent shutting down...");
    task_tracker.wait().await;
    application.close().await;
    info!("agent shutdown");

    Ok(())
}

/// Runs `tick` every `period`, the first time one period from now.
fn spawn_ticker<F, Fut>(
    task_tracker: &TaskTracker,
    name: &'static str,
    period: Duration,
    shutdown_token: CancellationToken,
    tick: F,
) where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    task_tracker.spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    debug!("{name} tick");
                    tick().await;
                }
                () = shutdown_token.cancelled() => {
                    debug!("{name} ticker shutting down");
                    break;
                }
            }
        }
    });
}
