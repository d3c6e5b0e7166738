//! The cluster monitor: background metadata refresh and serialized collection passes.

use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

use kage_cluster::{Broker, BrokerId, ClusterClient};
use kage_store::FactSender;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::broker_metadata::BrokerMetadataCollector;
use crate::broker_offsets::BrokerOffsetCollector;
use crate::collector::CollectionSummary;
use crate::consumer_offsets::ConsumerOffsetCollector;
use crate::error::Error;
use crate::filter::PatternFilter;
use crate::topology::TopologyResolver;

/// Default interval between full metadata refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(120);

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the cluster monitor.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Topic patterns excluded from broker offset and metadata collection.
    pub ignore_topics: Vec<String>,

    /// Consumer group patterns excluded from consumer collection.
    pub ignore_groups: Vec<String>,

    /// Interval of the background metadata refresh.
    pub refresh_interval: Duration,

    /// Whether [`Monitor::start`] also runs a first collection pass.
    pub collect_on_start: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            ignore_topics: Vec::new(),
            ignore_groups: Vec::new(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            collect_on_start: true,
        }
    }
}

/// Connection state of one broker.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BrokerStatus {
    /// Broker node id.
    pub id: BrokerId,

    /// Whether the broker connection is up.
    pub connected: bool,
}

/// Summaries of the three collectors from one pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PassSummary {
    /// Broker offset collection.
    pub broker_offsets: CollectionSummary,

    /// Broker metadata collection.
    pub broker_metadata: CollectionSummary,

    /// Consumer offset collection.
    pub consumer_offsets: CollectionSummary,
}

#[derive(Default)]
struct BootableState {
    started: bool,
    closed: bool,
    refresh_task: Option<JoinHandle<()>>,
    start_pass: Option<JoinHandle<()>>,
    shutdown_signal: Option<oneshot::Sender<()>>,
}

/// Polls a cluster and streams what it finds into a state store.
pub struct Monitor<C: ClusterClient> {
    client: Arc<C>,
    config: Arc<MonitorConfig>,
    resolver: TopologyResolver<C>,
    broker_offsets: Arc<BrokerOffsetCollector<C>>,
    broker_metadata: Arc<BrokerMetadataCollector<C>>,
    consumer_offsets: Arc<ConsumerOffsetCollector<C>>,
    collect_lock: Arc<AsyncMutex<()>>,
    bootable_state: Arc<Mutex<BootableState>>,
}

impl<C: ClusterClient> Monitor<C> {
    /// Creates a monitor over an already connected client.
    pub fn new(client: Arc<C>, facts: FactSender, config: MonitorConfig) -> Self {
        let ignore_topics = PatternFilter::new(&config.ignore_topics);
        let ignore_groups = PatternFilter::new(&config.ignore_groups);
        let resolver = TopologyResolver::new(client.clone());

        info!(
            "creating cluster monitor with metadata refresh every {:?}",
            config.refresh_interval
        );

        Self {
            broker_offsets: Arc::new(BrokerOffsetCollector::new(
                client.clone(),
                resolver.clone(),
                facts.clone(),
                ignore_topics.clone(),
            )),
            broker_metadata: Arc::new(BrokerMetadataCollector::new(
                client.clone(),
                facts.clone(),
                ignore_topics,
            )),
            consumer_offsets: Arc::new(ConsumerOffsetCollector::new(
                client.clone(),
                resolver.clone(),
                facts,
                ignore_groups,
            )),
            client,
            config: Arc::new(config),
            resolver,
            collect_lock: Arc::new(AsyncMutex::new(())),
            bootable_state: Arc::new(Mutex::new(BootableState::default())),
        }
    }

    /// Starts the background metadata refresh, and a first collection pass if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor was already started or has been closed.
    pub fn start(&self) -> Result<(), Error> {
        let mut state = self.bootable_state.lock();
        if state.closed {
            return Err(Error::Closed);
        }
        if state.started {
            return Err(Error::AlreadyStarted);
        }
        state.started = true;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let resolver = self.resolver.clone();
        let refresh_interval = self.config.refresh_interval;

        let task = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(Instant::now() + refresh_interval, refresh_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        debug!("refreshing cluster metadata");
                        resolver.refresh_metadata(&[]).await;
                    }
                    _ = &mut shutdown_rx => {
                        info!("metadata refresh task shutting down");
                        break;
                    }
                }
            }
        });

        state.refresh_task = Some(task);
        state.shutdown_signal = Some(shutdown_tx);

        if self.config.collect_on_start {
            let monitor = self.clone();
            state.start_pass = Some(tokio::spawn(async move {
                monitor.collect().await;
            }));
        }
        drop(state);

        info!("cluster monitor started");
        Ok(())
    }

    /// Connection state of every known broker.
    #[must_use]
    pub fn brokers(&self) -> Vec<BrokerStatus> {
        self.client
            .brokers()
            .into_iter()
            .map(|broker| BrokerStatus {
                id: broker.id(),
                connected: matches!(broker.connected(), Ok(true)),
            })
            .collect()
    }

    /// Whether at least one broker is connected.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.client
            .brokers()
            .iter()
            .any(|broker| matches!(broker.connected(), Ok(true)))
    }

    /// Runs one collection pass: broker offsets, then metadata, then consumer offsets.
    ///
    /// Concurrent calls queue behind each other. Once the monitor is closed no
    /// further collector starts, and a pass on a closed monitor is empty.
    pub async fn collect(&self) -> PassSummary {
        let _guard = self.collect_lock.lock().await;
        let mut summary = PassSummary::default();

        if self.is_closed() {
            debug!("cluster monitor is closed, skipping collection");
            return summary;
        }
        summary.broker_offsets = self.broker_offsets.collect().await;

        if self.is_closed() {
            return summary;
        }
        summary.broker_metadata = self.broker_metadata.collect().await;

        if self.is_closed() {
            return summary;
        }
        summary.consumer_offsets = self.consumer_offsets.collect().await;

        let PassSummary {
            broker_offsets,
            broker_metadata,
            consumer_offsets,
        } = summary;
        debug!(
            ?broker_offsets,
            ?broker_metadata,
            ?consumer_offsets,
            "collection pass finished"
        );

        summary
    }

    fn is_closed(&self) -> bool {
        self.bootable_state.lock().closed
    }

    /// Stops the refresh task and the start-up pass, then closes the client.
    /// Calling it again has no effect.
    ///
    /// Requests already sent by a running pass are left to finish.
    pub async fn close(&self) {
        let (task, start_pass) = {
            let mut state = self.bootable_state.lock();
            if state.closed {
                return;
            }
            state.closed = true;

            if let Some(shutdown_signal) = state.shutdown_signal.take() {
                let _ = shutdown_signal.send(());
            }
            (state.refresh_task.take(), state.start_pass.take())
        };

        if let Some(start_pass) = start_pass {
            start_pass.abort();
            match start_pass.await {
                Err(e) if e.is_cancelled() => debug!("start-up collection pass cancelled"),
                Err(e) => warn!("start-up collection pass failed: {}", e),
                Ok(()) => debug!("start-up collection pass completed"),
            }
        }

        if let Some(task) = task {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
                Ok(Ok(())) => debug!("metadata refresh task completed"),
                Ok(Err(e)) => warn!("metadata refresh task failed: {}", e),
                Err(_) => error!("metadata refresh task did not shut down within timeout"),
            }
        }

        if let Err(e) = self.client.close().await {
            warn!(error = %e, "cannot close cluster client");
        }

        info!("cluster monitor closed");
    }
}

impl<C: ClusterClient> Clone for Monitor<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            resolver: self.resolver.clone(),
            broker_offsets: self.broker_offsets.clone(),
            broker_metadata: self.broker_metadata.clone(),
            consumer_offsets: self.consumer_offsets.clone(),
            collect_lock: self.collect_lock.clone(),
            bootable_state: self.bootable_state.clone(),
        }
    }
}

impl<C: ClusterClient> Debug for Monitor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.bootable_state.lock();
        f.debug_struct("Monitor")
            .field("config", &self.config)
            .field("started", &state.started)
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}
