use kage_cluster::ClusterClient;
use kage_monitor::{BrokerStatus, Monitor, PassSummary};
use kage_reporter::Reporters;
use kage_store::StateStore;
use tracing::{debug, info};

use crate::Error;

/// Ties the monitor, the store and the reporters together.
pub struct Application<S: StateStore, C: ClusterClient> {
    store: S,
    monitor: Monitor<C>,
    reporters: Reporters,
}

impl<S: StateStore, C: ClusterClient> Application<S, C> {
    /// Creates an application. The monitor must already feed `store`.
    pub const fn new(store: S, monitor: Monitor<C>, reporters: Reporters) -> Self {
        Self {
            store,
            monitor,
            reporters,
        }
    }

    /// Starts the monitor's background work.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor was already started or closed.
    pub fn start(&self) -> Result<(), Error> {
        self.monitor.start()?;
        Ok(())
    }

    /// Runs one collection pass.
    pub async fn collect(&self) -> PassSummary {
        self.monitor.collect().await
    }

    /// Reports the current snapshots to every reporter.
    pub async fn report(&self) {
        debug!("reporting snapshots to {} reporters", self.reporters.len());

        self.reporters
            .report_broker_offsets(&self.store.broker_offsets())
            .await;
        self.reporters
            .report_broker_metadata(&self.store.broker_metadata())
            .await;
        self.reporters
            .report_consumer_offsets(&self.store.consumer_offsets())
            .await;
    }

    /// Whether at least one broker is connected.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.monitor.is_healthy()
    }

    /// Connection state of every known broker.
    #[must_use]
    pub fn brokers(&self) -> Vec<BrokerStatus> {
        self.monitor.brokers()
    }

    /// Closes the store, then the monitor.
    pub async fn close(&self) {
        self.store.close().await;
        self.monitor.close().await;
        info!("application closed");
    }
}
