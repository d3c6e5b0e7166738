//! Reporters that publish store snapshots.
//!
//! A [`Reporter`] receives read-only snapshots of the three aggregates and
//! logs its own failures; reporting never fails the caller.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod console;
mod error;
mod influx;
mod registry;

pub use console::ConsoleReporter;
pub use error::Error;
pub use influx::{DEFAULT_METRIC, InfluxConfig, InfluxReporter};
pub use registry::{ReporterConfig, ReporterFactory, ReporterRegistry};

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::join_all;
use kage_store::{BrokerMetadata, BrokerOffsets, ConsumerOffsets};

/// A sink for store snapshots.
#[async_trait]
pub trait Reporter
where
    Self: Send + Sync + 'static,
{
    /// Reports the partition boundary offsets.
    async fn report_broker_offsets(&self, offsets: &BrokerOffsets);

    /// Reports the partition replication metadata.
    async fn report_broker_metadata(&self, metadata: &BrokerMetadata);

    /// Reports the consumer group offsets and lag.
    async fn report_consumer_offsets(&self, offsets: &ConsumerOffsets);
}

/// Named reporters that each receive every snapshot.
#[derive(Default)]
pub struct Reporters {
    reporters: Vec<(String, Box<dyn Reporter>)>,
}

impl Reporters {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reporter.
    pub fn add(&mut self, name: impl Into<String>, reporter: Box<dyn Reporter>) {
        self.reporters.push((name.into(), reporter));
    }

    /// Names of the reporters in the order they were added.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.reporters.iter().map(|(name, _)| name.as_str())
    }

    /// Number of reporters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    /// Whether there are no reporters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    /// Reports the partition boundary offsets to every reporter.
    pub async fn report_broker_offsets(&self, offsets: &BrokerOffsets) {
        join_all(
            self.reporters
                .iter()
                .map(|(_, reporter)| reporter.report_broker_offsets(offsets)),
        )
        .await;
    }

    /// Reports the partition replication metadata to every reporter.
    pub async fn report_broker_metadata(&self, metadata: &BrokerMetadata) {
        join_all(
            self.reporters
                .iter()
                .map(|(_, reporter)| reporter.report_broker_metadata(metadata)),
        )
        .await;
    }

    /// Reports the consumer group offsets to every reporter.
    pub async fn report_consumer_offsets(&self, offsets: &ConsumerOffsets) {
        join_all(
            self.reporters
                .iter()
                .map(|(_, reporter)| reporter.report_consumer_offsets(offsets)),
        )
        .await;
    }
}

/// Entries of a snapshot map ordered by key.
pub(crate) fn sorted<V>(map: &HashMap<String, V>) -> Vec<(&str, &V)> {
    let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
    entries.sort_unstable_by_key(|(k, _)| *k);
    entries
}
