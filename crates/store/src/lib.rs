//! Abstract interface for the aggregation store fed by the cluster monitor.
//!
//! Collectors push [`Fact`]s through a [`FactSender`]; a store folds them into
//! three aggregates and hands out independent snapshots of each.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod aggregate;
mod fact;

pub use aggregate::*;
pub use fact::*;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

/// Broker node id.
pub type BrokerId = i32;

/// Partition index within a topic.
pub type PartitionId = i32;

/// Write-only handle into a store's fact channel.
#[derive(Clone, Debug)]
pub struct FactSender {
    tx: mpsc::Sender<Fact>,
}

impl FactSender {
    /// Wraps the sending half of a store's channel.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<Fact>) -> Self {
        Self { tx }
    }

    /// Queues a fact, waiting while the channel is full.
    ///
    /// Returns `false` if the store is closed and the fact was discarded.
    pub async fn send(&self, fact: impl Into<Fact> + Send) -> bool {
        if self.tx.send(fact.into()).await.is_err() {
            warn!("state store is closed, discarding fact");
            return false;
        }

        true
    }

    /// Whether the store stopped accepting facts.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A single-writer store of cluster state.
///
/// Snapshot methods return deep copies: later writes never change a snapshot
/// already handed out.
#[async_trait]
pub trait StateStore
where
    Self: Send + Sync + 'static,
{
    /// A handle collectors use to push facts.
    fn sender(&self) -> FactSender;

    /// Snapshot of the partition boundary offsets.
    fn broker_offsets(&self) -> BrokerOffsets;

    /// Snapshot of the partition replication metadata.
    fn broker_metadata(&self) -> BrokerMetadata;

    /// Snapshot of the consumer group offsets and lag.
    fn consumer_offsets(&self) -> ConsumerOffsets;

    /// Stops accepting facts. Calling it again has no effect.
    async fn close(&self);
}
