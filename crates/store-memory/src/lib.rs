//! In-memory implementation of the cluster state store.
//!
//! One writer task owns every mutation: facts arrive over a bounded channel
//! and are folded into three aggregates, each behind its own reader/writer
//! lock. Readers clone under the read lock, so a snapshot is a consistent
//! point in time for that aggregate and is never touched by later writes.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::Error;

use std::sync::Arc;

use async_trait::async_trait;
use kage_store::{
    BrokerMetadata, BrokerOffsets, ConsumerOffsets, Fact, FactSender, NO_COMMITTED_OFFSET, StateStore,
    apply_broker_metadata, apply_broker_offset, apply_consumer_offset,
};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace};

/// Default number of facts that can queue before collectors wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Configuration for the memory store.
#[derive(Clone, Debug)]
pub struct MemoryStoreConfig {
    /// Capacity of the fact channel.
    pub channel_capacity: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Default)]
struct Aggregates {
    broker_offsets: RwLock<BrokerOffsets>,
    broker_metadata: RwLock<BrokerMetadata>,
    consumer_offsets: RwLock<ConsumerOffsets>,
}

impl Aggregates {
    fn apply(&self, fact: Fact) {
        match fact {
            Fact::BrokerOffset(offset) => {
                if usize::try_from(offset.partition)
                    .map_or(true, |p| p >= offset.topic_partition_count)
                {
                    debug!(
                        topic = %offset.topic,
                        partition = offset.partition,
                        count = offset.topic_partition_count,
                        "offset for partition outside the reported partition count"
                    );
                }
                apply_broker_offset(&mut self.broker_offsets.write(), offset);
            }
            Fact::BrokerMetadata(metadata) => {
                apply_broker_metadata(&mut self.broker_metadata.write(), metadata);
            }
            Fact::ConsumerOffset(offset) => {
                if offset.offset == NO_COMMITTED_OFFSET {
                    trace!(
                        group = %offset.group,
                        topic = %offset.topic,
                        partition = offset.partition,
                        "dropping uncommitted consumer offset"
                    );
                    return;
                }

                // Lag must see the broker offsets as of this exact fact.
                let mut consumers = self.consumer_offsets.write();
                let broker_offsets = self.broker_offsets.read();
                apply_consumer_offset(&mut consumers, &broker_offsets, offset);
            }
        }
    }
}

/// In-memory state store.
#[derive(Debug)]
pub struct MemoryStore {
    aggregates: Arc<Aggregates>,
    sender: FactSender,
    shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl MemoryStore {
    /// Creates a store with the default configuration and starts its writer task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::spawn(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a store with a custom configuration and starts its writer task.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel capacity is zero.
    pub fn with_config(config: MemoryStoreConfig) -> Result<Self, Error> {
        if config.channel_capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self::spawn(config.channel_capacity))
    }

    fn spawn(channel_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(channel_capacity);
        let aggregates = Arc::new(Aggregates::default());
        let shutdown_token = CancellationToken::new();
        let task_tracker = TaskTracker::new();

        task_tracker.spawn(apply_facts(
            aggregates.clone(),
            rx,
            shutdown_token.clone(),
        ));
        task_tracker.close();

        Self {
            aggregates,
            sender: FactSender::new(tx),
            shutdown_token,
            task_tracker,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer loop: the only place aggregates are mutated.
async fn apply_facts(
    aggregates: Arc<Aggregates>,
    mut rx: mpsc::Receiver<Fact>,
    shutdown_token: CancellationToken,
) {
    loop {
        tokio::select! {
            fact = rx.recv() => match fact {
                Some(fact) => aggregates.apply(fact),
                None => break,
            },
            () = shutdown_token.cancelled() => break,
        }
    }

    // Refuse new facts but keep the ones already queued.
    rx.close();
    while let Some(fact) = rx.recv().await {
        aggregates.apply(fact);
    }

    debug!("state store writer exiting");
}

#[async_trait]
impl StateStore for MemoryStore {
    fn sender(&self) -> FactSender {
        self.sender.clone()
    }

    fn broker_offsets(&self) -> BrokerOffsets {
        self.aggregates.broker_offsets.read().clone()
    }

    fn broker_metadata(&self) -> BrokerMetadata {
        self.aggregates.broker_metadata.read().clone()
    }

    fn consumer_offsets(&self) -> ConsumerOffsets {
        self.aggregates.consumer_offsets.read().clone()
    }

    async fn close(&self) {
        if !self.shutdown_token.is_cancelled() {
            info!("state store shutting down...");
        }

        self.shutdown_token.cancel();
        self.task_tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use kage_store::{Boundary, BrokerPartitionOffset};

    #[tokio::test]
    async fn test_zero_capacity_is_rejected() {
        let result = MemoryStore::with_config(MemoryStoreConfig {
            channel_capacity: 0,
        });

        assert!(matches!(result, Err(Error::ZeroCapacity)));
    }

    #[tokio::test]
    async fn test_close_applies_queued_facts() {
        let store = MemoryStore::new();
        let sender = store.sender();

        for partition in 0..3 {
            assert!(
                sender
                    .send(BrokerPartitionOffset {
                        topic: "orders".to_string(),
                        partition,
                        boundary: Boundary::Newest,
                        offset: 10,
                        timestamp_ms: 0,
                        topic_partition_count: 3,
                    })
                    .await
            );
        }

        store.close().await;
        store.close().await;

        assert_eq!(store.broker_offsets()["orders"].len(), 3);
        assert!(sender.is_closed());
    }
}
