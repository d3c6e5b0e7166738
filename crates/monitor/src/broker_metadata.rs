//! Collection of partition leadership and replica state.

use std::sync::Arc;

use kage_cluster::{Broker, ClusterClient};
use kage_store::{BrokerPartitionMetadata, FactSender, timestamp_ms};
use tracing::{debug, error, warn};

use crate::collector::CollectionSummary;
use crate::filter::PatternFilter;

/// Collects replica and ISR state from a single connected broker.
pub struct BrokerMetadataCollector<C: ClusterClient> {
    client: Arc<C>,
    facts: FactSender,
    ignore_topics: PatternFilter,
}

impl<C: ClusterClient> BrokerMetadataCollector<C> {
    /// Creates a collector.
    pub const fn new(client: Arc<C>, facts: FactSender, ignore_topics: PatternFilter) -> Self {
        Self {
            client,
            facts,
            ignore_topics,
        }
    }

    /// Runs one pass against the first connected broker.
    pub async fn collect(&self) -> CollectionSummary {
        let Some(broker) = self
            .client
            .brokers()
            .into_iter()
            .find(|broker| matches!(broker.connected(), Ok(true)))
        else {
            error!("no connected brokers found to collect metadata");
            return CollectionSummary::aborted();
        };

        let broker_id = broker.id();
        let response = match broker.metadata().await {
            Ok(response) => response,
            Err(e) => {
                error!(broker = broker_id, error = %e, "cannot get metadata from broker");
                return CollectionSummary::failed_request();
            }
        };

        let timestamp_ms = timestamp_ms();
        let mut emitted = 0;

        for topic in response.topics {
            if self.ignore_topics.matches(&topic.name) {
                continue;
            }

            if let Some(e) = topic.error {
                warn!(topic = %topic.name, error = %e, "cannot get metadata for topic");
                continue;
            }

            let topic_partition_count = topic.partitions.len();
            for partition in topic.partitions {
                if let Some(e) = partition.error {
                    warn!(topic = %topic.name, partition = partition.id, error = %e, "cannot get metadata for partition");
                    continue;
                }

                let sent = self
                    .facts
                    .send(BrokerPartitionMetadata {
                        topic: topic.name.clone(),
                        partition: partition.id,
                        topic_partition_count,
                        leader: partition.leader,
                        replicas: partition.replicas,
                        isr: partition.isr,
                        timestamp_ms,
                    })
                    .await;
                if sent {
                    emitted += 1;
                }
            }
        }

        debug!(broker = broker_id, facts = emitted, "collected partition metadata");
        CollectionSummary::request(emitted)
    }
}
