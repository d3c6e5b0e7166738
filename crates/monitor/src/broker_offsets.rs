//! Scatter-gather collection of partition boundary offsets from leaders.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use kage_cluster::{Broker, BrokerId, ClusterClient, ClusterError, OffsetPosition, OffsetRequest};
use kage_store::{BrokerPartitionOffset, FactSender, timestamp_ms};
use tracing::{debug, error, warn};

use crate::collector::{CollectionSummary, boundary, gather, partition_ids};
use crate::filter::PatternFilter;
use crate::topology::TopologyResolver;

/// Both boundary requests for one leader broker.
struct LeaderRequests<B> {
    broker: B,
    oldest: OffsetRequest,
    newest: OffsetRequest,
}

/// Collects oldest and newest offsets of every partition from its leader.
pub struct BrokerOffsetCollector<C: ClusterClient> {
    client: Arc<C>,
    resolver: TopologyResolver<C>,
    facts: FactSender,
    ignore_topics: PatternFilter,
}

impl<C: ClusterClient> BrokerOffsetCollector<C> {
    /// Creates a collector.
    pub const fn new(
        client: Arc<C>,
        resolver: TopologyResolver<C>,
        facts: FactSender,
        ignore_topics: PatternFilter,
    ) -> Self {
        Self {
            client,
            resolver,
            facts,
            ignore_topics,
        }
    }

    /// Runs one pass and returns once every broker request has finished.
    ///
    /// If any partition leader cannot be resolved the pass is abandoned
    /// before a single request is sent.
    pub async fn collect(&self) -> CollectionSummary {
        let topics = self.resolver.topic_partition_counts().await;

        let mut requests: BTreeMap<BrokerId, LeaderRequests<C::Broker>> = BTreeMap::new();
        for (topic, &count) in &topics {
            if self.ignore_topics.matches(topic) {
                continue;
            }

            for partition in partition_ids(count) {
                let broker = match self.client.leader(topic, partition).await {
                    Ok(broker) => broker,
                    Err(e) => {
                        error!(%topic, partition, error = %e, "topic leader error, abandoning broker offset collection");
                        return CollectionSummary::aborted();
                    }
                };

                let leader = requests
                    .entry(broker.id())
                    .or_insert_with(|| LeaderRequests {
                        broker,
                        oldest: OffsetRequest::new(OffsetPosition::Oldest),
                        newest: OffsetRequest::new(OffsetPosition::Newest),
                    });
                leader.oldest.add_partition(topic.as_str(), partition);
                leader.newest.add_partition(topic.as_str(), partition);
            }
        }

        debug!("fetching offsets from {} leader brokers", requests.len());

        let topics = Arc::new(topics);
        let mut handles = Vec::with_capacity(requests.len() * 2);
        for leader in requests.into_values() {
            for request in [leader.oldest, leader.newest] {
                handles.push(tokio::spawn(fetch_offsets(
                    leader.broker.clone(),
                    request,
                    topics.clone(),
                    self.facts.clone(),
                    self.resolver.clone(),
                )));
            }
        }

        gather(handles).await
    }
}

/// Sends one batched boundary request and streams every resolved offset to the store.
async fn fetch_offsets<C: ClusterClient>(
    broker: C::Broker,
    request: OffsetRequest,
    topics: Arc<HashMap<String, usize>>,
    facts: FactSender,
    resolver: TopologyResolver<C>,
) -> CollectionSummary {
    let broker_id = broker.id();
    let boundary = boundary(request.position());

    let response = match broker.list_offsets(request).await {
        Ok(response) => response,
        Err(e) => {
            error!(broker = broker_id, error = %e, "cannot fetch offsets from broker");

            // Force a clean reconnect on the next pass.
            if e.is_transport() {
                if let Err(e) = broker.close().await {
                    warn!(broker = broker_id, error = %e, "cannot close broker connection");
                }
            }

            return CollectionSummary::failed_request();
        }
    };

    let timestamp_ms = timestamp_ms();
    let mut stale_topics = BTreeSet::new();
    let mut emitted = 0;

    for (topic, partitions) in response.blocks {
        for (partition, result) in partitions {
            match result {
                Ok(offset) => {
                    let sent = facts
                        .send(BrokerPartitionOffset {
                            topic: topic.clone(),
                            partition,
                            boundary,
                            offset,
                            timestamp_ms,
                            topic_partition_count: topics.get(&topic).copied().unwrap_or_default(),
                        })
                        .await;
                    if sent {
                        emitted += 1;
                    }
                }
                Err(e) if e.is_stale_metadata() => {
                    debug!(%topic, partition, broker = broker_id, error = %e, "stale leadership in offset response");
                    stale_topics.insert(topic.clone());
                }
                Err(e) => {
                    error!(%topic, partition, broker = broker_id, error = %e, "error in offset response from broker");
                }
            }
        }
    }

    for topic in stale_topics {
        resolver.spawn_refresh(topic);
    }

    CollectionSummary::request(emitted)
}
