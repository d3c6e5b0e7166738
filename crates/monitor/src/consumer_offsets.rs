//! Collection of committed consumer group offsets from group coordinators.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use kage_cluster::{Broker, BrokerId, ClusterClient, OffsetFetchRequest};
use kage_store::{ConsumerPartitionOffset, FactSender, NO_COMMITTED_OFFSET, timestamp_ms};
use tracing::{debug, error, warn};

use crate::collector::{CollectionSummary, gather, partition_ids};
use crate::filter::PatternFilter;
use crate::topology::TopologyResolver;

/// Discovers consumer groups and fetches their committed offsets.
pub struct ConsumerOffsetCollector<C: ClusterClient> {
    client: Arc<C>,
    resolver: TopologyResolver<C>,
    facts: FactSender,
    ignore_groups: PatternFilter,
}

impl<C: ClusterClient> ConsumerOffsetCollector<C> {
    /// Creates a collector.
    pub const fn new(
        client: Arc<C>,
        resolver: TopologyResolver<C>,
        facts: FactSender,
        ignore_groups: PatternFilter,
    ) -> Self {
        Self {
            client,
            resolver,
            facts,
            ignore_groups,
        }
    }

    /// Runs one pass and returns once every coordinator request has finished.
    ///
    /// Ignored topics are still requested: only groups are filtered here.
    pub async fn collect(&self) -> CollectionSummary {
        let coordinators = self.discover_groups().await;
        if coordinators.is_empty() {
            debug!("no consumer groups to collect");
            return CollectionSummary::default();
        }

        let topics: BTreeMap<String, usize> = self
            .resolver
            .topic_partition_counts()
            .await
            .into_iter()
            .collect();

        let mut handles = Vec::new();
        for (broker, groups) in coordinators.into_values() {
            for group in groups {
                let mut request = OffsetFetchRequest::new(group);
                for (topic, &count) in &topics {
                    for partition in partition_ids(count) {
                        request.add_partition(topic.as_str(), partition);
                    }
                }

                handles.push(tokio::spawn(fetch_group_offsets(
                    broker.clone(),
                    request,
                    self.facts.clone(),
                )));
            }
        }

        gather(handles).await
    }

    /// Groups every non-ignored consumer group under its coordinator.
    async fn discover_groups(&self) -> HashMap<BrokerId, (C::Broker, Vec<String>)> {
        let mut seen = HashSet::new();
        let mut coordinators: HashMap<BrokerId, (C::Broker, Vec<String>)> = HashMap::new();

        for broker in self.client.brokers() {
            let broker_id = broker.id();

            match broker.connected() {
                Ok(true) => {}
                Ok(false) => {
                    if let Err(e) = broker.open().await {
                        warn!(broker = broker_id, error = %e, "cannot connect to broker");
                        continue;
                    }
                }
                Err(e) => {
                    warn!(broker = broker_id, error = %e, "broker connection failed");
                    continue;
                }
            }

            let groups = match broker.list_groups().await {
                Ok(groups) => groups,
                Err(e) => {
                    warn!(broker = broker_id, error = %e, "cannot list consumer groups");
                    continue;
                }
            };

            for group in groups {
                if self.ignore_groups.matches(&group) || !seen.insert(group.clone()) {
                    continue;
                }

                let coordinator = match self.client.coordinator(&group).await {
                    Ok(coordinator) => coordinator,
                    Err(e) => {
                        warn!(%group, error = %e, "cannot find consumer group coordinator");
                        continue;
                    }
                };

                coordinators
                    .entry(coordinator.id())
                    .or_insert_with(|| (coordinator, Vec::new()))
                    .1
                    .push(group);
            }
        }

        coordinators
    }
}

/// Fetches one group's committed offsets and streams them to the store.
async fn fetch_group_offsets<B: Broker>(
    broker: B,
    request: OffsetFetchRequest,
    facts: FactSender,
) -> CollectionSummary {
    let broker_id = broker.id();
    let group = request.group().to_string();

    let response = match broker.fetch_offsets(request).await {
        Ok(response) => response,
        Err(e) => {
            error!(%group, broker = broker_id, error = %e, "cannot fetch consumer group offsets");
            return CollectionSummary::failed_request();
        }
    };

    let timestamp_ms = timestamp_ms();
    let mut emitted = 0;

    for (topic, partitions) in response.blocks {
        for (partition, result) in partitions {
            match result {
                Ok(NO_COMMITTED_OFFSET) => {}
                Ok(offset) => {
                    let sent = facts
                        .send(ConsumerPartitionOffset {
                            group: group.clone(),
                            topic: topic.clone(),
                            partition,
                            offset,
                            timestamp_ms,
                        })
                        .await;
                    if sent {
                        emitted += 1;
                    }
                }
                Err(e) => {
                    warn!(%group, %topic, partition, error = %e, "error in consumer offset response");
                }
            }
        }
    }

    CollectionSummary::request(emitted)
}
