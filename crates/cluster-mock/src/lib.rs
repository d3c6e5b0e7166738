//! Mock implementation of the cluster client for tests and local development.
//!
//! The whole cluster lives in memory behind one lock. Every mutator takes
//! `&self`, so a test can hand the cluster to a monitor and keep scripting
//! failures while collection runs.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod fixture;

pub use error::Error;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use fixture::{BrokerFixture, Fixture};
use kage_cluster::{
    Broker, BrokerId, ClusterClient, MetadataResponse, OffsetFetchRequest, OffsetFetchResponse,
    OffsetPosition, OffsetRequest, OffsetResponse, PartitionId, PartitionMetadata,
    PartitionResult, ProtocolError, TopicMetadata,
};
use parking_lot::RwLock;
use tracing::debug;

/// A request observed by a mock broker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MockRequest {
    /// A batched boundary offset request.
    ListOffsets {
        /// Receiving broker.
        broker: BrokerId,
        /// Requested boundary.
        position: OffsetPosition,
        /// Number of partitions in the batch.
        partitions: usize,
    },

    /// A full metadata request.
    Metadata {
        /// Receiving broker.
        broker: BrokerId,
    },

    /// A consumer group listing.
    ListGroups {
        /// Receiving broker.
        broker: BrokerId,
    },

    /// A committed offset fetch.
    FetchOffsets {
        /// Receiving broker.
        broker: BrokerId,
        /// Consumer group.
        group: String,
        /// Number of partitions in the batch.
        partitions: usize,
    },
}

impl MockRequest {
    /// The broker that received the request.
    #[must_use]
    pub const fn broker(&self) -> BrokerId {
        match self {
            Self::ListOffsets { broker, .. }
            | Self::Metadata { broker }
            | Self::ListGroups { broker }
            | Self::FetchOffsets { broker, .. } => *broker,
        }
    }
}

/// Scripted state of one partition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MockPartition {
    /// Leader broker id, negative for an offline partition.
    pub leader: BrokerId,
    /// Assigned replicas.
    pub replicas: Vec<BrokerId>,
    /// In-sync replicas.
    pub isr: Vec<BrokerId>,
    /// Oldest available offset.
    pub oldest: i64,
    /// Newest offset.
    pub newest: i64,
    /// Error returned for this partition in metadata responses.
    pub metadata_error: Option<ProtocolError>,
    /// Error returned for this partition in offset responses.
    pub offset_error: Option<ProtocolError>,
}

impl MockPartition {
    /// A healthy single-replica partition led by `leader`.
    #[must_use]
    pub fn led_by(leader: BrokerId) -> Self {
        Self {
            leader,
            replicas: vec![leader],
            isr: vec![leader],
            oldest: 0,
            newest: 0,
            metadata_error: None,
            offset_error: None,
        }
    }

    /// Sets the boundary offsets.
    #[must_use]
    pub const fn with_offsets(mut self, oldest: i64, newest: i64) -> Self {
        self.oldest = oldest;
        self.newest = newest;
        self
    }

    /// Sets the replica assignment.
    #[must_use]
    pub fn with_replicas(mut self, replicas: Vec<BrokerId>, isr: Vec<BrokerId>) -> Self {
        self.replicas = replicas;
        self.isr = isr;
        self
    }
}

#[derive(Debug, Default)]
struct BrokerState {
    address: Option<String>,
    connected: bool,
    connect_error: Option<String>,
    unreachable: bool,
}

#[derive(Debug, Default)]
struct TopicState {
    error: Option<ProtocolError>,
    partitions: BTreeMap<PartitionId, MockPartition>,
}

#[derive(Debug, Default)]
struct GroupState {
    coordinator: Option<BrokerId>,
    listed_on: BTreeSet<BrokerId>,
    commits: HashMap<(String, PartitionId), PartitionResult<i64>>,
}

#[derive(Debug, Default)]
struct ClusterState {
    brokers: BTreeMap<BrokerId, BrokerState>,
    topics: BTreeMap<String, TopicState>,
    groups: BTreeMap<String, GroupState>,
    requests: Vec<MockRequest>,
    refreshes: Vec<Vec<String>>,
    refresh_error: Option<String>,
    closed: bool,
}

impl ClusterState {
    fn partition_mut(&mut self, topic: &str, partition: PartitionId) -> Option<&mut MockPartition> {
        self.topics
            .get_mut(topic)
            .and_then(|t| t.partitions.get_mut(&partition))
    }

    /// Records a request and checks the broker can serve it, reconnecting on demand.
    fn begin_request(&mut self, request: MockRequest) -> Result<(), Error> {
        let id = request.broker();
        self.requests.push(request);

        let broker = self
            .brokers
            .get_mut(&id)
            .ok_or_else(|| Error::Transport(id, "unknown broker".to_string()))?;

        if broker.unreachable {
            broker.connected = false;
            return Err(Error::Transport(id, "connection refused".to_string()));
        }

        broker.connected = true;
        broker.connect_error = None;
        Ok(())
    }
}

/// In-memory cluster implementing [`ClusterClient`].
#[derive(Clone, Debug, Default)]
pub struct MockCluster {
    state: Arc<RwLock<ClusterState>>,
}

impl MockCluster {
    /// Creates an empty cluster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cluster from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid fixture.
    pub fn from_fixture_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Fixture(format!(
                "failed to read {}: {e}",
                path.as_ref().to_string_lossy()
            ))
        })?;

        Self::from_fixture_str(&content)
    }

    /// Creates a cluster from YAML fixture content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid fixture.
    pub fn from_fixture_str(content: &str) -> Result<Self, Error> {
        let fixture: Fixture = serde_yaml::from_str(content)
            .map_err(|e| Error::Fixture(format!("failed to parse fixture: {e}")))?;

        let cluster = Self::new();
        for broker in fixture.brokers {
            match broker {
                BrokerFixture::Id(id) => cluster.add_broker(id),
                BrokerFixture::Addressed { id, address } => cluster.add_broker_at(id, address),
            }
        }

        for (topic, partitions) in fixture.topics {
            let partitions = partitions
                .into_iter()
                .map(|p| {
                    let replicas = if p.replicas.is_empty() {
                        vec![p.leader]
                    } else {
                        p.replicas
                    };
                    let isr = if p.isr.is_empty() {
                        replicas.clone()
                    } else {
                        p.isr
                    };
                    MockPartition::led_by(p.leader)
                        .with_offsets(p.oldest, p.newest)
                        .with_replicas(replicas, isr)
                })
                .collect();
            cluster.add_topic(topic, partitions);
        }

        for (group, group_fixture) in fixture.groups {
            cluster.add_group(&group, Some(group_fixture.coordinator));
            for (topic, offsets) in group_fixture.offsets {
                for (partition, offset) in offsets {
                    cluster.commit_offset(&group, &topic, partition, offset);
                }
            }
        }

        Ok(cluster)
    }

    /// Adds a connected broker.
    pub fn add_broker(&self, id: BrokerId) {
        self.state.write().brokers.insert(
            id,
            BrokerState {
                connected: true,
                ..BrokerState::default()
            },
        );
    }

    /// Adds a connected broker reachable at `address`.
    pub fn add_broker_at(&self, id: BrokerId, address: impl Into<String>) {
        self.state.write().brokers.insert(
            id,
            BrokerState {
                address: Some(address.into()),
                connected: true,
                ..BrokerState::default()
            },
        );
    }

    /// Connects to the brokers at the seed addresses and drops every other connection.
    /// Remaining brokers are connected on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if no seed address belongs to a reachable broker.
    pub fn bootstrap<S: AsRef<str>>(&self, seeds: &[S]) -> Result<(), Error> {
        let mut state = self.state.write();
        let mut seeded = 0;

        for (id, broker) in &mut state.brokers {
            let is_seed = broker
                .address
                .as_deref()
                .is_some_and(|address| seeds.iter().any(|seed| seed.as_ref() == address));

            broker.connected = is_seed && !broker.unreachable;
            if broker.connected {
                debug!(broker = *id, "connected to seed broker");
                seeded += 1;
            }
        }

        if seeded == 0 {
            let seeds: Vec<&str> = seeds.iter().map(AsRef::as_ref).collect();
            return Err(Error::Bootstrap(seeds.join(",")));
        }

        Ok(())
    }

    /// Adds a topic whose partitions are numbered from zero.
    pub fn add_topic(&self, topic: impl Into<String>, partitions: Vec<MockPartition>) {
        let partitions = (0..)
            .zip(partitions)
            .collect::<BTreeMap<PartitionId, MockPartition>>();

        self.state.write().topics.insert(
            topic.into(),
            TopicState {
                error: None,
                partitions,
            },
        );
    }

    /// Sets the boundary offsets of a partition.
    pub fn set_offsets(&self, topic: &str, partition: PartitionId, oldest: i64, newest: i64) {
        if let Some(p) = self.state.write().partition_mut(topic, partition) {
            p.oldest = oldest;
            p.newest = newest;
        }
    }

    /// Moves partition leadership. A negative id takes the partition offline.
    pub fn set_leader(&self, topic: &str, partition: PartitionId, leader: BrokerId) {
        if let Some(p) = self.state.write().partition_mut(topic, partition) {
            p.leader = leader;
        }
    }

    /// Scripts the error returned for a partition in offset responses.
    pub fn set_offset_error(
        &self,
        topic: &str,
        partition: PartitionId,
        error: Option<ProtocolError>,
    ) {
        if let Some(p) = self.state.write().partition_mut(topic, partition) {
            p.offset_error = error;
        }
    }

    /// Scripts the error returned for a partition in metadata responses.
    pub fn set_metadata_error(
        &self,
        topic: &str,
        partition: PartitionId,
        error: Option<ProtocolError>,
    ) {
        if let Some(p) = self.state.write().partition_mut(topic, partition) {
            p.metadata_error = error;
        }
    }

    /// Scripts a topic-level metadata error.
    pub fn set_topic_error(&self, topic: &str, error: Option<ProtocolError>) {
        if let Some(t) = self.state.write().topics.get_mut(topic) {
            t.error = error;
        }
    }

    /// Registers a consumer group and its coordinator. The coordinator lists the group.
    pub fn add_group(&self, group: &str, coordinator: Option<BrokerId>) {
        let mut state = self.state.write();
        let g = state.groups.entry(group.to_string()).or_default();
        g.coordinator = coordinator;
        g.listed_on.extend(coordinator);
    }

    /// Makes a broker list a group without changing its coordinator.
    pub fn list_group_on(&self, group: &str, broker: BrokerId) {
        self.state
            .write()
            .groups
            .entry(group.to_string())
            .or_default()
            .listed_on
            .insert(broker);
    }

    /// Commits an offset for a group.
    pub fn commit_offset(&self, group: &str, topic: &str, partition: PartitionId, offset: i64) {
        self.state
            .write()
            .groups
            .entry(group.to_string())
            .or_default()
            .commits
            .insert((topic.to_string(), partition), Ok(offset));
    }

    /// Scripts the error returned for a group's partition in offset fetch responses.
    pub fn set_commit_error(
        &self,
        group: &str,
        topic: &str,
        partition: PartitionId,
        error: ProtocolError,
    ) {
        self.state
            .write()
            .groups
            .entry(group.to_string())
            .or_default()
            .commits
            .insert((topic.to_string(), partition), Err(error));
    }

    /// Makes a broker refuse connections and requests.
    pub fn set_unreachable(&self, id: BrokerId, unreachable: bool) {
        if let Some(broker) = self.state.write().brokers.get_mut(&id) {
            broker.unreachable = unreachable;
            if unreachable {
                broker.connected = false;
            }
        }
    }

    /// Drops a broker connection without marking it failed.
    pub fn disconnect(&self, id: BrokerId) {
        if let Some(broker) = self.state.write().brokers.get_mut(&id) {
            broker.connected = false;
        }
    }

    /// Marks the last connection attempt to a broker as failed.
    pub fn fail_connection(&self, id: BrokerId, reason: &str) {
        if let Some(broker) = self.state.write().brokers.get_mut(&id) {
            broker.connected = false;
            broker.connect_error = Some(reason.to_string());
        }
    }

    /// Makes metadata refreshes fail.
    pub fn set_refresh_error(&self, reason: Option<&str>) {
        self.state.write().refresh_error = reason.map(str::to_string);
    }

    /// Requests observed by all brokers, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<MockRequest> {
        self.state.read().requests.clone()
    }

    /// Forgets observed requests and refreshes.
    pub fn clear_requests(&self) {
        let mut state = self.state.write();
        state.requests.clear();
        state.refreshes.clear();
    }

    /// Topics of every metadata refresh so far; an empty list is a full refresh.
    #[must_use]
    pub fn refreshes(&self) -> Vec<Vec<String>> {
        self.state.read().refreshes.clone()
    }

    /// Whether [`ClusterClient::close`] was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    fn broker(&self, id: BrokerId) -> MockBroker {
        MockBroker {
            id,
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl ClusterClient for MockCluster {
    type Error = Error;
    type Broker = MockBroker;

    fn brokers(&self) -> Vec<MockBroker> {
        let ids: Vec<BrokerId> = self.state.read().brokers.keys().copied().collect();
        ids.into_iter().map(|id| self.broker(id)).collect()
    }

    async fn topics(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.state.read().topics.keys().cloned().collect())
    }

    async fn partitions(&self, topic: &str) -> Result<Vec<PartitionId>, Self::Error> {
        self.state
            .read()
            .topics
            .get(topic)
            .map(|t| t.partitions.keys().copied().collect())
            .ok_or_else(|| Error::UnknownTopic(topic.to_string()))
    }

    async fn leader(&self, topic: &str, partition: PartitionId) -> Result<MockBroker, Self::Error> {
        let leader = {
            let state = self.state.read();
            state
                .topics
                .get(topic)
                .and_then(|t| t.partitions.get(&partition))
                .map(|p| p.leader)
                .filter(|leader| state.brokers.contains_key(leader))
        };

        leader
            .map(|id| self.broker(id))
            .ok_or_else(|| Error::NoLeader(topic.to_string(), partition))
    }

    async fn refresh_metadata(&self, topics: &[String]) -> Result<(), Self::Error> {
        let mut state = self.state.write();
        state.refreshes.push(topics.to_vec());
        debug!("mock metadata refresh for {:?}", topics);

        match &state.refresh_error {
            Some(reason) => Err(Error::Transport(-1, reason.clone())),
            None => Ok(()),
        }
    }

    async fn coordinator(&self, group: &str) -> Result<MockBroker, Self::Error> {
        let coordinator = {
            let state = self.state.read();
            state
                .groups
                .get(group)
                .and_then(|g| g.coordinator)
                .filter(|id| state.brokers.contains_key(id))
        };

        coordinator
            .map(|id| self.broker(id))
            .ok_or_else(|| Error::NoCoordinator(group.to_string()))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        let mut state = self.state.write();
        state.closed = true;
        for broker in state.brokers.values_mut() {
            broker.connected = false;
        }
        Ok(())
    }
}

/// A broker of a [`MockCluster`].
#[derive(Clone, Debug)]
pub struct MockBroker {
    id: BrokerId,
    state: Arc<RwLock<ClusterState>>,
}

#[async_trait]
impl Broker for MockBroker {
    type Error = Error;

    fn id(&self) -> BrokerId {
        self.id
    }

    fn connected(&self) -> Result<bool, Self::Error> {
        let state = self.state.read();
        let broker = state
            .brokers
            .get(&self.id)
            .ok_or_else(|| Error::Transport(self.id, "unknown broker".to_string()))?;

        match &broker.connect_error {
            Some(reason) => Err(Error::Transport(self.id, reason.clone())),
            None => Ok(broker.connected),
        }
    }

    async fn open(&self) -> Result<(), Self::Error> {
        let mut state = self.state.write();
        let broker = state
            .brokers
            .get_mut(&self.id)
            .ok_or_else(|| Error::Transport(self.id, "unknown broker".to_string()))?;

        if broker.unreachable {
            broker.connect_error = Some("connection refused".to_string());
            return Err(Error::Transport(self.id, "connection refused".to_string()));
        }

        broker.connected = true;
        broker.connect_error = None;
        Ok(())
    }

    async fn close(&self) -> Result<(), Self::Error> {
        if let Some(broker) = self.state.write().brokers.get_mut(&self.id) {
            broker.connected = false;
        }
        Ok(())
    }

    async fn list_offsets(&self, request: OffsetRequest) -> Result<OffsetResponse, Self::Error> {
        let mut state = self.state.write();
        state.begin_request(MockRequest::ListOffsets {
            broker: self.id,
            position: request.position(),
            partitions: request.len(),
        })?;

        let mut response = OffsetResponse::default();
        for (topic, partitions) in request.partitions() {
            let blocks = response.blocks.entry(topic.clone()).or_default();
            for &partition in partitions {
                let result = match state.topics.get(topic).and_then(|t| t.partitions.get(&partition)) {
                    None => Err(ProtocolError::UnknownTopicOrPartition),
                    Some(p) => match p.offset_error {
                        Some(error) => Err(error),
                        None if p.leader != self.id => Err(ProtocolError::NotLeaderForPartition),
                        None => Ok(match request.position() {
                            OffsetPosition::Oldest => p.oldest,
                            OffsetPosition::Newest => p.newest,
                        }),
                    },
                };
                blocks.insert(partition, result);
            }
        }

        Ok(response)
    }

    async fn metadata(&self) -> Result<MetadataResponse, Self::Error> {
        let mut state = self.state.write();
        state.begin_request(MockRequest::Metadata { broker: self.id })?;

        let topics = state
            .topics
            .iter()
            .map(|(name, topic)| TopicMetadata {
                name: name.clone(),
                error: topic.error,
                partitions: topic
                    .partitions
                    .iter()
                    .map(|(&id, p)| PartitionMetadata {
                        id,
                        error: p.metadata_error,
                        leader: p.leader,
                        replicas: p.replicas.clone(),
                        isr: p.isr.clone(),
                    })
                    .collect(),
            })
            .collect();

        Ok(MetadataResponse {
            brokers: state.brokers.keys().copied().collect(),
            topics,
        })
    }

    async fn list_groups(&self) -> Result<Vec<String>, Self::Error> {
        let mut state = self.state.write();
        state.begin_request(MockRequest::ListGroups { broker: self.id })?;

        Ok(state
            .groups
            .iter()
            .filter(|(_, g)| g.listed_on.contains(&self.id))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn fetch_offsets(
        &self,
        request: OffsetFetchRequest,
    ) -> Result<OffsetFetchResponse, Self::Error> {
        let mut state = self.state.write();
        state.begin_request(MockRequest::FetchOffsets {
            broker: self.id,
            group: request.group().to_string(),
            partitions: request.len(),
        })?;

        let group = state.groups.get(request.group());
        let mut response = OffsetFetchResponse::default();
        for (topic, partitions) in request.partitions() {
            let blocks = response.blocks.entry(topic.clone()).or_default();
            for &partition in partitions {
                let result = group
                    .and_then(|g| g.commits.get(&(topic.clone(), partition)))
                    .cloned()
                    .unwrap_or(Ok(-1));
                blocks.insert(partition, result);
            }
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_cluster() -> MockCluster {
        let cluster = MockCluster::new();
        cluster.add_broker(1);
        cluster.add_broker(2);
        cluster.add_topic(
            "orders",
            vec![
                MockPartition::led_by(1).with_offsets(0, 150),
                MockPartition::led_by(1),
                MockPartition::led_by(2),
            ],
        );
        cluster
    }

    #[tokio::test]
    async fn test_leader_resolution() {
        let cluster = orders_cluster();

        assert_eq!(cluster.leader("orders", 2).await.unwrap().id(), 2);

        cluster.set_leader("orders", 2, -1);
        assert!(cluster.leader("orders", 2).await.is_err());
        assert!(cluster.leader("missing", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_list_offsets_flags_wrong_leader() {
        let cluster = orders_cluster();
        let broker = cluster.leader("orders", 0).await.unwrap();

        let mut request = OffsetRequest::new(OffsetPosition::Newest);
        request.add_partition("orders", 0);
        request.add_partition("orders", 2);

        let response = broker.list_offsets(request).await.unwrap();
        let blocks = &response.blocks["orders"];
        assert_eq!(blocks[&0], Ok(150));
        assert_eq!(blocks[&2], Err(ProtocolError::NotLeaderForPartition));
    }

    #[tokio::test]
    async fn test_unreachable_broker_drops_connection() {
        let cluster = orders_cluster();
        let broker = cluster.leader("orders", 0).await.unwrap();
        cluster.set_unreachable(1, true);

        assert!(broker.metadata().await.is_err());
        assert!(!broker.connected().unwrap());
        assert!(broker.open().await.is_err());
        assert!(broker.connected().is_err());
    }

    #[tokio::test]
    async fn test_uncommitted_partitions_report_sentinel() {
        let cluster = orders_cluster();
        cluster.add_group("g1", Some(1));
        cluster.commit_offset("g1", "orders", 0, 100);

        let coordinator = cluster.coordinator("g1").await.unwrap();
        assert_eq!(coordinator.list_groups().await.unwrap(), vec!["g1"]);

        let mut request = OffsetFetchRequest::new("g1");
        request.add_partition("orders", 0);
        request.add_partition("orders", 1);

        let response = coordinator.fetch_offsets(request).await.unwrap();
        assert_eq!(response.blocks["orders"][&0], Ok(100));
        assert_eq!(response.blocks["orders"][&1], Ok(-1));
    }

    #[test]
    fn test_fixture_parsing() {
        let cluster = MockCluster::from_fixture_str(
            r"
brokers: [1, 2]
topics:
  orders:
    - { leader: 1, replicas: [1, 2], oldest: 5, newest: 150 }
    - { leader: 2 }
groups:
  g1:
    coordinator: 1
    offsets:
      orders: { 0: 100 }
",
        )
        .unwrap();

        let state = cluster.state.read();
        assert_eq!(state.brokers.len(), 2);

        let orders = &state.topics["orders"].partitions;
        assert_eq!(orders[&0].isr, vec![1, 2]);
        assert_eq!(orders[&0].newest, 150);
        assert_eq!(orders[&1].replicas, vec![2]);
        assert_eq!(
            state.groups["g1"].commits[&("orders".to_string(), 0)],
            Ok(100)
        );
    }

    #[tokio::test]
    async fn test_groups_listed_without_coordinator() {
        let cluster = orders_cluster();
        cluster.add_group("g1", Some(1));
        cluster.add_group("orphan", None);
        cluster.list_group_on("orphan", 1);

        let broker = cluster.coordinator("g1").await.unwrap();
        assert_eq!(broker.list_groups().await.unwrap(), vec!["g1", "orphan"]);
        assert!(cluster.coordinator("orphan").await.is_err());
    }

    #[test]
    fn test_bootstrap_connects_seed_brokers_only() {
        let cluster = MockCluster::new();
        cluster.add_broker_at(1, "localhost:9092");
        cluster.add_broker_at(2, "localhost:9093");
        cluster.add_broker(3);

        cluster.bootstrap(&["localhost:9093", "localhost:9999"]).unwrap();

        let connected: Vec<BrokerId> = cluster
            .brokers()
            .iter()
            .filter(|b| b.connected().unwrap_or(false))
            .map(Broker::id)
            .collect();
        assert_eq!(connected, vec![2]);
    }

    #[test]
    fn test_bootstrap_fails_without_reachable_seed() {
        let cluster = MockCluster::new();
        cluster.add_broker_at(1, "localhost:9092");
        cluster.set_unreachable(1, true);

        let err = cluster.bootstrap(&["localhost:9092", "localhost:9094"]).unwrap_err();
        assert!(matches!(err, Error::Bootstrap(ref seeds) if seeds == "localhost:9092,localhost:9094"));
        assert!(cluster.bootstrap::<&str>(&[]).is_err());
    }

    #[test]
    fn test_fixture_brokers_with_addresses() {
        let cluster = MockCluster::from_fixture_str(
            r"
brokers:
  - { id: 1, address: localhost:9092 }
  - 2
",
        )
        .unwrap();

        let state = cluster.state.read();
        assert_eq!(state.brokers[&1].address.as_deref(), Some("localhost:9092"));
        assert_eq!(state.brokers[&2].address, None);
    }

    #[test]
    fn test_fixture_rejects_garbage() {
        assert!(MockCluster::from_fixture_str("brokers: nope").is_err());
    }
}
