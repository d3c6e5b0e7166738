//! Batched request and response shapes exchanged with a single broker.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{BrokerId, PartitionId, ProtocolError};

/// Per-partition outcome inside a batched response.
pub type PartitionResult<T> = Result<T, ProtocolError>;

/// Which end of a partition log an offset request asks for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OffsetPosition {
    /// The oldest offset still available.
    Oldest,

    /// The offset the next produced record will get.
    Newest,
}

/// A batched request for one boundary offset of many partitions on one broker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OffsetRequest {
    position: OffsetPosition,
    partitions: BTreeMap<String, BTreeSet<PartitionId>>,
}

impl OffsetRequest {
    /// Creates an empty request for the given boundary.
    #[must_use]
    pub const fn new(position: OffsetPosition) -> Self {
        Self {
            position,
            partitions: BTreeMap::new(),
        }
    }

    /// Adds a partition to the batch.
    pub fn add_partition(&mut self, topic: impl Into<String>, partition: PartitionId) {
        self.partitions
            .entry(topic.into())
            .or_default()
            .insert(partition);
    }

    /// The requested boundary.
    #[must_use]
    pub const fn position(&self) -> OffsetPosition {
        self.position
    }

    /// The requested partitions, by topic.
    #[must_use]
    pub const fn partitions(&self) -> &BTreeMap<String, BTreeSet<PartitionId>> {
        &self.partitions
    }

    /// Number of partitions in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.values().map(BTreeSet::len).sum()
    }

    /// Whether the batch holds no partitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// Response to an [`OffsetRequest`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OffsetResponse {
    /// Offset (or error) per topic and partition.
    pub blocks: HashMap<String, HashMap<PartitionId, PartitionResult<i64>>>,
}

/// Full cluster metadata as seen by one broker.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetadataResponse {
    /// Brokers known to the cluster.
    pub brokers: Vec<BrokerId>,

    /// Every topic in the cluster.
    pub topics: Vec<TopicMetadata>,
}

/// Metadata for one topic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicMetadata {
    /// Topic name.
    pub name: String,

    /// Topic-level error, if any.
    pub error: Option<ProtocolError>,

    /// Partition metadata.
    pub partitions: Vec<PartitionMetadata>,
}

/// Metadata for one partition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartitionMetadata {
    /// Partition index.
    pub id: PartitionId,

    /// Partition-level error, if any.
    pub error: Option<ProtocolError>,

    /// Leader broker id; negative when the partition has no leader.
    pub leader: BrokerId,

    /// Assigned replicas in preference order.
    pub replicas: Vec<BrokerId>,

    /// In-sync replicas.
    pub isr: Vec<BrokerId>,
}

/// A batched committed-offset request for one group, sent to its coordinator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OffsetFetchRequest {
    group: String,
    partitions: BTreeMap<String, BTreeSet<PartitionId>>,
}

impl OffsetFetchRequest {
    /// Creates an empty request for a consumer group.
    #[must_use]
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            partitions: BTreeMap::new(),
        }
    }

    /// Adds a partition to the batch.
    pub fn add_partition(&mut self, topic: impl Into<String>, partition: PartitionId) {
        self.partitions
            .entry(topic.into())
            .or_default()
            .insert(partition);
    }

    /// The consumer group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The requested partitions, by topic.
    #[must_use]
    pub const fn partitions(&self) -> &BTreeMap<String, BTreeSet<PartitionId>> {
        &self.partitions
    }

    /// Number of partitions in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.values().map(BTreeSet::len).sum()
    }

    /// Whether the batch holds no partitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// Response to an [`OffsetFetchRequest`]. An offset of `-1` means nothing was committed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OffsetFetchResponse {
    /// Committed offset (or error) per topic and partition.
    pub blocks: HashMap<String, HashMap<PartitionId, PartitionResult<i64>>>,
}
