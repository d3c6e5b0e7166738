//! Facts observed by collectors.

use std::time::{SystemTime, UNIX_EPOCH};

use derive_more::From;

use crate::{BrokerId, PartitionId};

/// Committed offset value meaning the group never committed for a partition.
pub const NO_COMMITTED_OFFSET: i64 = -1;

/// Which end of a partition log an offset refers to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Boundary {
    /// The oldest offset still available.
    Oldest,

    /// The offset the next produced record will get.
    Newest,
}

/// One boundary offset of one partition, as reported by its leader.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BrokerPartitionOffset {
    /// Topic name.
    pub topic: String,
    /// Partition index.
    pub partition: PartitionId,
    /// Which boundary `offset` is.
    pub boundary: Boundary,
    /// The boundary offset.
    pub offset: i64,
    /// Observation time in milliseconds since the epoch.
    pub timestamp_ms: i64,
    /// Number of partitions the topic had when observed.
    pub topic_partition_count: usize,
}

/// Replication metadata of one partition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BrokerPartitionMetadata {
    /// Topic name.
    pub topic: String,
    /// Partition index.
    pub partition: PartitionId,
    /// Number of partitions the topic had when observed.
    pub topic_partition_count: usize,
    /// Leader broker id, negative when there is no leader.
    pub leader: BrokerId,
    /// Assigned replicas in preference order.
    pub replicas: Vec<BrokerId>,
    /// In-sync replicas.
    pub isr: Vec<BrokerId>,
    /// Observation time in milliseconds since the epoch.
    pub timestamp_ms: i64,
}

/// A consumer group's committed offset for one partition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConsumerPartitionOffset {
    /// Consumer group.
    pub group: String,
    /// Topic name.
    pub topic: String,
    /// Partition index.
    pub partition: PartitionId,
    /// Committed offset. [`NO_COMMITTED_OFFSET`] is never stored.
    pub offset: i64,
    /// Observation time in milliseconds since the epoch.
    pub timestamp_ms: i64,
}

/// Any fact the store accepts.
#[derive(Clone, Debug, Eq, From, PartialEq)]
pub enum Fact {
    /// A partition boundary offset.
    BrokerOffset(BrokerPartitionOffset),

    /// Partition replication metadata.
    BrokerMetadata(BrokerPartitionMetadata),

    /// A committed consumer offset.
    ConsumerOffset(ConsumerPartitionOffset),
}

/// Current wall-clock time in milliseconds since the epoch.
#[must_use]
pub fn timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}
