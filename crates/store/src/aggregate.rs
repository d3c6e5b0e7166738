//! Aggregate views and the rules for folding facts into them.
//!
//! Keys are never removed; every fact only overwrites values under its own key.

use std::collections::{BTreeMap, HashMap};

use crate::{
    Boundary, BrokerId, BrokerPartitionMetadata, BrokerPartitionOffset, ConsumerPartitionOffset,
    NO_COMMITTED_OFFSET, PartitionId,
};

/// Boundary offsets by topic and partition.
pub type BrokerOffsets = HashMap<String, BTreeMap<PartitionId, BrokerOffset>>;

/// Replication metadata by topic and partition.
pub type BrokerMetadata = HashMap<String, BTreeMap<PartitionId, PartitionMetadata>>;

/// Committed offsets by group, topic and partition.
pub type ConsumerOffsets = HashMap<String, HashMap<String, BTreeMap<PartitionId, ConsumerOffset>>>;

/// Known boundary offsets of a partition. Each boundary is updated independently.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BrokerOffset {
    /// Oldest available offset, once observed.
    pub oldest: Option<i64>,
    /// Newest offset, once observed.
    pub newest: Option<i64>,
    /// Time of the last update in milliseconds since the epoch.
    pub timestamp_ms: i64,
}

impl BrokerOffset {
    /// Number of records available in the partition, once both boundaries are known.
    #[must_use]
    pub fn available(&self) -> Option<i64> {
        Some(self.newest? - self.oldest?)
    }
}

/// Replication state of a partition.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PartitionMetadata {
    /// Leader broker id, negative when the partition is offline.
    pub leader: BrokerId,
    /// Assigned replicas.
    pub replicas: Vec<BrokerId>,
    /// In-sync replicas.
    pub isr: Vec<BrokerId>,
    /// Time of the last update in milliseconds since the epoch.
    pub timestamp_ms: i64,
}

impl PartitionMetadata {
    /// Whether the partition currently has a leader.
    #[must_use]
    pub const fn has_leader(&self) -> bool {
        self.leader >= 0
    }

    /// Number of assigned replicas missing from the in-sync set.
    #[must_use]
    pub fn isr_diff(&self) -> usize {
        self.replicas.len().abs_diff(self.isr.len())
    }
}

/// A group's committed offset for a partition.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConsumerOffset {
    /// Committed offset.
    pub offset: i64,
    /// Newest broker offset minus `offset`, as known when the commit was observed.
    /// `None` when no newest offset was known at that time.
    pub lag: Option<i64>,
    /// Time of the last update in milliseconds since the epoch.
    pub timestamp_ms: i64,
}

/// Folds a boundary offset into `offsets`, leaving the other boundary untouched.
pub fn apply_broker_offset(offsets: &mut BrokerOffsets, fact: BrokerPartitionOffset) {
    let partitions = offsets.entry(fact.topic).or_default();
    let entry = partitions.entry(fact.partition).or_default();

    match fact.boundary {
        Boundary::Oldest => entry.oldest = Some(fact.offset),
        Boundary::Newest => entry.newest = Some(fact.offset),
    }
    entry.timestamp_ms = fact.timestamp_ms;
}

/// Folds partition metadata into `metadata`.
pub fn apply_broker_metadata(metadata: &mut BrokerMetadata, fact: BrokerPartitionMetadata) {
    metadata.entry(fact.topic).or_default().insert(
        fact.partition,
        PartitionMetadata {
            leader: fact.leader,
            replicas: fact.replicas,
            isr: fact.isr,
            timestamp_ms: fact.timestamp_ms,
        },
    );
}

/// Folds a committed offset into `consumers`, resolving lag against the current
/// `broker_offsets`.
///
/// Returns `false` when the fact carried the no-commit sentinel and was dropped.
pub fn apply_consumer_offset(
    consumers: &mut ConsumerOffsets,
    broker_offsets: &BrokerOffsets,
    fact: ConsumerPartitionOffset,
) -> bool {
    if fact.offset == NO_COMMITTED_OFFSET {
        return false;
    }

    let lag = broker_offsets
        .get(&fact.topic)
        .and_then(|partitions| partitions.get(&fact.partition))
        .and_then(|offset| offset.newest)
        .map(|newest| newest - fact.offset);

    consumers
        .entry(fact.group)
        .or_default()
        .entry(fact.topic)
        .or_default()
        .insert(
            fact.partition,
            ConsumerOffset {
                offset: fact.offset,
                lag,
                timestamp_ms: fact.timestamp_ms,
            },
        );

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn boundary(topic: &str, partition: PartitionId, boundary: Boundary, offset: i64) -> BrokerPartitionOffset {
        BrokerPartitionOffset {
            topic: topic.to_string(),
            partition,
            boundary,
            offset,
            timestamp_ms: 1,
            topic_partition_count: 1,
        }
    }

    fn commit(group: &str, topic: &str, partition: PartitionId, offset: i64) -> ConsumerPartitionOffset {
        ConsumerPartitionOffset {
            group: group.to_string(),
            topic: topic.to_string(),
            partition,
            offset,
            timestamp_ms: 2,
        }
    }

    #[test]
    fn test_boundaries_are_independent() {
        let mut offsets = BrokerOffsets::new();
        apply_broker_offset(&mut offsets, boundary("orders", 0, Boundary::Newest, 150));
        assert_eq!(offsets["orders"][&0].oldest, None);
        assert_eq!(offsets["orders"][&0].available(), None);

        apply_broker_offset(&mut offsets, boundary("orders", 0, Boundary::Oldest, 20));
        apply_broker_offset(&mut offsets, boundary("orders", 0, Boundary::Oldest, 30));

        let entry = &offsets["orders"][&0];
        assert_eq!(entry.oldest, Some(30));
        assert_eq!(entry.newest, Some(150));
        assert_eq!(entry.available(), Some(120));
    }

    #[test]
    fn test_lag_resolves_against_newest() {
        let mut offsets = BrokerOffsets::new();
        let mut consumers = ConsumerOffsets::new();
        apply_broker_offset(&mut offsets, boundary("orders", 0, Boundary::Newest, 150));

        assert!(apply_consumer_offset(&mut consumers, &offsets, commit("g1", "orders", 0, 100)));

        assert_eq!(
            consumers["g1"]["orders"][&0],
            ConsumerOffset {
                offset: 100,
                lag: Some(50),
                timestamp_ms: 2,
            }
        );
    }

    #[test]
    fn test_lag_is_not_recomputed_by_later_broker_offsets() {
        let mut offsets = BrokerOffsets::new();
        let mut consumers = ConsumerOffsets::new();

        apply_consumer_offset(&mut consumers, &offsets, commit("g1", "orders", 0, 100));
        apply_broker_offset(&mut offsets, boundary("orders", 0, Boundary::Newest, 150));
        assert_eq!(consumers["g1"]["orders"][&0].lag, None);

        apply_consumer_offset(&mut consumers, &offsets, commit("g1", "orders", 0, 120));
        assert_eq!(consumers["g1"]["orders"][&0].lag, Some(30));
    }

    #[test]
    fn test_oldest_boundary_alone_gives_no_lag() {
        let mut offsets = BrokerOffsets::new();
        let mut consumers = ConsumerOffsets::new();
        apply_broker_offset(&mut offsets, boundary("orders", 0, Boundary::Oldest, 10));

        apply_consumer_offset(&mut consumers, &offsets, commit("g1", "orders", 0, 100));
        assert_eq!(consumers["g1"]["orders"][&0].lag, None);
    }

    #[test]
    fn test_metadata_overwrites_and_keeps_siblings() {
        let mut metadata = BrokerMetadata::new();
        let fact = |partition, leader: BrokerId| BrokerPartitionMetadata {
            topic: "orders".to_string(),
            partition,
            topic_partition_count: 2,
            leader,
            replicas: vec![1, 2],
            isr: vec![1],
            timestamp_ms: 3,
        };

        apply_broker_metadata(&mut metadata, fact(0, 1));
        apply_broker_metadata(&mut metadata, fact(1, 2));
        apply_broker_metadata(&mut metadata, fact(0, -1));

        assert_eq!(metadata["orders"].len(), 2);
        assert!(!metadata["orders"][&0].has_leader());
        assert!(metadata["orders"][&1].has_leader());
        assert_eq!(metadata["orders"][&1].isr_diff(), 1);
    }

    proptest! {
        #[test]
        fn prop_sentinel_is_never_stored(
            offsets in proptest::collection::vec(prop_oneof![Just(-1i64), 0i64..1_000], 1..50)
        ) {
            let broker_offsets = BrokerOffsets::new();
            let mut consumers = ConsumerOffsets::new();

            for (i, offset) in offsets.iter().enumerate() {
                let partition = PartitionId::try_from(i % 4).unwrap();
                apply_consumer_offset(&mut consumers, &broker_offsets, commit("g", "t", partition, *offset));
            }

            for topics in consumers.values() {
                for partitions in topics.values() {
                    for entry in partitions.values() {
                        prop_assert_ne!(entry.offset, NO_COMMITTED_OFFSET);
                    }
                }
            }
        }

        #[test]
        fn prop_growing_log_keeps_oldest_below_newest(
            steps in proptest::collection::vec((0i64..100, 0i64..100, any::<bool>()), 1..50)
        ) {
            let mut offsets = BrokerOffsets::new();
            let (mut oldest, mut newest) = (0i64, 0i64);

            for (grow, trim, oldest_first) in steps {
                newest += grow;
                oldest = (oldest + trim).min(newest);

                let facts = [
                    boundary("t", 0, Boundary::Oldest, oldest),
                    boundary("t", 0, Boundary::Newest, newest),
                ];
                let ordered: Vec<_> = if oldest_first {
                    facts.into_iter().collect()
                } else {
                    facts.into_iter().rev().collect()
                };
                for fact in ordered {
                    apply_broker_offset(&mut offsets, fact);
                }

                let entry = &offsets["t"][&0];
                prop_assert!(entry.oldest.unwrap() <= entry.newest.unwrap());
            }
        }
    }
}
