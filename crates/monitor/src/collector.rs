//! Pieces shared by the collectors.

use std::ops::AddAssign;

use futures::future::join_all;
use kage_cluster::{OffsetPosition, PartitionId};
use kage_store::Boundary;
use tokio::task::JoinHandle;
use tracing::error;

/// What one collection pass did. Partial failures are counted, never returned as errors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CollectionSummary {
    /// Requests issued to brokers.
    pub requests: usize,
    /// Requests that failed as a whole.
    pub failed_requests: usize,
    /// Facts handed to the store.
    pub facts: usize,
    /// Whether the pass was abandoned before issuing any request.
    pub aborted: bool,
}

impl CollectionSummary {
    pub(crate) const fn aborted() -> Self {
        Self {
            requests: 0,
            failed_requests: 0,
            facts: 0,
            aborted: true,
        }
    }

    pub(crate) const fn failed_request() -> Self {
        Self {
            requests: 1,
            failed_requests: 1,
            facts: 0,
            aborted: false,
        }
    }

    pub(crate) const fn request(facts: usize) -> Self {
        Self {
            requests: 1,
            failed_requests: 0,
            facts,
            aborted: false,
        }
    }
}

impl AddAssign for CollectionSummary {
    fn add_assign(&mut self, other: Self) {
        self.requests += other.requests;
        self.failed_requests += other.failed_requests;
        self.facts += other.facts;
        self.aborted |= other.aborted;
    }
}

/// Waits for every fan-out task and adds up their summaries.
pub(crate) async fn gather(handles: Vec<JoinHandle<CollectionSummary>>) -> CollectionSummary {
    let mut summary = CollectionSummary::default();

    for result in join_all(handles).await {
        match result {
            Ok(outcome) => summary += outcome,
            Err(e) => {
                error!(error = %e, "collection task failed");
                summary += CollectionSummary::failed_request();
            }
        }
    }

    summary
}

/// Partition ids of a topic with `count` partitions.
pub(crate) fn partition_ids(count: usize) -> impl Iterator<Item = PartitionId> {
    0..PartitionId::try_from(count).unwrap_or(PartitionId::MAX)
}

pub(crate) const fn boundary(position: OffsetPosition) -> Boundary {
    match position {
        OffsetPosition::Oldest => Boundary::Oldest,
        OffsetPosition::Newest => Boundary::Newest,
    }
}
