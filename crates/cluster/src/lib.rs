//! Abstract interface for the low-level Kafka client the monitor polls.
//!
//! Implementations own connections, request timeouts and the wire protocol.
//! The monitor only orchestrates: it batches requests per broker, fans them
//! out and classifies the errors that come back.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod protocol;

pub use error::{ClusterError, ClusterErrorKind, ProtocolError};
pub use protocol::*;

use std::fmt::Debug;

use async_trait::async_trait;

/// Broker node id.
pub type BrokerId = i32;

/// Partition index within a topic.
pub type PartitionId = i32;

/// A handle to one broker connection.
///
/// Handles are cheap to clone and all clones share the same connection.
#[async_trait]
pub trait Broker
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// The error type for this broker.
    type Error: ClusterError;

    /// The broker's node id.
    fn id(&self) -> BrokerId;

    /// Connection state.
    ///
    /// `Ok(false)` means the connection was never opened or was closed, which
    /// is not a failure. An error means the last attempt to connect failed.
    ///
    /// # Errors
    ///
    /// Returns the error of the last failed connection attempt.
    fn connected(&self) -> Result<bool, Self::Error>;

    /// Opens the connection.
    async fn open(&self) -> Result<(), Self::Error>;

    /// Closes the connection. The next request reconnects on demand.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Fetches one boundary offset for a batch of partitions led by this broker.
    async fn list_offsets(&self, request: OffsetRequest) -> Result<OffsetResponse, Self::Error>;

    /// Fetches full cluster metadata.
    async fn metadata(&self) -> Result<MetadataResponse, Self::Error>;

    /// Lists the consumer groups coordinated by this broker.
    async fn list_groups(&self) -> Result<Vec<String>, Self::Error>;

    /// Fetches a group's committed offsets. Only meaningful on the group's coordinator.
    async fn fetch_offsets(
        &self,
        request: OffsetFetchRequest,
    ) -> Result<OffsetFetchResponse, Self::Error>;
}

/// A connected client for a whole cluster, sharing one connection pool.
#[async_trait]
pub trait ClusterClient
where
    Self: Send + Sync + 'static,
{
    /// The error type for this client.
    type Error: ClusterError;

    /// The broker handle type.
    type Broker: Broker<Error = Self::Error>;

    /// All brokers currently known from metadata.
    fn brokers(&self) -> Vec<Self::Broker>;

    /// Topics known from the cached metadata.
    async fn topics(&self) -> Result<Vec<String>, Self::Error>;

    /// Partition ids of a topic from the cached metadata.
    async fn partitions(&self, topic: &str) -> Result<Vec<PartitionId>, Self::Error>;

    /// The current leader of a partition.
    async fn leader(&self, topic: &str, partition: PartitionId)
    -> Result<Self::Broker, Self::Error>;

    /// Refreshes metadata for the given topics, or for every topic if empty.
    async fn refresh_metadata(&self, topics: &[String]) -> Result<(), Self::Error>;

    /// The coordinator broker of a consumer group.
    async fn coordinator(&self, group: &str) -> Result<Self::Broker, Self::Error>;

    /// Releases every connection.
    async fn close(&self) -> Result<(), Self::Error>;
}
