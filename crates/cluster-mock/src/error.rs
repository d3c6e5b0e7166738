//! Error types for the mock cluster implementation.

use kage_cluster::{ClusterError, ClusterErrorKind};
use thiserror::Error;

/// Error type for the mock cluster implementation.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// The broker is unreachable or was scripted to drop requests.
    #[error("broker {0} unreachable: {1}")]
    Transport(i32, String),

    /// None of the seed addresses belongs to a reachable broker.
    #[error("cannot bootstrap from {0}")]
    Bootstrap(String),

    /// No leader is available for the partition.
    #[error("no leader for {0}/{1}")]
    NoLeader(String, i32),

    /// No coordinator is known for the group.
    #[error("no coordinator for group {0}")]
    NoCoordinator(String),

    /// The topic does not exist.
    #[error("unknown topic {0}")]
    UnknownTopic(String),

    /// Error when loading or parsing a cluster fixture file.
    #[error("cluster fixture error: {0}")]
    Fixture(String),
}

impl ClusterError for Error {
    fn kind(&self) -> ClusterErrorKind {
        match self {
            Self::Transport(..) | Self::Bootstrap(_) => ClusterErrorKind::Transport,
            Self::NoLeader(..) | Self::NoCoordinator(_) => ClusterErrorKind::Resolution,
            Self::UnknownTopic(_) => ClusterErrorKind::Protocol(
                kage_cluster::ProtocolError::UnknownTopicOrPartition,
            ),
            Self::Fixture(_) => ClusterErrorKind::Other,
        }
    }
}
