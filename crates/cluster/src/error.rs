//! Error classification for cluster client operations.

use std::error::Error;
use std::fmt::{self, Debug};

use thiserror::Error as ThisError;

/// A per-partition error code returned inside an otherwise successful response.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, ThisError)]
pub enum ProtocolError {
    /// The broker does not host this topic or partition.
    #[error("unknown topic or partition")]
    UnknownTopicOrPartition,

    /// The broker is not the leader for this partition.
    #[error("not leader for partition")]
    NotLeaderForPartition,

    /// There is currently no leader for this partition.
    #[error("leader not available")]
    LeaderNotAvailable,

    /// The group coordinator is loading or moving.
    #[error("coordinator not available")]
    CoordinatorNotAvailable,

    /// Any other protocol error code.
    #[error("protocol error code {0}")]
    Other(i16),
}

impl ProtocolError {
    /// Maps a raw protocol error code. Returns `None` for the success code.
    #[must_use]
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => None,
            3 => Some(Self::UnknownTopicOrPartition),
            5 => Some(Self::LeaderNotAvailable),
            6 => Some(Self::NotLeaderForPartition),
            15 => Some(Self::CoordinatorNotAvailable),
            other => Some(Self::Other(other)),
        }
    }

    /// The raw protocol error code.
    #[must_use]
    pub const fn code(&self) -> i16 {
        match self {
            Self::UnknownTopicOrPartition => 3,
            Self::LeaderNotAvailable => 5,
            Self::NotLeaderForPartition => 6,
            Self::CoordinatorNotAvailable => 15,
            Self::Other(code) => *code,
        }
    }

    /// Whether this error means the client's view of partition leadership is out of date.
    #[must_use]
    pub const fn is_stale_metadata(&self) -> bool {
        matches!(
            self,
            Self::UnknownTopicOrPartition | Self::NotLeaderForPartition
        )
    }
}

/// The kind of cluster client error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClusterErrorKind {
    /// The broker could not be reached, or the connection broke mid-request.
    Transport,

    /// The partition leader or group coordinator could not be resolved.
    Resolution,

    /// The broker answered with a protocol-level error.
    Protocol(ProtocolError),

    /// Other/unknown error
    Other,
}

impl fmt::Display for ClusterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Marker trait for `ClusterClient` errors
pub trait ClusterError: Debug + Error + Send + Sync + 'static {
    /// Returns the kind of this error
    fn kind(&self) -> ClusterErrorKind;

    /// Whether the error is a broken or refused connection.
    fn is_transport(&self) -> bool {
        self.kind() == ClusterErrorKind::Transport
    }
}
