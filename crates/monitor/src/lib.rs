//! Cluster polling engine.
//!
//! A [`Monitor`] discovers topology through a [`ClusterClient`], scatters
//! batched requests to every relevant broker, and streams each result into a
//! state store as a fact the moment it arrives. Partial failures are logged
//! and skipped; a pass never fails as a whole.
//!
//! [`ClusterClient`]: kage_cluster::ClusterClient
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod broker_metadata;
mod broker_offsets;
mod collector;
mod consumer_offsets;
mod error;
mod filter;
mod monitor;
mod topology;

pub use broker_metadata::BrokerMetadataCollector;
pub use broker_offsets::BrokerOffsetCollector;
pub use collector::CollectionSummary;
pub use consumer_offsets::ConsumerOffsetCollector;
pub use error::Error;
pub use filter::{PatternFilter, matches};
pub use monitor::{BrokerStatus, DEFAULT_REFRESH_INTERVAL, Monitor, MonitorConfig, PassSummary};
pub use topology::TopologyResolver;
