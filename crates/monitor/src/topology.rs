//! Topic and partition discovery on top of the client's metadata cache.

use std::collections::HashMap;
use std::sync::Arc;

use kage_cluster::ClusterClient;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lists topics and keeps the client's metadata fresh.
pub struct TopologyResolver<C: ClusterClient> {
    client: Arc<C>,
}

impl<C: ClusterClient> TopologyResolver<C> {
    /// Creates a resolver over a shared client.
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Partition count of every topic currently known to exist.
    ///
    /// Failures are logged; topics that cannot be described are left out.
    pub async fn topic_partition_counts(&self) -> HashMap<String, usize> {
        // Asking for metadata of a missing topic can auto-create it, so take a
        // full refresh first and only list what the cluster already reports.
        self.refresh_metadata(&[]).await;

        let topics = match self.client.topics().await {
            Ok(topics) => topics,
            Err(e) => {
                error!(error = %e, "cannot list topics");
                return HashMap::new();
            }
        };

        let mut counts = HashMap::with_capacity(topics.len());
        for topic in topics {
            match self.client.partitions(&topic).await {
                Ok(partitions) => {
                    counts.insert(topic, partitions.len());
                }
                Err(e) => warn!(%topic, error = %e, "cannot list topic partitions"),
            }
        }

        debug!("resolved {} topics", counts.len());
        counts
    }

    /// Refreshes metadata for `topics`, or for all topics if empty.
    ///
    /// A failed refresh is logged and the last known metadata stays in place.
    pub async fn refresh_metadata(&self, topics: &[String]) {
        if let Err(e) = self.client.refresh_metadata(topics).await {
            error!(?topics, error = %e, "could not refresh topic metadata");
        }
    }

    /// Refreshes one topic's metadata on a background task.
    pub fn spawn_refresh(&self, topic: String) -> JoinHandle<()> {
        let resolver = self.clone();
        tokio::spawn(async move {
            resolver.refresh_metadata(std::slice::from_ref(&topic)).await;
            info!(%topic, "metadata for topic refreshed after stale leadership error");
        })
    }
}

impl<C: ClusterClient> Clone for TopologyResolver<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use kage_cluster_mock::{MockCluster, MockPartition};
    use tracing_test::traced_test;

    #[tokio::test]
    async fn test_refreshes_before_listing() {
        let cluster = Arc::new(MockCluster::new());
        cluster.add_broker(1);
        cluster.add_topic("orders", vec![MockPartition::led_by(1); 3]);
        cluster.add_topic("payments", vec![MockPartition::led_by(1)]);

        let resolver = TopologyResolver::new(cluster.clone());
        let counts = resolver.topic_partition_counts().await;

        assert_eq!(counts.len(), 2);
        assert_eq!(counts["orders"], 3);
        assert_eq!(counts["payments"], 1);
        assert_eq!(cluster.refreshes(), vec![Vec::<String>::new()]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_refresh_is_not_fatal() {
        let cluster = Arc::new(MockCluster::new());
        cluster.add_broker(1);
        cluster.add_topic("orders", vec![MockPartition::led_by(1)]);
        cluster.set_refresh_error(Some("timeout"));

        let resolver = TopologyResolver::new(cluster);
        let counts = resolver.topic_partition_counts().await;

        assert_eq!(counts["orders"], 1);
        assert!(logs_contain("could not refresh topic metadata"));
    }

    #[tokio::test]
    async fn test_spawned_refresh_is_scoped_to_topic() {
        let cluster = Arc::new(MockCluster::new());
        let resolver = TopologyResolver::new(cluster.clone());

        resolver.spawn_refresh("orders".to_string()).await.unwrap();

        assert_eq!(cluster.refreshes(), vec![vec!["orders".to_string()]]);
    }
}
