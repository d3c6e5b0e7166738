//! The agent loop against a fixture-backed mock cluster.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use kage_agent::{AgentConfig, Application, run_agent};
use kage_cluster_mock::MockCluster;
use kage_monitor::Monitor;
use kage_reporter::{ConsoleReporter, Reporters};
use kage_store::StateStore;
use kage_store_memory::MemoryStore;
use parking_lot::Mutex;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

const FIXTURE: &str = r"
brokers: [1, 2]
topics:
  orders:
    - { leader: 1, oldest: 0, newest: 150 }
    - { leader: 2, oldest: 20, newest: 40 }
groups:
  g1:
    coordinator: 2
    offsets:
      orders:
        0: 100
";

const CONFIG: &str = r"
kafka:
  brokers: [localhost:9092]
intervals:
  collect: 50ms
  report: 50ms
  metadata_refresh: 1s
";

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

async fn wait_for(description: &str, mut check: impl FnMut() -> bool) {
    let waited = timeout(Duration::from_secs(5), async {
        while !check() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    assert!(waited.is_ok(), "timed out waiting for: {description}");
}

#[tokio::test]
#[traced_test]
async fn test_collects_and_reports_until_shutdown() {
    let cluster = MockCluster::from_fixture_str(FIXTURE).unwrap();
    let config = AgentConfig::from_yaml_str(CONFIG).unwrap();
    config.validate().unwrap();

    let output = SharedBuffer::default();
    let mut reporters = Reporters::new();
    reporters.add("stdout", Box::new(ConsoleReporter::new(output.clone())));

    let store = MemoryStore::new();
    let monitor = Monitor::new(
        Arc::new(cluster.clone()),
        store.sender(),
        config.monitor_config(),
    );
    let application = Arc::new(Application::new(store, monitor, reporters));

    let shutdown_token = CancellationToken::new();
    let agent = tokio::spawn({
        let application = application.clone();
        let shutdown_token = shutdown_token.clone();
        async move { run_agent(application, &config, shutdown_token).await }
    });

    wait_for("consumer lag reported", || {
        output
            .contents()
            .contains("ConsumerOffset group=g1 topic=orders partition=0 offset=100 lag=50")
    })
    .await;

    let report = output.contents();
    assert!(report.contains(
        "BrokerOffset topic=orders partition=1 oldest=20 newest=40 available=20"
    ));
    assert!(report.contains("BrokerMetadata topic=orders partition=0 leaders=1 replicas=1 isr=1 isr_diff=0"));
    assert!(application.is_healthy());

    shutdown_token.cancel();
    timeout(Duration::from_secs(10), agent)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert!(cluster.is_closed());
    assert!(logs_contain("agent running, collecting every 50ms and reporting every 50ms"));
    assert!(logs_contain("agent shutdown"));
}

#[tokio::test]
async fn test_start_failure_is_returned() {
    let cluster = MockCluster::new();
    let config = AgentConfig::from_yaml_str(CONFIG).unwrap();

    let store = MemoryStore::new();
    let monitor = Monitor::new(Arc::new(cluster), store.sender(), config.monitor_config());
    let application = Arc::new(Application::new(store, monitor, Reporters::new()));
    application.start().unwrap();

    let result = run_agent(application, &config, CancellationToken::new()).await;

    assert!(matches!(result, Err(kage_agent::Error::Monitor(_))));
}

#[tokio::test]
async fn test_shipped_fixtures_load() {
    let config = AgentConfig::from_yaml_str(include_str!("../fixtures/kage.yaml")).unwrap();
    config.validate().unwrap();
    assert!(config.server.enabled);

    let cluster = MockCluster::from_fixture_str(include_str!("../fixtures/cluster.yaml")).unwrap();
    cluster.bootstrap(&config.kafka.brokers).unwrap();
    let store = MemoryStore::new();
    let monitor = Monitor::new(Arc::new(cluster), store.sender(), config.monitor_config());

    let connected: Vec<_> = monitor
        .brokers()
        .into_iter()
        .filter(|b| b.connected)
        .map(|b| b.id)
        .collect();
    assert_eq!(connected, vec![1]);
    assert!(monitor.is_healthy());

    let summary = monitor.collect().await;
    store.close().await;

    assert_eq!(summary.broker_offsets.requests, 6);
    assert!(!store.broker_offsets().contains_key("__consumer_offsets"));
    assert_eq!(store.consumer_offsets()["billing"]["orders"][&1].lag, Some(37));
}

#[test]
fn test_shipped_cluster_rejects_unknown_seeds() {
    let cluster = MockCluster::from_fixture_str(include_str!("../fixtures/cluster.yaml")).unwrap();

    assert!(cluster.bootstrap(&["kafka.internal:9092"]).is_err());
    assert!(cluster.bootstrap(&["kafka.internal:9092", "localhost:9094"]).is_ok());
}
