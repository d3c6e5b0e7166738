use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use kage_reporter::{InfluxConfig, InfluxReporter, Reporter};
use kage_store::{BrokerOffset, BrokerOffsets};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tracing_test::traced_test;

#[derive(Debug)]
struct Write {
    query: HashMap<String, String>,
    authorized: bool,
    body: String,
}

#[derive(Clone)]
struct Influx {
    writes: Arc<Mutex<Vec<Write>>>,
    status: StatusCode,
}

async fn write(
    State(influx): State<Influx>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    influx.writes.lock().push(Write {
        query,
        authorized: headers.contains_key(header::AUTHORIZATION),
        body,
    });
    influx.status
}

async fn serve(status: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<Write>>>) {
    let writes = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().route("/write", post(write)).with_state(Influx {
        writes: writes.clone(),
        status,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, writes)
}

fn offsets() -> BrokerOffsets {
    BrokerOffsets::from([(
        "orders".to_string(),
        BTreeMap::from([(
            0,
            BrokerOffset {
                oldest: Some(10),
                newest: Some(150),
                timestamp_ms: 1,
            },
        )]),
    )])
}

#[tokio::test]
async fn test_posts_line_protocol_batch() {
    let (addr, writes) = serve(StatusCode::NO_CONTENT).await;
    let reporter = InfluxReporter::new(&InfluxConfig {
        dsn: format!("http://kage:secret@{addr}/metrics"),
        metric: "kage".to_string(),
        policy: "week".to_string(),
        tags: vec!["env=test".to_string()],
    })
    .unwrap();

    reporter.report_broker_offsets(&offsets()).await;

    let writes = writes.lock();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].query["db"], "metrics");
    assert_eq!(writes[0].query["rp"], "week");
    assert_eq!(writes[0].query["precision"], "s");
    assert!(writes[0].authorized);
    assert!(writes[0].body.starts_with(
        "kage,env=test,partition=0,topic=orders,type=BrokerOffset oldest=10i,newest=150i,available=140i "
    ));
}

#[tokio::test]
async fn test_empty_snapshot_is_not_posted() {
    let (addr, writes) = serve(StatusCode::NO_CONTENT).await;
    let reporter = InfluxReporter::new(&InfluxConfig {
        dsn: format!("http://{addr}/metrics"),
        ..InfluxConfig::default()
    })
    .unwrap();

    reporter.report_broker_offsets(&BrokerOffsets::new()).await;

    assert!(writes.lock().is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_write_failure_is_logged() {
    let (addr, writes) = serve(StatusCode::INTERNAL_SERVER_ERROR).await;
    let reporter = InfluxReporter::new(&InfluxConfig {
        dsn: format!("http://{addr}/metrics"),
        ..InfluxConfig::default()
    })
    .unwrap();

    reporter.report_broker_offsets(&offsets()).await;

    assert_eq!(writes.lock().len(), 1);
    assert!(!writes.lock()[0].authorized);
    assert!(logs_contain("influx: cannot write broker offsets"));
}
