//! Status endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use kage_cluster::ClusterClient;
use kage_monitor::BrokerStatus;
use kage_store::StateStore;

use crate::Application;

/// Routes `/health` and `/brokers` to the application.
pub fn router<S: StateStore, C: ClusterClient>(application: Arc<Application<S, C>>) -> Router {
    Router::new()
        .route("/health", get(health::<S, C>))
        .route("/brokers", get(brokers::<S, C>))
        .with_state(application)
}

async fn health<S: StateStore, C: ClusterClient>(
    State(application): State<Arc<Application<S, C>>>,
) -> (StatusCode, &'static str) {
    if application.is_healthy() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Unhealthy")
    }
}

async fn brokers<S: StateStore, C: ClusterClient>(
    State(application): State<Arc<Application<S, C>>>,
) -> Json<Vec<BrokerStatus>> {
    Json(application.brokers())
}
