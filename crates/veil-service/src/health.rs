//! Liveness endpoint.
//!
//! Deployment platforms probe `GET /` and expect a `200 OK`; `/healthz`
//! additionally reports engine counters for dashboards. The endpoint
//! shares the engine mutex, so a probe also proves the lock is live.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Mutex;
use veil_core::ChatEngine;

use crate::error::ServiceError;

/// Counters reported by `/healthz`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealthSnapshot {
    /// Users waiting for a partner.
    pub searching: usize,
    /// Users currently chatting.
    pub chatting: usize,
    /// Recipients currently marked unreachable.
    pub unreachable: usize,
}

/// Build the health router over a shared engine handle.
pub fn router(engine: Arc<Mutex<ChatEngine>>) -> Router {
    Router::new().route("/", get(alive)).route("/healthz", get(healthz)).with_state(engine)
}

/// Bind and serve the health endpoint until the process exits.
pub async fn serve(engine: Arc<Mutex<ChatEngine>>, bind: &str) -> Result<(), ServiceError> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "Health endpoint listening");
    axum::serve(listener, router(engine)).await?;
    Ok(())
}

async fn alive() -> &'static str {
    "OK"
}

async fn healthz(State(engine): State<Arc<Mutex<ChatEngine>>>) -> Json<HealthSnapshot> {
    let engine = engine.lock().await;
    Json(HealthSnapshot {
        searching: engine.waiting_count(),
        chatting: engine.chatting_count(),
        unreachable: engine.unreachable_count(),
    })
}
