//! Thin CRUD surface over the persisted holdings document.
//!
//! The document store itself does not serialize writers, and POST is a
//! read-modify-write cycle, so all mutating routes funnel through one write
//! lock per document. Reads go straight to the store.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::error;

use folio::models::StoredHolding;
use folio::storage::HoldingsStore;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn HoldingsStore>,
    write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn HoldingsStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Builds the API router.
pub fn router(store: Arc<dyn HoldingsStore>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/holdings",
            get(list_holdings).put(replace_holdings).post(create_holding),
        )
        .with_state(AppState::new(store))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn list_holdings(State(state): State<AppState>) -> Response {
    match state.store.load().await {
        Ok(data) => Json(json!({ "data": data })).into_response(),
        Err(err) => {
            error!(error = %err, "failed to read holdings");
            internal_error("Failed to read holdings")
        }
    }
}

async fn replace_holdings(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let rows = match incoming_rows(body) {
        Some(rows) => rows,
        None => return bad_request("Body must be an array or {\"data\": [...]}"),
    };

    let normalized: Vec<StoredHolding> = rows
        .iter()
        .map(StoredHolding::from_value)
        .filter(StoredHolding::is_valid)
        .collect();

    let _guard = state.write_lock.lock().await;
    match state.store.replace(&normalized).await {
        Ok(()) => Json(json!({ "data": normalized, "updated": true })).into_response(),
        Err(err) => {
            error!(error = %err, "failed to write holdings");
            internal_error("Failed to save holdings")
        }
    }
}

async fn create_holding(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let next = StoredHolding::from_value(&body);
    if !next.is_valid() {
        return bad_request("Invalid holding");
    }

    let _guard = state.write_lock.lock().await;
    let current = match state.store.load().await {
        Ok(current) => current,
        Err(err) => {
            error!(error = %err, "failed to read holdings");
            return internal_error("Failed to save holding");
        }
    };

    let mut merged: Vec<StoredHolding> = current
        .into_iter()
        .filter(|item| item.symbol != next.symbol)
        .collect();
    merged.push(next);

    match state.store.replace(&merged).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "data": merged, "created": true })),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to write holdings");
            internal_error("Failed to save holding")
        }
    }
}

/// Accepts the two payload shapes clients send: a bare array, or an object
/// wrapping the array under `data`.
fn incoming_rows(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(rows) => Some(rows),
        Value::Object(mut wrapper) => match wrapper.remove("data") {
            Some(Value::Array(rows)) => Some(rows),
            _ => None,
        },
        _ => None,
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_rows_accepts_both_shapes() {
        assert_eq!(incoming_rows(json!([])), Some(vec![]));
        assert_eq!(
            incoming_rows(json!({"data": [{"symbol": "AAPL"}]})),
            Some(vec![json!({"symbol": "AAPL"})])
        );
    }

    #[test]
    fn incoming_rows_rejects_non_array_payloads() {
        assert_eq!(incoming_rows(json!({"data": "x"})), None);
        assert_eq!(incoming_rows(json!({"holdings": []})), None);
        assert_eq!(incoming_rows(json!("rows")), None);
        assert_eq!(incoming_rows(json!(1)), None);
    }
}
