use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use folio::storage::{HoldingsStore, JsonFileStore, MemoryStore};
use folio_server::router;

async fn serve(store: Arc<dyn HoldingsStore>) -> Result<String> {
    let app = router(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server crashed");
    });

    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let base = serve(Arc::new(MemoryStore::new())).await?;

    let body: Value = reqwest::get(format!("{base}/api/health")).await?.json().await?;
    assert_eq!(body, json!({"ok": true}));

    Ok(())
}

#[tokio::test]
async fn list_starts_empty() -> Result<()> {
    let base = serve(Arc::new(MemoryStore::new())).await?;

    let body: Value = reqwest::get(format!("{base}/api/holdings")).await?.json().await?;
    assert_eq!(body, json!({"data": []}));

    Ok(())
}

#[tokio::test]
async fn put_replaces_the_collection() -> Result<()> {
    let base = serve(Arc::new(MemoryStore::new())).await?;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{base}/api/holdings"))
        .json(&json!([
            {"symbol": "aapl", "quantity": 10, "avgPrice": 150},
            {"symbol": "", "quantity": 1, "avgPrice": 1},
        ]))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["updated"], json!(true));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["symbol"], json!("AAPL"));

    Ok(())
}

#[tokio::test]
async fn put_accepts_the_data_wrapper() -> Result<()> {
    let base = serve(Arc::new(MemoryStore::new())).await?;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{base}/api/holdings"))
        .json(&json!({"data": [{"symbol": "msft", "quantity": 8, "avgPrice": 310.2}]}))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    let body: Value = reqwest::get(format!("{base}/api/holdings")).await?.json().await?;
    assert_eq!(body["data"][0]["symbol"], json!("MSFT"));

    Ok(())
}

#[tokio::test]
async fn put_rejects_non_array_bodies() -> Result<()> {
    let base = serve(Arc::new(MemoryStore::new())).await?;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{base}/api/holdings"))
        .json(&json!({"holdings": []}))
        .send()
        .await?;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await?;
    assert!(body["error"].is_string());

    Ok(())
}

#[tokio::test]
async fn post_upserts_by_symbol() -> Result<()> {
    let base = serve(Arc::new(MemoryStore::new())).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/holdings"))
        .json(&json!({"symbol": "btc", "quantity": 1, "avgPrice": 20000}))
        .send()
        .await?;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await?;
    assert_eq!(body["created"], json!(true));

    // Same symbol again replaces the entry instead of duplicating it.
    let response = client
        .post(format!("{base}/api/holdings"))
        .json(&json!({"symbol": "BTC", "quantity": 2, "avgPrice": 25000}))
        .send()
        .await?;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await?;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["quantity"], json!(2.0));

    Ok(())
}

#[tokio::test]
async fn post_rejects_invalid_holdings() -> Result<()> {
    let base = serve(Arc::new(MemoryStore::new())).await?;
    let client = reqwest::Client::new();

    for body in [
        json!({"symbol": "", "quantity": 1, "avgPrice": 1}),
        json!({"symbol": "X", "quantity": 0, "avgPrice": 1}),
        json!({"symbol": "X", "quantity": 1, "avgPrice": -1}),
        json!({}),
    ] {
        let response = client
            .post(format!("{base}/api/holdings"))
            .json(&body)
            .send()
            .await?;
        assert_eq!(response.status(), 400, "body: {body}");
    }

    Ok(())
}

#[tokio::test]
async fn file_backed_store_round_trips_through_the_api() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = Arc::new(JsonFileStore::in_dir(dir.path()));
    let base = serve(store.clone()).await?;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api/holdings"))
        .json(&json!({"symbol": "tsla", "quantity": 5, "avgPrice": 245.8}))
        .send()
        .await?
        .error_for_status()?;

    let content = std::fs::read_to_string(store.path())?;
    assert!(content.ends_with('\n'));

    let body: Value = reqwest::get(format!("{base}/api/holdings")).await?.json().await?;
    assert_eq!(body["data"][0]["symbol"], json!("TSLA"));
    assert_eq!(body["data"][0]["avgPrice"], json!(245.8));

    Ok(())
}
