//! REST holdings adapter.
//!
//! Fetches a configured endpoint and extracts holdings from one of the known
//! payload shapes. Field naming varies between deployments, so each item is
//! resolved through a priority-ordered alias table: first present key wins.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::RestSourceConfig;
use crate::models::{Holding, Source};
use crate::numeric::coerce_f64;

use super::{HoldingsSource, SourceError};

/// Known payload shapes, tried in order: a bare array, rows under `data`
/// (directly or one level deeper under `holdings`), or rows under `holdings`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HoldingsPayload {
    Rows(Vec<Value>),
    Data { data: NestedRows },
    Holdings { holdings: Vec<Value> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NestedRows {
    Rows(Vec<Value>),
    Holdings { holdings: Vec<Value> },
}

impl HoldingsPayload {
    fn into_rows(self) -> Vec<Value> {
        match self {
            HoldingsPayload::Rows(rows) => rows,
            HoldingsPayload::Data {
                data: NestedRows::Rows(rows),
            } => rows,
            HoldingsPayload::Data {
                data: NestedRows::Holdings { holdings },
            } => holdings,
            HoldingsPayload::Holdings { holdings } => holdings,
        }
    }
}

/// Resolves a payload to its rows; unrecognized shapes yield an empty batch.
fn payload_rows(payload: Value) -> Vec<Value> {
    serde_json::from_value::<HoldingsPayload>(payload)
        .map(HoldingsPayload::into_rows)
        .unwrap_or_default()
}

/// Item-level key aliases, in priority order.
struct FieldAliases {
    symbol: &'static [&'static str],
    quantity: &'static [&'static str],
    avg_price: &'static [&'static str],
    current_price: &'static [&'static str],
}

const CMC_ALIASES: FieldAliases = FieldAliases {
    symbol: &["symbol", "ticker", "assetSymbol", "coin"],
    quantity: &["quantity", "amount", "volume", "qty", "balance"],
    avg_price: &["avgPrice", "averagePrice", "avgBuyUsd", "costBasis"],
    current_price: &["currentPrice", "markUsd", "price", "last"],
};

fn first_value<'a>(row: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find(|value| !value.is_null())
}

fn row_to_holding(row: &Value, aliases: &FieldAliases, source: Source) -> Holding {
    let empty = Map::new();
    let row = row.as_object().unwrap_or(&empty);

    let symbol = first_value(row, aliases.symbol)
        .and_then(Value::as_str)
        .unwrap_or_default();

    Holding::normalized(
        symbol,
        coerce_f64(first_value(row, aliases.quantity)),
        coerce_f64(first_value(row, aliases.avg_price)),
        coerce_f64(first_value(row, aliases.current_price)),
        Some(source),
    )
}

/// Holdings adapter for a REST endpoint in the CoinMarketCap-portfolio style.
pub struct RestHoldingsSource {
    client: reqwest::Client,
    source: Source,
    aliases: &'static FieldAliases,
    api_url: Option<String>,
    api_key: Option<String>,
    api_key_header: String,
}

impl RestHoldingsSource {
    /// Creates the `cmc` adapter from its config table.
    pub fn cmc(config: &RestSourceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            source: Source::Cmc,
            aliases: &CMC_ALIASES,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            api_key_header: config.api_key_header.clone(),
        }
    }

    /// Creates an adapter with a custom reqwest client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Points the adapter at a different endpoint (tests use this to target a
    /// mock server).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }
}

#[async_trait::async_trait]
impl HoldingsSource for RestHoldingsSource {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>, SourceError> {
        let url = self.api_url.as_deref().ok_or(SourceError::Unconfigured)?;

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(api_key) = &self.api_key {
            request = request.header(self.api_key_header.as_str(), api_key.as_str());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status(),
            });
        }

        let payload: Value = response.json().await?;
        let rows = payload_rows(payload);
        debug!(source = self.name(), rows = rows.len(), "fetched holdings payload");

        Ok(rows
            .iter()
            .map(|row| row_to_holding(row, self.aliases, self.source))
            .filter(|holding| !holding.symbol.is_empty() && holding.quantity > 0.0)
            .collect())
    }
}
