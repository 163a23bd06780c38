use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::numeric::coerce_f64;

use super::Source;

/// A position in one asset: quantity plus cost basis and current mark.
///
/// Field names serialize in the wire format the API and document store use
/// (`avgPrice`, `currentPrice`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub avg_price: f64,
    pub current_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl Holding {
    /// Builds a holding from loosely-typed parts.
    ///
    /// The symbol is trimmed and uppercased; non-finite numeric input becomes
    /// `0.0`. This never fails: zero-valued output is expected to be dropped by
    /// the caller via [`Holding::is_valid`] or a stricter import filter.
    pub fn normalized(
        symbol: &str,
        quantity: f64,
        avg_price: f64,
        current_price: f64,
        source: Option<Source>,
    ) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            quantity: finite_or_zero(quantity),
            avg_price: finite_or_zero(avg_price),
            current_price: finite_or_zero(current_price),
            source,
        }
    }

    /// Re-normalizes an existing holding. Idempotent on normalized input.
    pub fn normalize(&self) -> Self {
        Self::normalized(
            &self.symbol,
            self.quantity,
            self.avg_price,
            self.current_price,
            self.source,
        )
    }

    /// Minimum bar for a holding to enter the pipeline: a symbol, a strictly
    /// positive quantity, and a non-negative cost basis.
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty()
            && self.quantity.is_finite()
            && self.quantity > 0.0
            && self.avg_price.is_finite()
            && self.avg_price >= 0.0
    }
}

/// Exactly the fields the persisted holdings document carries.
///
/// The document is an ordered array of these, keyed by symbol (new entries
/// replace existing ones with the same symbol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredHolding {
    pub symbol: String,
    pub quantity: f64,
    pub avg_price: f64,
}

impl StoredHolding {
    pub fn normalized(symbol: &str, quantity: f64, avg_price: f64) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            quantity: finite_or_zero(quantity),
            avg_price: finite_or_zero(avg_price),
        }
    }

    /// Normalizes an arbitrary JSON value into a stored holding.
    ///
    /// Missing or non-numeric fields coerce to `0.0` / empty symbol; pair with
    /// [`StoredHolding::is_valid`] to drop the wreckage.
    pub fn from_value(value: &Value) -> Self {
        let symbol = value
            .get("symbol")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Self::normalized(
            symbol,
            coerce_f64(value.get("quantity")),
            coerce_f64(value.get("avgPrice")),
        )
    }

    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty()
            && self.quantity.is_finite()
            && self.quantity > 0.0
            && self.avg_price.is_finite()
            && self.avg_price >= 0.0
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
