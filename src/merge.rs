//! Quantity-weighted merge of same-symbol holdings across sources.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Holding, Source};

/// One symbol's combined position across every contributing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedHolding {
    pub symbol: String,
    /// Sum of the contributing quantities.
    pub quantity: f64,
    /// Quantity-weighted average cost basis.
    pub avg_price: f64,
    /// Quantity-weighted average mark price.
    pub current_price: f64,
    /// Contributing source tags, de-duplicated, in first-seen order. Manual
    /// entries carry no tag and contribute nothing here.
    pub sources: Vec<Source>,
}

struct Bucket {
    symbol: String,
    quantity: f64,
    weighted_cost: f64,
    weighted_market: f64,
    sources: Vec<Source>,
}

/// Merges a flat sequence of holdings by symbol.
///
/// Pure function: inputs are not mutated and no I/O happens. Output order
/// follows first-seen symbol order.
pub fn merge_holdings(holdings: &[Holding]) -> Vec<MergedHolding> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for item in holdings {
        let at = match index.get(&item.symbol) {
            Some(&at) => at,
            None => {
                index.insert(item.symbol.clone(), buckets.len());
                buckets.push(Bucket {
                    symbol: item.symbol.clone(),
                    quantity: 0.0,
                    weighted_cost: 0.0,
                    weighted_market: 0.0,
                    sources: Vec::new(),
                });
                buckets.len() - 1
            }
        };
        let bucket = &mut buckets[at];

        bucket.quantity += item.quantity;
        bucket.weighted_cost += item.quantity * item.avg_price;
        bucket.weighted_market += item.quantity * item.current_price;
        if let Some(source) = item.source {
            if !bucket.sources.contains(&source) {
                bucket.sources.push(source);
            }
        }
    }

    buckets
        .into_iter()
        .map(|bucket| MergedHolding {
            symbol: bucket.symbol,
            quantity: bucket.quantity,
            avg_price: weighted_average(bucket.weighted_cost, bucket.quantity),
            current_price: weighted_average(bucket.weighted_market, bucket.quantity),
            sources: bucket.sources,
        })
        .collect()
}

fn weighted_average(weighted_sum: f64, total_quantity: f64) -> f64 {
    if total_quantity == 0.0 {
        0.0
    } else {
        weighted_sum / total_quantity
    }
}
