//! Multi-source sync: fan out over every enabled adapter, fan in whatever
//! settled.
//!
//! Each source succeeds or fails independently; one broken endpoint never
//! aborts the batch. Failures come back as human-readable strings so callers
//! can surface them next to the merged data.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::merge::{merge_holdings, MergedHolding};
use crate::models::Holding;
use crate::sources::HoldingsSource;

/// What a sync run produced.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// Flattened holdings from every source that succeeded.
    pub raw: Vec<Holding>,
    /// The merge over `raw`.
    pub merged: Vec<MergedHolding>,
    /// One `"<source>: <message>"` entry per failed source, in source order.
    pub errors: Vec<String>,
}

/// Fetches all sources concurrently and waits for every call to settle.
///
/// No early cancellation: a slow source delays the join but a failing one
/// only contributes an error string.
pub async fn sync_sources(sources: &[Arc<dyn HoldingsSource>]) -> SyncOutcome {
    if sources.is_empty() {
        return SyncOutcome::default();
    }

    let settled = join_all(sources.iter().map(|source| source.fetch_holdings())).await;

    let mut raw = Vec::new();
    let mut errors = Vec::new();

    for (source, result) in sources.iter().zip(settled) {
        match result {
            Ok(holdings) => {
                debug!(source = source.name(), count = holdings.len(), "source synced");
                raw.extend(holdings);
            }
            Err(err) => {
                warn!(source = source.name(), error = %err, "source failed");
                errors.push(format!("{}: {}", source.name(), err));
            }
        }
    }

    let merged = merge_holdings(&raw);

    SyncOutcome {
        raw,
        merged,
        errors,
    }
}
