mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;

use crate::models::StoredHolding;

/// Storage port for the persisted holdings document.
///
/// The document is owned by whichever backend holds it; mutation is always
/// full replacement. Backends do not serialize concurrent writers; callers
/// that can race (e.g. an HTTP server) must add their own write lock.
#[async_trait::async_trait]
pub trait HoldingsStore: Send + Sync {
    /// Reads the current collection. Missing documents read as empty.
    async fn load(&self) -> Result<Vec<StoredHolding>>;

    /// Replaces the entire collection.
    async fn replace(&self, holdings: &[StoredHolding]) -> Result<()>;

    /// Drops the document altogether.
    async fn clear(&self) -> Result<()>;
}

/// Inserts or replaces one holding keyed by symbol, returning the new
/// collection.
pub async fn upsert(store: &dyn HoldingsStore, holding: StoredHolding) -> Result<Vec<StoredHolding>> {
    let mut holdings: Vec<StoredHolding> = store
        .load()
        .await?
        .into_iter()
        .filter(|existing| existing.symbol != holding.symbol)
        .collect();
    holdings.push(holding);

    store.replace(&holdings).await?;
    Ok(holdings)
}

/// Removes one holding by symbol. Returns the new collection and whether
/// anything was removed.
pub async fn remove(
    store: &dyn HoldingsStore,
    symbol: &str,
) -> Result<(Vec<StoredHolding>, bool)> {
    let symbol = symbol.trim().to_uppercase();
    let holdings = store.load().await?;
    let before = holdings.len();

    let holdings: Vec<StoredHolding> = holdings
        .into_iter()
        .filter(|existing| existing.symbol != symbol)
        .collect();
    let removed = holdings.len() != before;

    if removed {
        store.replace(&holdings).await?;
    }

    Ok((holdings, removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_by_symbol() -> Result<()> {
        let store = MemoryStore::new();
        store
            .replace(&[
                StoredHolding::normalized("AAPL", 10.0, 150.0),
                StoredHolding::normalized("MSFT", 8.0, 310.2),
            ])
            .await?;

        let holdings = upsert(&store, StoredHolding::normalized("AAPL", 12.0, 160.0)).await?;

        assert_eq!(holdings.len(), 2);
        // Replaced entries move to the end of the document.
        assert_eq!(holdings[0].symbol, "MSFT");
        assert_eq!(holdings[1].symbol, "AAPL");
        assert_eq!(holdings[1].quantity, 12.0);

        Ok(())
    }

    #[tokio::test]
    async fn remove_reports_whether_anything_changed() -> Result<()> {
        let store = MemoryStore::new();
        store
            .replace(&[StoredHolding::normalized("AAPL", 10.0, 150.0)])
            .await?;

        let (holdings, removed) = remove(&store, "aapl").await?;
        assert!(removed);
        assert!(holdings.is_empty());

        let (_, removed) = remove(&store, "AAPL").await?;
        assert!(!removed);

        Ok(())
    }
}
