//! In-memory storage implementation for testing.

use anyhow::Result;
use tokio::sync::Mutex;

use crate::models::StoredHolding;

use super::HoldingsStore;

/// In-memory holdings store for testing purposes.
pub struct MemoryStore {
    holdings: Mutex<Vec<StoredHolding>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            holdings: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HoldingsStore for MemoryStore {
    async fn load(&self) -> Result<Vec<StoredHolding>> {
        let holdings = self.holdings.lock().await;
        Ok(holdings.clone())
    }

    async fn replace(&self, next: &[StoredHolding]) -> Result<()> {
        let mut holdings = self.holdings.lock().await;
        *holdings = next.to_vec();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut holdings = self.holdings.lock().await;
        holdings.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty_and_round_trips() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.load().await?.is_empty());

        let holdings = vec![StoredHolding::normalized("AAPL", 10.0, 150.0)];
        store.replace(&holdings).await?;
        assert_eq!(store.load().await?, holdings);

        store.clear().await?;
        assert!(store.load().await?.is_empty());

        Ok(())
    }
}
