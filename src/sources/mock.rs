//! Mocked brokerage adapter.
//!
//! Stand-in for the XTB bridge: given no input, after a bounded delay, it
//! returns a fixed batch of positions in the broker's native shape. Kept as an
//! interface contract until a real integration lands.

use std::time::Duration;

use crate::models::{Holding, Source};

use super::{HoldingsSource, SourceError};

struct MockPosition {
    instrument: &'static str,
    volume: f64,
    avg_open: f64,
    last: f64,
}

const MOCK_POSITIONS: &[MockPosition] = &[
    MockPosition {
        instrument: "AAPL",
        volume: 12.0,
        avg_open: 172.4,
        last: 189.1,
    },
    MockPosition {
        instrument: "TSLA",
        volume: 5.0,
        avg_open: 245.8,
        last: 212.4,
    },
];

const DEFAULT_DELAY: Duration = Duration::from_millis(550);

pub struct MockBrokerSource {
    delay: Duration,
}

impl MockBrokerSource {
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }

    /// Overrides the simulated round-trip delay (tests use zero).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for MockBrokerSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HoldingsSource for MockBrokerSource {
    fn source(&self) -> Source {
        Source::Xtb
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>, SourceError> {
        tokio::time::sleep(self.delay).await;

        Ok(MOCK_POSITIONS
            .iter()
            .map(|position| {
                Holding::normalized(
                    position.instrument,
                    position.volume,
                    position.avg_open,
                    position.last,
                    Some(Source::Xtb),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_the_fixed_batch() {
        let source = MockBrokerSource::new().with_delay(Duration::ZERO);
        let holdings = source.fetch_holdings().await.unwrap();

        assert_eq!(holdings.len(), 2);
        assert_eq!(
            holdings[0],
            Holding::normalized("AAPL", 12.0, 172.4, 189.1, Some(Source::Xtb))
        );
        assert_eq!(
            holdings[1],
            Holding::normalized("TSLA", 5.0, 245.8, 212.4, Some(Source::Xtb))
        );
    }

    #[tokio::test]
    async fn batch_passes_the_validity_predicate() {
        let source = MockBrokerSource::new().with_delay(Duration::ZERO);
        let holdings = source.fetch_holdings().await.unwrap();
        assert!(holdings.iter().all(Holding::is_valid));
    }
}
