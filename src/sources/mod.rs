mod mock;
mod rest;

pub use mock::MockBrokerSource;
pub use rest::RestHoldingsSource;

use std::sync::Arc;

use crate::config::SourcesConfig;
use crate::models::{Holding, Source};

/// What can go wrong fetching one source's batch.
///
/// Malformed *data* never surfaces here; unusable rows are filtered out.
/// Errors are reserved for a broken environment (missing configuration) or
/// broken transport.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The endpoint URL was never configured; raised before any network call.
    #[error("endpoint url is not configured")]
    Unconfigured,

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    /// The request itself failed (DNS, connect, body decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Capability: fetch one source's batch of holdings.
///
/// Implementations normalize and validity-filter their rows, so a successful
/// fetch always returns pipeline-ready holdings tagged with the source.
#[async_trait::async_trait]
pub trait HoldingsSource: Send + Sync {
    fn source(&self) -> Source;

    fn name(&self) -> &'static str {
        self.source().as_str()
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>, SourceError>;
}

/// Builds the adapter set for every enabled source in the config.
pub fn create_sources(config: &SourcesConfig) -> Vec<Arc<dyn HoldingsSource>> {
    let mut sources: Vec<Arc<dyn HoldingsSource>> = Vec::new();

    if config.cmc.enabled {
        sources.push(Arc::new(RestHoldingsSource::cmc(&config.cmc)));
    }
    if config.xtb.enabled {
        sources.push(Arc::new(MockBrokerSource::new()));
    }

    sources
}
