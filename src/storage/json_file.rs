use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::models::StoredHolding;

use super::HoldingsStore;

/// JSON file-backed holdings store.
///
/// The whole collection lives in one pretty-printed document (an array of
/// holdings) with a trailing newline. Entries are re-normalized and
/// validity-filtered on every read, so a hand-edited or partially corrupt
/// document degrades to its usable rows instead of poisoning the pipeline.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Conventional `holdings.json` inside a data directory.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join("holdings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create data directory")?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl HoldingsStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<StoredHolding>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read holdings from {}", self.path.display())
                })
            }
        };

        let parsed: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from {}", self.path.display()))?;

        // A document that is valid JSON but not an array reads as empty.
        let list = parsed.as_array().cloned().unwrap_or_default();

        Ok(list
            .iter()
            .map(StoredHolding::from_value)
            .filter(StoredHolding::is_valid)
            .collect())
    }

    async fn replace(&self, holdings: &[StoredHolding]) -> Result<()> {
        self.ensure_parent_dir().await?;

        let mut content =
            serde_json::to_string_pretty(holdings).context("Failed to serialize holdings")?;
        content.push('\n');

        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write holdings to {}", self.path.display()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove holdings at {}", self.path.display())
            }),
        }
    }
}
