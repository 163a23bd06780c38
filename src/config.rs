use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default header used to pass the API key to a REST source.
fn default_api_key_header() -> String {
    "X-API-KEY".to_string()
}

/// Connection settings for a REST holdings source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestSourceConfig {
    /// Whether the source participates in `sync`.
    pub enabled: bool,

    /// Endpoint returning the holdings payload. Fetching an enabled source
    /// without a URL fails fast with a configuration error.
    pub api_url: Option<String>,

    /// Optional API key, sent in `api_key_header` when present.
    pub api_key: Option<String>,

    /// Header name carrying the API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

impl Default for RestSourceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: None,
            api_key: None,
            api_key_header: default_api_key_header(),
        }
    }
}

/// Settings for the mocked brokerage source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MockSourceConfig {
    /// Whether the source participates in `sync`.
    pub enabled: bool,
}

/// Per-source configuration tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub cmc: RestSourceConfig,
    pub xtb: MockSourceConfig,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to data directory. If relative, resolved from the config file
    /// location. If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    /// Source adapter settings.
    pub sources: SourcesConfig,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }

    /// Path of the holdings document inside a resolved data directory.
    pub fn holdings_path(data_dir: &Path) -> PathBuf {
        data_dir.join("holdings.json")
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./folio.toml` if it exists in current directory
/// 2. `~/.local/share/folio/folio.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("folio.toml");
    if local_config.exists() {
        return local_config;
    }

    // XDG data directory fallback
    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("folio").join("folio.toml");
    }

    // Final fallback to local
    local_config
}
