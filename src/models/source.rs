use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown source {value:?}: expected one of \"cmc\", \"xtb\"")]
pub struct SourceParseError {
    value: String,
}

/// Origin system a holding was ingested from.
///
/// Manually entered holdings carry no source tag (`Option<Source>` is `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Price-tracking service (CoinMarketCap-style REST endpoint).
    Cmc,
    /// Brokerage bridge (XTB-style position export).
    Xtb,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Cmc, Source::Xtb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cmc => "cmc",
            Source::Xtb => "xtb",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = SourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cmc" => Ok(Source::Cmc),
            "xtb" => Ok(Source::Xtb),
            _ => Err(SourceParseError {
                value: s.to_string(),
            }),
        }
    }
}
