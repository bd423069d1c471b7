use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod targets;

pub use app_config::AppConfig;
pub use config::{load_config, load_config_from_env};
pub use targets::{display_name, load_targets};

/// One `(year, make, model)` scrape target read from the catalog.
///
/// Immutable once loaded; the catalog is the only source of targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub year: i32,
    pub make: String,
    pub model: String,
}

impl Target {
    /// Identity key for dedupe/merge against the result store.
    #[must_use]
    pub fn key(&self) -> TargetKey {
        TargetKey::new(self.year, &self.make, &self.model)
    }

    /// Human-readable form for log lines, e.g. `"2020 Honda Civic"`.
    #[must_use]
    pub fn pretty(&self) -> String {
        format!(
            "{} {} {}",
            self.year,
            display_name(&self.make),
            display_name(&self.model)
        )
    }
}

/// Identity of a target in the result store.
///
/// Built from the display-normalized make/model (see [`display_name`]) so
/// that catalog casing variants (`"honda"` vs `"Honda"`) resolve to the
/// same persisted row. Comparison is exact-string after that normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    pub year: i32,
    pub make: String,
    pub model: String,
}

impl TargetKey {
    #[must_use]
    pub fn new(year: i32, make: &str, model: &str) -> Self {
        Self {
            year,
            make: display_name(make),
            model: display_name(model),
        }
    }
}

impl std::fmt::Display for TargetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)
    }
}

/// Aggregated quartile summary for one target, in persisted form.
///
/// `make`/`model` carry the display-normalized spelling. Invariant:
/// `p25 <= median <= p75`, all rounded to whole currency units, and
/// `n` met the configured minimum-sample threshold at aggregation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSummary {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub median: i64,
    pub p25: i64,
    pub p75: i64,
    pub n: u32,
    pub source: String,
    #[serde(rename = "ts")]
    pub scraped_at: String,
}

impl PriceSummary {
    /// Identity key of this row, matching [`Target::key`].
    #[must_use]
    pub fn key(&self) -> TargetKey {
        TargetKey::new(self.year, &self.make, &self.model)
    }
}

/// Failures loading configuration or the target catalog.
///
/// All of these are fatal at startup — nothing has been fetched yet, so
/// the binary reports the error and exits non-zero.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    FileParse(#[from] serde_yaml::Error),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("cannot read target catalog {path}: {source}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed target catalog {path}: {source}")]
    CatalogCsv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration: {0}")]
    Validation(String),
}
