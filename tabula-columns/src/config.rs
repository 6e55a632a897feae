//! Validation configuration loaded with figment.
//!
//! Sources are merged in precedence order (later overrides earlier):
//! 1. Built-in defaults
//! 2. An optional config file (`.toml`, `.yaml`/`.yml` or `.json`)
//! 3. `TABULA_` prefixed environment variables, nested keys separated by
//!    `__` (e.g. `TABULA_REPORT__MAX_ISSUES=5`)

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ColumnsError, Result};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "TABULA_";

/// What happens to object keys a schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    /// Keep them in the output untouched
    #[default]
    Passthrough,
    /// Drop them from the output
    Strip,
    /// Report each one as an issue
    Strict,
}

/// Shape of the readable summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// First words of the summary
    pub prefix: String,
    /// List at most this many issues, then "… and N more"
    pub max_issues: Option<usize>,
    /// Whether "Invalid 'x' variant" lines are listed
    pub include_variant_summaries: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            prefix: "Validation error".to_string(),
            max_issues: None,
            include_variant_summaries: true,
        }
    }
}

/// Configuration of a `check` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub unknown_keys: UnknownKeys,
    pub report: ReportConfig,
}

impl CheckConfig {
    /// Defaults merged with `TABULA_` environment variables.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(CheckConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load defaults + environment.
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment())
    }

    /// Load defaults + the file at `path` + environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Figment::from(Toml::file(path)),
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            other => {
                return Err(ColumnsError::UnsupportedFormat {
                    format: other.unwrap_or_default().to_string(),
                })
            }
        };
        debug!(path = %path.display(), "loading check configuration");
        let figment = Figment::from(Serialized::defaults(CheckConfig::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(figment)
    }

    /// Extract from an arbitrary figment, for callers composing their own sources.
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: CheckConfig = figment.extract()?;
        debug!(unknown_keys = ?config.unknown_keys, "check configuration loaded");
        Ok(config)
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }
}
