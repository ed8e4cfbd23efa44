//! # Configuration
//!
//! Optional TOML file read once at startup. Command-line flags override it.
//!
//! ```toml
//! data = "activity.csv"
//! lookback_days = 60
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! # Replaces the standard funnel when present.
//! [[transition]]
//! title = "Talent Pool to Client Folder"
//! from = "Talent Pool"
//! to = "Client Folder"
//! ```

use funnel_core::primitives::DEFAULT_LOOKBACK_DAYS;
use funnel_core::{FunnelError, TransitionSpec, standard_funnel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "funnel.toml";

/// Data file used when neither the flag nor the config names one.
pub const DEFAULT_DATA_FILE: &str = "activity.csv";

// =============================================================================
// CONFIG FILE
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Contents of `funnel.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FunnelConfig {
    /// Path to the event log CSV.
    pub data: Option<PathBuf>,
    /// Days before the latest invitation covered by the default date range.
    pub lookback_days: u32,
    pub server: ServerConfig,
    /// Custom transitions. Empty means the standard funnel.
    #[serde(rename = "transition")]
    pub transitions: Vec<TransitionSpec>,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            data: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            server: ServerConfig::default(),
            transitions: Vec::new(),
        }
    }
}

impl FunnelConfig {
    /// Load from a file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, FunnelError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            FunnelError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| FunnelError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self, FunnelError> {
        toml::from_str(content).map_err(|e| FunnelError::ConfigError(e.to_string()))
    }

    /// The configured transitions, or the standard funnel.
    #[must_use]
    pub fn transitions(&self) -> Vec<TransitionSpec> {
        if self.transitions.is_empty() {
            standard_funnel()
        } else {
            self.transitions.clone()
        }
    }

    /// The data path: flag, then config, then the default file name.
    #[must_use]
    pub fn data_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.data.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
    }
}

// =============================================================================
// TESTS
// =============================================================================
