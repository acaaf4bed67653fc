//! Sentinel configuration, loaded from a JSON file.

use crate::error::{Result, SentinelError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "NIDS_SENTINEL_CONFIG";

const CONFIG_FILE: &str = "sentinel.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// Scoring model location and fallback policy
    pub model: ModelConfig,
    /// Safety score bands for the interactive path
    pub bands: BandConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX export of the outlier model
    pub path: PathBuf,
    /// Graph output carrying the decision function; first output when unset
    pub output_name: Option<String>,
    /// Fit a throwaway forest on random data when the model file is missing
    pub synthetic_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    /// Score at or above this is Safe (0–100)
    pub safe_threshold: u8,
    /// Score at or above this is Elevated
    pub elevated_threshold: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("iso_forest_model.onnx"),
            output_name: Some("scores".to_string()),
            synthetic_fallback: false,
        }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            safe_threshold: 80,
            elevated_threshold: 50,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SentinelConfig {
    /// Load from JSON file if present; otherwise return default.
    /// A file that exists but does not parse is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| {
            SentinelError::configuration(format!("{}: {}", path.display(), e))
        })
    }

    /// Resolve the config file: explicit path, then `NIDS_SENTINEL_CONFIG`,
    /// then `./sentinel.json`, then the per-user config directory.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(p);
        }
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .map(|d| d.join("nids-sentinel").join(CONFIG_FILE))
            .unwrap_or(local)
    }
}
