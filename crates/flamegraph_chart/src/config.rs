//! Chart configuration
//!
//! Defaults match the browser flamegraph front end this crate feeds. A TOML
//! file may override any subset of keys.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use span_tree::DuplicatePolicy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Transition easing curve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    Quad,
    #[default]
    Cubic,
}

impl Ease {
    /// In-out easing of `t` in `[0, 1]`
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Quad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::Cubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Chart width in pixels
    pub width: u32,
    /// Height of one frame row in pixels
    pub cell_height: u32,
    pub transition_ms: u64,
    pub transition_ease: Ease,
    /// Frames narrower than this many pixels are not drawn
    pub min_frame_size: f64,
    /// Sort siblings by name at render time
    pub sort: bool,
    /// Node values are self time and children add to them
    pub self_value: bool,
    pub ignore_case: bool,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            cell_height: 18,
            transition_ms: 250,
            transition_ease: Ease::Cubic,
            min_frame_size: 0.0,
            sort: true,
            self_value: false,
            ignore_case: false,
            duplicate_policy: DuplicatePolicy::Overwrite,
        }
    }
}

impl ChartConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Loaded chart config from {}", path.display());
        Ok(config)
    }
}
