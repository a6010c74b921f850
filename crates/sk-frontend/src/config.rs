//! Editor configuration
//!
//! Stored as RON. Every field has a default, so partial files load.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sk_renderer::RendererConfig;

use crate::error::ConfigError;

/// Snapping settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapConfig {
    /// Screen distance in pixels within which a snap applies
    pub distance: f32,
    /// Remembered snap points
    pub max_references: usize,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            distance: 14.0,
            max_references: 5,
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    /// Seconds before an unanswered pick chooser is cancelled
    pub chooser_timeout: f64,
    pub renderer: RendererConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            chooser_timeout: 10.0,
            renderer: RendererConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse from a RON string
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Load from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
