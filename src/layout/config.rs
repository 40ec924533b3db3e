//! Configuration for the layout solver

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Size of the render surface the viewport node `00` represents (width, height)
    pub viewport_size: (f64, f64),

    /// Nominal size for nodes whose declared constraints leave a dimension open
    pub default_node_size: (f64, f64),
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_size: (390.0, 844.0),
            default_node_size: (80.0, 30.0),
        }
    }
}

/// TOML structure; every key is optional
#[derive(Deserialize)]
struct TomlConfig {
    layout: Option<TomlLayout>,
}

#[derive(Deserialize)]
struct TomlLayout {
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    default_width: Option<f64>,
    default_height: Option<f64>,
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the render surface size
    pub fn with_viewport_size(mut self, width: f64, height: f64) -> Self {
        self.viewport_size = (width, height);
        self
    }

    /// Set the nominal node size
    pub fn with_default_node_size(mut self, width: f64, height: f64) -> Self {
        self.default_node_size = (width, height);
        self
    }

    /// Parse a `[layout]` table, filling missing keys from the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();
        if let Some(layout) = raw.layout {
            config.viewport_size = (
                layout.viewport_width.unwrap_or(config.viewport_size.0),
                layout.viewport_height.unwrap_or(config.viewport_size.1),
            );
            config.default_node_size = (
                layout.default_width.unwrap_or(config.default_node_size.0),
                layout.default_height.unwrap_or(config.default_node_size.1),
            );
        }
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
