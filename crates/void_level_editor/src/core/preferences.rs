//! Editor configuration.
//!
//! Persistent settings that survive editor restarts, stored as TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::Color;

/// Errors loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Editor configuration. Missing keys take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub selection: SelectionConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest entries are dropped past this many
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_size: 100 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub selected_color: Color,
    pub highlighted_color: Color,
    /// Pose difference below which an object counts as unmoved (units; radians for rotation)
    pub move_epsilon: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            selected_color: [1.0, 0.0, 0.0],
            highlighted_color: [0.6, 0.6, 0.6],
            move_epsilon: 1e-4,
        }
    }
}

impl EditorConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load the configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save the configuration to a file, creating its directory.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load from the default location, falling back to defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load configuration from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// `<config dir>/void_level_editor/editor.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("void_level_editor");
            p.push("editor.toml");
            p
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history.max_size, 100);
        assert_eq!(config.selection.selected_color, [1.0, 0.0, 0.0]);
        assert!((config.selection.move_epsilon - 1e-4).abs() < 1e-9);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = EditorConfig::from_toml("[history]\nmax_size = 5\n").unwrap();
        assert_eq!(config.history.max_size, 5);
        assert_eq!(config.selection, SelectionConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EditorConfig::default();
        config.selection.highlighted_color = [0.0, 1.0, 0.0];
        let text = config.to_toml().unwrap();
        assert_eq!(EditorConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_file_is_parse_error() {
        let err = EditorConfig::from_toml("[history]\nmax_size = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("void_level_editor_{}", std::process::id()));
        let path = dir.join("editor.toml");
        let mut config = EditorConfig::default();
        config.history.max_size = 12;

        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = EditorConfig::default_path() {
            assert!(path.ends_with("void_level_editor/editor.toml"));
        }
    }
}
