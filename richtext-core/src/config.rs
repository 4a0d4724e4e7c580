//! Configuration management for richtext

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::history::DEFAULT_CAPACITY;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub history: HistoryConfig,
}

/// Pre-processing applied to raw HTML before parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Replace curly quotes with their ASCII counterparts
    pub normalize_quotes: bool,
    /// Turn `\r\n` and lone `\r` into `\n`
    pub normalize_newlines: bool,
    /// Turn `\n` into `<br>` (for plain-text sources)
    pub newlines_to_breaks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Export a document holding only one empty paragraph as ""
    pub collapse_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            normalize_quotes: true,
            normalize_newlines: true,
            newlines_to_breaks: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            collapse_empty: true,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "richtext")
            .map(|proj_dirs| proj_dirs.config_dir().join("richtext.toml"))
    }

    /// Load configuration from the default location, falling back to
    /// defaults if the file is missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.input.normalize_quotes);
        assert!(config.input.normalize_newlines);
        assert!(!config.input.newlines_to_breaks);
        assert!(config.output.collapse_empty);
        assert_eq!(config.history.capacity, 100);
    }

    #[test]
    fn test_load_valid_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(
            b"[input]\n\
normalize_quotes = false\n\
normalize_newlines = true\n\
newlines_to_breaks = true\n\
\n\
[output]\n\
collapse_empty = false\n\
\n\
[history]\n\
capacity = 25\n",
        )?;

        let config = Config::load_from(file.path())?;
        assert!(!config.input.normalize_quotes);
        assert!(config.input.newlines_to_breaks);
        assert!(!config.output.collapse_empty);
        assert_eq!(config.history.capacity, 25);
        Ok(())
    }

    #[test]
    fn test_load_partial_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"[history]\ncapacity = 5\n")?;

        let config = Config::load_from(file.path())?;
        assert_eq!(config.history.capacity, 5);
        assert_eq!(config.input, InputConfig::default());
        assert_eq!(config.output, OutputConfig::default());
        Ok(())
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"invalid toml [[[syntax").unwrap();

        let result = Config::load_from(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("absent.toml"));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_world_writable_config_rejected() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new()?;
        file.write_all(b"[output]\ncollapse_empty = true\n")?;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o666))?;

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("world-writable"));
        Ok(())
    }

    #[test]
    fn test_config_path_returns_some() {
        let path = Config::config_path();
        assert!(path.is_some());
        if let Some(p) = path {
            assert!(p.to_string_lossy().contains("richtext"));
            assert!(p.to_string_lossy().ends_with("richtext.toml"));
        }
    }

    #[test]
    fn test_serialization_round_trip() -> Result<()> {
        let config = Config {
            history: HistoryConfig { capacity: 7 },
            ..Default::default()
        };

        let toml_str = toml::to_string(&config)?;
        assert!(toml_str.contains("capacity = 7"));

        let parsed: Config = toml::from_str(&toml_str)?;
        assert_eq!(parsed, config);
        Ok(())
    }
}
