use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::codec::TokenPolicy;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Where a loaded [`Config`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    File,

    /// No file existed, so every field holds its default
    Defaults,
}

/// Application configuration, loadable from TOML. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Time between generations while running, in milliseconds
    pub interval_ms: u64,

    /// Directory saved boards are kept in
    pub store_dir: PathBuf,

    /// How cells of a saved board are read back
    pub token_policy: TokenPolicy,

    /// Board height. Derived from the terminal size when unset.
    pub rows: Option<usize>,

    /// Board width. Derived from the terminal size when unset.
    pub cols: Option<usize>,

    /// File log output goes to. The terminal is busy drawing the board.
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            store_dir: PathBuf::from(".lifeboard"),
            token_policy: TokenPolicy::Permissive,
            rows: None,
            cols: None,
            log_file: PathBuf::from("lifeboard.log"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file does not exist.
    ///
    /// Nothing is logged here, since the log file is itself configured. The caller reports a
    /// fallback once logging is set up.
    pub fn load_or_default(path: &Path) -> Result<(Self, Origin), ConfigError> {
        if path.exists() {
            Ok((Self::load(path)?, Origin::File))
        } else {
            Ok((Self::default(), Origin::Defaults))
        }
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Validation("interval_ms must be > 0".into()));
        }
        if self.rows == Some(0) {
            return Err(ConfigError::Validation("rows must be > 0".into()));
        }
        if self.cols == Some(0) {
            return Err(ConfigError::Validation("cols must be > 0".into()));
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file() {
        let config = Config::parse(
            r#"
            interval_ms = 100
            token_policy = "strict"
            rows = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.interval(), Duration::from_millis(100));
        assert_eq!(config.token_policy, TokenPolicy::Strict);
        assert_eq!(config.rows, Some(20));
        assert_eq!(config.cols, None);
        assert_eq!(config.store_dir, PathBuf::from(".lifeboard"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Config::parse("interval_ms = 0").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Config validation error: interval_ms must be > 0"
        );
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Config::parse("cols = 0"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        assert!(matches!(
            Config::parse(r#"token_policy = "lenient""#),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (config, origin) = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(origin, Origin::Defaults);
    }

    #[test]
    fn existing_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifeboard.toml");
        std::fs::write(&path, "interval_ms = 40\n").unwrap();

        let (config, origin) = Config::load_or_default(&path).unwrap();

        assert_eq!(config.interval_ms, 40);
        assert_eq!(origin, Origin::File);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifeboard.toml");
        std::fs::write(&path, "store_dir = \"saves\"\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.store_dir, PathBuf::from("saves"));
    }
}
