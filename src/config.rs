//! Configuration file parser for the `unifeed` command line tool.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings, since they are
//! most likely typos of a real option name.
//!
//! ```toml
//! max_items = 50
//! keep_original_feed = false
//! strict = false
//!
//! [strictness]
//! allow_incorrect_date_formats = false
//! ```
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::options::{ParseOptions, StrictnessOptions};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// The parse options sit at the top level of the file; `strict` is a
/// shorthand that switches every `[strictness]` toggle off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reject malformed input instead of recovering. Overrides `[strictness]`.
    pub strict: bool,

    #[serde(flatten)]
    pub options: ParseOptions,
}

const KNOWN_KEYS: [&str; 6] = [
    "strict",
    "max_items",
    "parse_dates",
    "parse_extensions",
    "keep_original_feed",
    "strictness",
];

const KNOWN_STRICTNESS_KEYS: [&str; 6] = [
    "strip_invalid_characters",
    "auto_close_tags",
    "allow_undisclosed_xml_namespaces",
    "allow_custom_xml_elements",
    "allow_incorrect_date_formats",
    "allow_unescaped_markup",
];

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), strict = config.strict, "Loaded configuration");
        Ok(config)
    }

    /// Parses configuration text. Blank input yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            warn_unknown_keys(&raw, &KNOWN_KEYS, "");
            if let Some(toml::Value::Table(strictness)) = raw.get("strictness") {
                warn_unknown_keys(strictness, &KNOWN_STRICTNESS_KEYS, "strictness.");
            }
        }

        Ok(toml::from_str(content)?)
    }

    /// The effective options, with `strict` applied.
    pub fn parse_options(&self) -> ParseOptions {
        let mut options = self.options.clone();
        if self.strict {
            options.strictness = StrictnessOptions::strict();
        }
        options
    }
}

fn warn_unknown_keys(table: &toml::Table, known: &[&str], section: &str) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            tracing::warn!(key = %format!("{section}{key}"), "Unknown key in config file, ignoring");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.strict);
        assert_eq!(config.parse_options(), ParseOptions::default());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/unifeed_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = std::env::temp_dir().join("unifeed_config_test_whitespace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
max_items = 25
parse_dates = false
parse_extensions = false
keep_original_feed = true

[strictness]
auto_close_tags = false
allow_unescaped_markup = false
"#;
        let options = Config::from_toml(content).unwrap().parse_options();
        assert_eq!(options.max_items, 25);
        assert!(!options.parse_dates);
        assert!(!options.parse_extensions);
        assert!(options.keep_original_feed);
        assert!(!options.strictness.auto_close_tags);
        assert!(!options.strictness.allow_unescaped_markup);
        // untouched toggles keep their lenient default
        assert!(options.strictness.allow_custom_xml_elements);
        assert!(options.strictness.strip_invalid_characters);
    }

    #[test]
    fn test_strict_overrides_strictness_table() {
        let content = "strict = true\n\n[strictness]\nauto_close_tags = true\n";
        let options = Config::from_toml(content).unwrap().parse_options();
        assert_eq!(options.strictness, StrictnessOptions::strict());
        assert_eq!(options.max_items, 0);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::from_toml("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::from_toml("max_items = \"many\"\n").is_err());
        assert!(Config::from_toml("[strictness]\nauto_close_tags = 1\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = "max_items = 3\ntotally_fake_key = 1\n\n[strictness]\nmade_up = true\n";
        let config = Config::from_toml(content).unwrap();
        assert_eq!(config.options.max_items, 3);
    }

    // SEC-014: File size limit
    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("unifeed_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join("unifeed_config_test_load");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "strict = true\nmax_items = 7\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.strict);
        assert_eq!(config.parse_options().max_items, 7);

        std::fs::remove_dir_all(&dir).ok();
    }
}
