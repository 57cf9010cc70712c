//! Configuration for the planner CLI

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Session settings
#[derive(Debug, Default, Deserialize)]
pub struct PlannerConfig {
    /// User whose data is persisted; absent means nothing is saved
    #[serde(default)]
    pub user_id: Option<String>,
    /// Start in demo mode with sample data
    #[serde(default)]
    pub demo_mode: bool,
    /// Heading for generated reports
    #[serde(default)]
    pub report_title: Option<String>,
}

/// Persistence settings
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Database path (default: <data_dir>/planner.sqlite)
    #[serde(default)]
    pub database: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse {}. Check for:\n\
                 - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
                 - Incorrect data types (demo_mode and enabled are booleans)\n\n\
                 See config.toml.example for the expected format.",
                path.display()
            )
        })
    }

    /// Load the file if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Settings resolved from the config file and command-line flags
#[derive(Debug)]
pub struct Config {
    pub user_id: Option<String>,
    pub demo_mode: bool,
    pub report_title: String,
    /// SQLite database path, None when storage is disabled
    pub database: Option<PathBuf>,
}

impl Config {
    /// Resolve runtime config; flags win over file values
    pub fn from_file(
        file_config: &FileConfig,
        data_dir: &Path,
        user_override: Option<String>,
        demo_override: bool,
    ) -> Self {
        let storage = &file_config.storage;
        let database = storage.enabled.then(|| {
            storage
                .database
                .clone()
                .unwrap_or_else(|| data_dir.join(constants::DATABASE_FILENAME))
        });

        Self {
            user_id: user_override
                .or_else(|| file_config.planner.user_id.clone())
                .filter(|id| !id.trim().is_empty()),
            demo_mode: demo_override || file_config.planner.demo_mode,
            report_title: file_config
                .planner
                .report_title
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_REPORT_TITLE.to_string()),
            database,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: FileConfig = toml::from_str(
            r#"
            [planner]
            user_id = "founder"
            demo_mode = true
            report_title = "Board Update"

            [storage]
            enabled = false
            database = "/tmp/other.sqlite"
            "#,
        )
        .unwrap();

        assert_eq!(config.planner.user_id.as_deref(), Some("founder"));
        assert!(config.planner.demo_mode);
        assert!(!config.storage.enabled);
        assert_eq!(config.storage.database, Some(PathBuf::from("/tmp/other.sqlite")));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.planner.user_id.is_none());
        assert!(!config.planner.demo_mode);
        assert!(config.storage.enabled);
    }

    #[test]
    fn test_flags_override_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [planner]
            user_id = "from-file"
            "#,
        )
        .unwrap();

        let config = Config::from_file(&file, Path::new("data"), Some("from-flag".into()), true);

        assert_eq!(config.user_id.as_deref(), Some("from-flag"));
        assert!(config.demo_mode);
        assert_eq!(config.database, Some(PathBuf::from("data").join("planner.sqlite")));
        assert_eq!(config.report_title, "Financial Runway Report");
    }

    #[test]
    fn test_disabled_storage_has_no_database() {
        let mut file = FileConfig::default();
        file.storage.enabled = false;
        file.planner.user_id = Some("   ".into());

        let config = Config::from_file(&file, Path::new("data"), None, false);

        assert!(config.database.is_none());
        assert!(config.user_id.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert!(config.storage.enabled);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[planner\nuser_id = ").unwrap();

        let err = FileConfig::load_or_default(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }
}
