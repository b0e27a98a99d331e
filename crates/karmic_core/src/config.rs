//! Runtime configuration.
//!
//! Loading order: defaults, then `config.toml` when given and present,
//! then `KARMIC_*` environment overrides. `load` does not validate; call
//! `validate` before opening storage.

use crate::logging::{default_log_level, parse_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "KARMIC_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "KARMIC_LOG_LEVEL";
pub const DEFAULT_DATABASE_FILENAME: &str = "karmic.db";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Toml { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Toml { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct CoreConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILENAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// File logging is off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl CoreConfig {
    /// Loads `path` (if any) and applies environment overrides.
    ///
    /// A missing file yields defaults; an unreadable or malformed one is
    /// an error.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_toml(path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str, origin: &Path) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|source| ConfigError::Toml {
            path: origin.to_path_buf(),
            source,
        })
    }

    fn load_toml(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Applies `KARMIC_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DB_PATH_ENV).filter(|value| !value.trim().is_empty()) {
            self.storage.database_path = PathBuf::from(path);
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|value| !value.trim().is_empty()) {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.database_path cannot be empty".to_string(),
            ));
        }
        parse_level(&self.logging.level)
            .map_err(|err| ConfigError::Invalid(format!("logging.level: {err}")))?;
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "logging.dir must be absolute, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DB_PATH_ENV, LOG_LEVEL_ENV};
    use std::io::Write;
    use std::path::{Path, PathBuf};

    #[test]
    fn defaults_are_valid() {
        let config = CoreConfig::default();
        assert_eq!(config.storage.database_path, PathBuf::from("karmic.db"));
        assert!(config.logging.dir.is_none());
        config.validate().expect("defaults validate");
    }

    #[test]
    fn partial_toml_keeps_section_defaults() {
        let config = CoreConfig::from_toml_str(
            "[logging]\nlevel = \"warn\"\n",
            Path::new("inline.toml"),
        )
        .expect("parse");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.storage.database_path, PathBuf::from("karmic.db"));
    }

    #[test]
    fn malformed_toml_reports_origin() {
        let error = CoreConfig::from_toml_str("[storage\n", Path::new("broken.toml"))
            .expect_err("malformed");
        assert!(matches!(error, ConfigError::Toml { .. }));
        assert!(error.to_string().contains("broken.toml"));
    }

    #[test]
    fn load_reads_file_and_missing_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "[storage]\ndatabase_path = \"/data/matrix.db\"").expect("write");

        let loaded = CoreConfig::load(Some(&path)).expect("load");
        if std::env::var(DB_PATH_ENV).is_err() {
            assert_eq!(loaded.storage.database_path, PathBuf::from("/data/matrix.db"));
        }

        let missing = CoreConfig::load(Some(&dir.path().join("absent.toml"))).expect("load");
        if std::env::var(DB_PATH_ENV).is_err() {
            assert_eq!(missing.storage.database_path, PathBuf::from("karmic.db"));
        }
    }

    #[test]
    fn overrides_replace_values_and_ignore_blank() {
        let mut config = CoreConfig::default();
        config.apply_overrides(|name| match name {
            DB_PATH_ENV => Some("/tmp/override.db".to_string()),
            LOG_LEVEL_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.storage.database_path, PathBuf::from("/tmp/override.db"));
        assert_eq!(config, CoreConfig {
            storage: config.storage.clone(),
            logging: Default::default(),
        });
    }

    #[test]
    fn validate_rejects_bad_level_and_relative_log_dir() {
        let mut config = CoreConfig::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());

        let mut config = CoreConfig::default();
        config.logging.dir = Some(PathBuf::from("logs"));
        let error = config.validate().expect_err("relative dir");
        assert!(error.to_string().contains("absolute"));

        let mut config = CoreConfig::default();
        config.storage.database_path = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
