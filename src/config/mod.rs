//! Configuration management for scout-elastic
//!
//! Engine settings live in a TOML file. Values can be overridden per profile
//! and through `SCOUT_ELASTIC_SECTION__KEY` environment variables.

use crate::error::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

pub const ENV_PREFIX: &str = "SCOUT_ELASTIC_";

/// Engine settings plus named override profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub engine: EngineConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Schema version and timestamps of the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Indexing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexerKind {
    Single,
    Bulk,
}

impl fmt::Display for IndexerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Bulk => f.write_str("bulk"),
        }
    }
}

impl std::str::FromStr for IndexerKind {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "bulk" => Ok(Self::Bulk),
            other => Err(ScoutError::InvalidConfigValue {
                path: "engine.indexer".to_string(),
                message: format!("Indexer must be 'single' or 'bulk', got '{}'", other),
            }),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub indexer: IndexerKind,
    /// Push each record type's mapping once before its first update
    pub update_mapping: bool,
    /// Filter soft-deleted records and write the marker field
    pub soft_delete: bool,
    /// `refresh` sent with document writes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_refresh: Option<String>,
}

/// Engine settings a profile replaces; unset fields keep the base value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexer: Option<IndexerKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mapping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_delete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_refresh: Option<String>,
}

impl Config {
    /// Read, apply env overrides, validate
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScoutError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ScoutError::Io {
            source: e,
            context: format!("Cannot read engine config {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ScoutError::Io {
                source: e,
                context: format!("Cannot create directory for engine config {:?}", parent),
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ScoutError::Io {
            source: e,
            context: format!("Cannot write engine config {:?}", path),
        })?;
        Ok(())
    }

    /// [`load`](Self::load) followed by [`apply_profile`](Self::apply_profile)
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Overlay the named profile on `[engine]`
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| ScoutError::Config(format!("Unknown profile: {}", profile)))?;

        if let Some(indexer) = overrides.indexer {
            self.engine.indexer = indexer;
        }
        if let Some(update_mapping) = overrides.update_mapping {
            self.engine.update_mapping = update_mapping;
        }
        if let Some(soft_delete) = overrides.soft_delete {
            self.engine.soft_delete = soft_delete;
        }
        if let Some(refresh) = overrides.document_refresh {
            self.engine.document_refresh = Some(refresh);
        }

        tracing::debug!("Applied profile {}", profile);
        Ok(())
    }

    /// Overlay `SCOUT_ELASTIC_ENGINE__<KEY>` variables. Bad values are logged and skipped.
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Ignoring {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "ENGINE__INDEXER" => {
                self.engine.indexer = value.parse()?;
            }
            "ENGINE__UPDATE_MAPPING" => {
                self.engine.update_mapping = parse_bool(path, value)?;
            }
            "ENGINE__SOFT_DELETE" => {
                self.engine.soft_delete = parse_bool(path, value)?;
            }
            "ENGINE__DOCUMENT_REFRESH" => {
                self.engine.document_refresh = Some(value.to_string()).filter(|v| !v.is_empty());
            }
            _ => {
                tracing::debug!("No engine setting matches {}{}", ENV_PREFIX, path);
            }
        }
        Ok(())
    }

    /// `<config_dir>/scout-elastic/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ScoutError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("scout-elastic").join("config.toml"))
    }

    /// Stamp `last_modified` with the current time
    pub fn touch(&mut self) {
        self.meta.last_modified = current_timestamp();
    }
}

fn parse_bool(path: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|_| ScoutError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("expected true or false, got '{}'", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "bulk_load".to_string(),
            ProfileOverrides {
                indexer: Some(IndexerKind::Bulk),
                document_refresh: Some("false".to_string()),
                ..ProfileOverrides::default()
            },
        );

        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            engine: EngineConfig {
                indexer: IndexerKind::Single,
                update_mapping: true,
                soft_delete: false,
                document_refresh: None,
            },
            profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.engine.indexer, IndexerKind::Single);
        assert!(parsed.engine.update_mapping);
        assert!(parsed.profiles.contains_key("bulk_load"));
    }

    #[test]
    fn test_apply_profile() {
        let mut config = Config::default();
        config.apply_profile("bulk_load").unwrap();
        assert_eq!(config.engine.indexer, IndexerKind::Bulk);
        assert_eq!(config.engine.document_refresh.as_deref(), Some("false"));

        assert!(config.apply_profile("missing").is_err());
    }

    #[test]
    fn test_env_value_parsing() {
        let mut config = Config::default();
        config.set_value_from_env("ENGINE__INDEXER", "BULK").unwrap();
        config.set_value_from_env("ENGINE__SOFT_DELETE", "true").unwrap();
        assert_eq!(config.engine.indexer, IndexerKind::Bulk);
        assert!(config.engine.soft_delete);

        assert!(config.set_value_from_env("ENGINE__UPDATE_MAPPING", "maybe").is_err());
        assert!(config.set_value_from_env("ENGINE__INDEXER", "parallel").is_err());
    }
}
