//! Mapper configuration.

use crate::error::Result;
use relbind_core::relation::JoinOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default driver identifier.
pub const DEFAULT_DRIVER: &str = "sqlite3";

/// Default connection parameters.
pub const DEFAULT_DATA_SOURCE: &str = ":memory:";

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_data_source() -> String {
    DEFAULT_DATA_SOURCE.to_string()
}

/// Mapper configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Backing-store identifier (e.g., "sqlite3" or "mysql").
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Connection parameters handed to the backing store.
    #[serde(default = "default_data_source")]
    pub data_source: String,

    /// Schema document listing the mapped entities.
    #[serde(default)]
    pub schema_path: Option<PathBuf>,

    /// Tags applied to synthesized join fields (e.g., "primary key").
    #[serde(default)]
    pub join_tags: Option<String>,
}

impl MapperConfig {
    /// Create a configuration for the given driver and connection parameters.
    pub fn new(driver: impl Into<String>, data_source: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            data_source: data_source.into(),
            schema_path: None,
            join_tags: None,
        }
    }

    /// Set the schema document path.
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Set the join field tags.
    pub fn with_join_tags(mut self, tags: impl Into<String>) -> Self {
        self.join_tags = Some(tags.into());
        self
    }

    /// Read a JSON configuration file.
    ///
    /// A relative `schema_path` is resolved against the file's directory.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        if let (Some(schema), Some(dir)) = (&config.schema_path, path.parent()) {
            if schema.is_relative() {
                config.schema_path = Some(dir.join(schema));
            }
        }
        Ok(config)
    }

    /// Join options derived from `join_tags`.
    pub fn join_options(&self) -> Result<JoinOptions> {
        match &self.join_tags {
            Some(tags) => Ok(JoinOptions::from_tags(tags)?),
            None => Ok(JoinOptions::default()),
        }
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DRIVER, DEFAULT_DATA_SOURCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder() {
        let config = MapperConfig::new("mysql", "user:pass@/db")
            .with_schema_path("schema.json")
            .with_join_tags("index");

        assert_eq!(config.driver, "mysql");
        assert_eq!(config.schema_path, Some(PathBuf::from("schema.json")));
        assert_eq!(config.join_options().unwrap().tags.attribute("index"), Some(""));
    }

    #[test]
    fn test_default_join_options() {
        let config = MapperConfig::default();

        assert_eq!(config.driver, DEFAULT_DRIVER);
        assert_eq!(config.join_options().unwrap(), JoinOptions::default());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relbind.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"driver": "mysql", "schema_path": "schema.json"}"#)
            .unwrap();

        let config = MapperConfig::from_json_file(&path).unwrap();

        assert_eq!(config.driver, "mysql");
        assert_eq!(config.data_source, DEFAULT_DATA_SOURCE);
        assert_eq!(config.schema_path, Some(dir.path().join("schema.json")));
        assert!(config.join_tags.is_none());
    }

    #[test]
    fn test_invalid_join_tags() {
        let config = MapperConfig::default().with_join_tags("=x");
        assert!(config.join_options().is_err());
    }
}
