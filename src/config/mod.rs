//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment variable naming the YAML config file to load.
pub const CONFIG_ENV_VAR: &str = "RUGOPS_CONFIG";

/// Server configuration.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides. Without a file the defaults give a development server on port
/// 3000 with the in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// Path of the legacy JSON snapshot read by the migration endpoint.
    pub snapshot_path: String,

    /// SQLite database URL. When set (and the `sqlite` feature is compiled
    /// in) the server uses the sqlite backend instead of the in-memory one.
    pub database_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            snapshot_path: "data/orders.json".to_string(),
            database_url: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from the file named by `RUGOPS_CONFIG`, or fall back to the
    /// defaults when the variable is unset.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_yaml_file(&path),
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.snapshot_path, "data/orders.json");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str("bind_addr: 127.0.0.1:8080\n").unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.snapshot_path, "data/orders.json");
    }

    #[test]
    fn test_full_yaml() {
        let yaml = "bind_addr: 0.0.0.0:9000\nsnapshot_path: /var/lib/rugops/orders.json\ndatabase_url: sqlite://rugops.db\n";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.snapshot_path, "/var/lib/rugops/orders.json");
        assert_eq!(config.database_url.as_deref(), Some("sqlite://rugops.db"));
    }
}
