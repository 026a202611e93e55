use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PipeError, Result};

/// Global offerpipe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Operator name stamped on every extracted row
    #[serde(default = "default_operator")]
    pub operator: String,

    /// Default CSV output path for `run` when --csv is not given
    #[serde(default)]
    pub csv_path: Option<String>,

    /// External record store; upserts are skipped when absent
    #[serde(default)]
    pub sink: Option<SinkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Record store base URL, e.g. "https://api.example.com/v0/appXXXX"
    pub endpoint: String,
    /// Table name within the store
    pub table: String,
    /// API key; prefer the OFFERPIPE_API_KEY environment variable
    #[serde(default)]
    pub api_key: Option<String>,
    /// Records per upsert call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_operator() -> String {
    "Yallo".to_string()
}

fn default_batch_size() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            operator: default_operator(),
            csv_path: None,
            sink: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PipeError::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Supports OFFERPIPE_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("OFFERPIPE_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "offerpipe")
            .ok_or_else(|| PipeError::Config("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolve the sink API key: config value, then environment
    pub fn sink_api_key(&self) -> Option<String> {
        self.sink
            .as_ref()
            .and_then(|s| s.api_key.clone())
            .or_else(|| std::env::var("OFFERPIPE_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.operator, "Yallo");
        assert!(config.sink.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_text = r#"
            operator = "Wingo"
            csv_path = "out/offers.csv"

            [sink]
            endpoint = "https://api.example.com/v0/app123"
            table = "Offers"
            batch_size = 10
        "#;
        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.operator, "Wingo");
        let sink = config.sink.unwrap();
        assert_eq!(sink.table, "Offers");
        assert_eq!(sink.batch_size, 10);
        assert!(sink.api_key.is_none());
    }
}
