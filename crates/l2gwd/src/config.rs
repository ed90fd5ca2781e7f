//! Daemon configuration
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use l2gw_core::SegmentationRule;
use serde::Deserialize;

pub const DEFAULT_BIND: &str = "0.0.0.0:9697";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, `host:port`
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file; in-memory when absent
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Whether connections or interfaces carry the VLAN tag
    pub rule: SegmentationRule,
}

impl Config {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.store.path, None);
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.mapping.rule, SegmentationRule::MatchInterfaces);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:8080"

            [store]
            path = "/var/lib/l2gw/l2gw.db"

            [log]
            format = "json"

            [mapping]
            rule = "complement_interfaces"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.store.path, Some(PathBuf::from("/var/lib/l2gw/l2gw.db")));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.mapping.rule, SegmentationRule::ComplementInterfaces);
    }

    #[test]
    fn test_unknown_rule_rejected() {
        assert!(Config::from_toml("[mapping]\nrule = \"sometimes\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"127.0.0.1:9000\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::load(Path::new("/nonexistent/l2gwd.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/l2gwd.toml"));
    }
}
