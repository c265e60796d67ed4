use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bmi_core::service::Latency;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Read-only settings. Nothing the calculator produces is ever written back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log_level: String,
    pub debounce_ms: u64,
    pub latency: LatencyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyConfig {
    pub read_ms: u64,
    pub write_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            debounce_ms: 300,
            latency: LatencyConfig::default(),
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            read_ms: 200,
            write_ms: 300,
        }
    }
}

impl Config {
    /// `config.toml` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "bmi").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        let level = config.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            bail!(
                "Invalid log_level '{}'. Must be one of: {}",
                config.log_level,
                LOG_LEVELS.join(", ")
            );
        }
        Ok(Config {
            log_level: level,
            ..config
        })
    }

    pub fn without_latency(mut self) -> Self {
        self.latency = LatencyConfig {
            read_ms: 0,
            write_ms: 0,
        };
        self
    }

    pub fn latency(&self) -> Latency {
        Latency::from_millis(self.latency.read_ms, self.latency.write_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.latency(), Latency::default());
        assert_eq!(config.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::parse(
            "log_level = \"DEBUG\"\ndebounce_ms = 50\n\n[latency]\nread_ms = 0\nwrite_ms = 10\n",
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.latency(), Latency::from_millis(0, 10));
    }

    #[test]
    fn test_parse_rejects_unknown_keys_and_levels() {
        assert!(Config::parse("colour = \"blue\"").is_err());
        assert!(Config::parse("log_level = \"loud\"").is_err());
    }

    #[test]
    fn test_without_latency() {
        let config = Config::default().without_latency();
        assert_eq!(config.latency(), Latency::none());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce_ms = 120").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.debounce_ms, 120);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));
    }
}
