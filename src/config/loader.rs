//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

pub const NAMESPACE_ENV: &str = "FLUX_SOURCE_NAMESPACE";
pub const OUTPUT_ENV: &str = "FLUX_SOURCE_OUTPUT";
pub const LOG_LEVEL_ENV: &str = "FLUX_SOURCE_LOG_LEVEL";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit file and environment lookup
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load_from<F>(path: &Path, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_defaults();

        if path.exists() {
            config = Self::load_file(path)?;
        }

        Ok(Self::apply_env_overrides(config, env))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // An empty file deserializes to null, which means "all defaults"
        if contents.trim().is_empty() {
            return Ok(Self::load_defaults());
        }

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// This fails on:
    /// - Invalid YAML syntax or value types
    /// - File read errors
    /// - A logger level that is not a valid filter directive
    pub fn validate(path: &Path) -> Result<Config> {
        let config = Self::load_from(path, |_| None)?;

        tracing_subscriber::EnvFilter::try_new(&config.logger.level).with_context(|| {
            format!(
                "logger.level '{}' is not a valid filter directive",
                config.logger.level
            )
        })?;

        Ok(config)
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides<F>(mut config: Config, env: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(namespace) = env(NAMESPACE_ENV) {
            config.default_namespace = namespace;
        }

        if let Some(output) = env(OUTPUT_ENV) {
            match output.parse() {
                Ok(format) => config.output.format = format,
                Err(e) => tracing::warn!("Ignoring {}: {}", OUTPUT_ENV, e),
            }
        }

        if let Some(level) = env(LOG_LEVEL_ENV) {
            config.logger.level = level;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::OutputFormat;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.default_namespace, "flux-system");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_from(&tmp.path().join("config.yaml"), no_env).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_file_layer() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "defaultNamespace: apps\noutput:\n  noHeaders: true\n").unwrap();

        let config = ConfigLoader::load_from(&path, no_env).unwrap();
        assert_eq!(config.default_namespace, "apps");
        assert!(config.output.no_headers);
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "output:\n  format: xml\n").unwrap();

        assert!(ConfigLoader::load_from(&path, no_env).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (NAMESPACE_ENV, "team-a"),
            (OUTPUT_ENV, "json"),
            (LOG_LEVEL_ENV, "debug"),
        ]
        .into_iter()
        .collect();

        let config =
            ConfigLoader::apply_env_overrides(Config::default(), |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.default_namespace, "team-a");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.logger.level, "debug");
    }

    #[test]
    fn test_invalid_env_output_is_ignored() {
        let config = ConfigLoader::apply_env_overrides(Config::default(), |k| {
            (k == OUTPUT_ENV).then(|| "xml".to_string())
        });
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.output.format = OutputFormat::Yaml;
        ConfigLoader::save(&config, &path).unwrap();

        let loaded = ConfigLoader::load_from(&path, no_env).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "logger:\n  level: flux_source=verbose\n").unwrap();

        assert!(ConfigLoader::validate(&path).is_err());
    }
}
