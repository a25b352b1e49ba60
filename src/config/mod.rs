//! Configuration system for flux-source
//!
//! A single `config.yaml` layered over built-in defaults, with environment
//! variable overrides on top.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LoggerConfig, OutputConfig, OutputFormat};

/// Keys accepted by `get_config_value` and `set_config_value`
pub const CONFIG_KEYS: &[&str] = &[
    "defaultNamespace",
    "output.format",
    "output.noHeaders",
    "logger.level",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "output.format" => Ok(config.output.format.to_string()),
        "output.noHeaders" => Ok(config.output.no_headers.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "output.format" => {
            config.output.format = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        "output.noHeaders" => {
            config.output.no_headers = value
                .parse()
                .context("output.noHeaders must be 'true' or 'false'")?;
        }
        "logger.level" => {
            tracing_subscriber::EnvFilter::try_new(value)
                .with_context(|| format!("'{}' is not a valid log filter", value))?;
            config.logger.level = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
