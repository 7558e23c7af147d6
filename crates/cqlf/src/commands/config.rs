//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/cqlf/config.toml.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cql_filter::{Schema, ValueType};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandContext, CommandError, Result};
use crate::record::{build_schema, Record};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "CQLF_CONFIG";

/// Starter config written by `cqlf config init`.
const DEFAULT_CONFIG: &str = r#"# cqlf - CQL filter CLI configuration

# Config schema version (do not modify)
version = 1

# Output preferences
[output]
# color = true              # Enable colors (respects --no-color)

# Record properties available to filters. Dotted names reach into nested
# objects. Types: text, integer, decimal, boolean, instant, duration,
# interval, geometry.
[[schema]]
name = "name"
type = "text"

[[schema]]
name = "size"
type = "integer"

# [[schema]]
# name = "location"
# type = "geometry"

# Properties stored elsewhere can be declared but not filtered in memory.
# [[schema]]
# name = "owner"
# type = "text"
# resolvable = true
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Record properties.
    #[serde(default)]
    pub schema: Vec<PropertyConfig>,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            output: OutputConfig::default(),
            schema: Vec::new(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// One record property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property path; dots reach into nested objects.
    pub name: String,

    /// Declared value type.
    #[serde(rename = "type")]
    pub value_type: ValueType,

    /// Value is not held in the record.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub resolvable: bool,
}

/// Gets the config file path.
///
/// Priority: `--schema` flag, then `CQLF_CONFIG`, then
/// `$XDG_CONFIG_HOME/cqlf/config.toml`, then `~/.config/cqlf/config.toml`.
pub fn get_config_path(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("cqlf").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("cqlf").join("config.toml"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk.
///
/// A missing file yields the default (empty) configuration.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    validate_schema(&config.schema)?;
    debug!(path = %path.display(), properties = config.schema.len(), "loaded config");

    migrate_config(config)
}

/// Loads the record schema declared in the config file.
///
/// # Errors
///
/// Fails if the config cannot be read or declares no properties.
pub fn load_schema(path: &Path) -> Result<Schema<Record>> {
    let config = load_config(path)?;
    if config.schema.is_empty() {
        return Err(CommandError::Config(format!(
            "No schema properties in {} (run 'cqlf config init' to create a starter config)",
            path.display()
        )));
    }
    Ok(build_schema(&config.schema))
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: Config) -> Result<Config> {
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Checks that property names are non-empty and unique.
fn validate_schema(schema: &[PropertyConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for property in schema {
        let name = property.name.trim();
        if name.is_empty() {
            return Err(CommandError::Config(
                "Schema property with empty name".to_string(),
            ));
        }
        if !seen.insert(name) {
            return Err(CommandError::Config(format!(
                "Schema property '{}' is declared twice",
                name
            )));
        }
    }
    Ok(())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext, path: &Path) -> Result<()> {
    let config = load_config(path)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }

            println!("\n[schema]");
            if config.schema.is_empty() {
                println!("  (no properties)");
            }
            for property in &config.schema {
                let marker = if property.resolvable { " (resolvable)" } else { "" };
                println!("  {:<24} {}{}", property.name, property.value_type, marker);
            }
        } else {
            println!("(No config file exists. Run 'cqlf config init' to create one.)");
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext, path: &Path) -> Result<()> {
    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, path: &Path, force: bool) -> Result<()> {
    write_default_config(path, force)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Created config at: {}", path.display());
    }

    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CommandError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    fs::write(path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}
