//! TOML configuration for the catalog, the access gate and the export mode.
//!
//! Every section is optional. A missing file is not an error for the catalog
//! process, which falls back to [`Config::default`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable the catalog reads its config path from.
pub const CONFIG_ENV: &str = "ECU_CATALOG_CONFIG";

/// Path used when neither a flag nor [`CONFIG_ENV`] names one.
pub const DEFAULT_CONFIG_PATH: &str = "./config/ecu.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/ecus.db")
}

#[derive(Debug, Deserialize, Clone)]
pub struct GateConfig {
    #[serde(default = "default_users_db")]
    pub users_db: PathBuf,
    /// Catalog executable to launch. Defaults to `ecu-catalog` next to the
    /// running gate binary.
    #[serde(default)]
    pub catalog_bin: Option<PathBuf>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            users_db: default_users_db(),
            catalog_bin: None,
        }
    }
}

fn default_users_db() -> PathBuf {
    PathBuf::from("./data/usuarios.db")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// Prepend the `id` column to exported files.
    #[serde(default)]
    pub include_id: bool,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise return the defaults.
///
/// A file that exists but cannot be read or parsed is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

/// Resolve the catalog's config path from [`CONFIG_ENV`].
pub fn catalog_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn validate(config: &Config) -> Result<()> {
    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }
    if config.gate.users_db.as_os_str().is_empty() {
        anyhow::bail!("gate.users_db must not be empty");
    }
    Ok(())
}
