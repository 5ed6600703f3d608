use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wpmove_common::{Error, Result};

use crate::model::AppConfig;

const CONFIG_FILE_NAMES: [&str; 3] = ["config.yml", "config.yaml", "config.toml"];

/// Locates and parses the configuration file, then layers environment
/// overrides on top.
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Loader rooted at `~/.wpmove`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("could not determine home directory".into()))?;
        Ok(Self::with_dir(home.join(".wpmove")))
    }

    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn find_config_file(&self) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| self.config_dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load the config file if one exists, otherwise defaults, then apply
    /// `WPMOVE_*` environment overrides.
    pub fn load(&self) -> Result<AppConfig> {
        let mut config = match self.find_config_file() {
            Some(path) => Self::load_from(&path)?,
            None => {
                debug!(
                    "no config file in {}, using defaults",
                    self.config_dir.display()
                );
                AppConfig::default()
            }
        };
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<AppConfig> {
        let contents = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config = match ext {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("YAML parse error: {e}")))?,
            "toml" => toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("TOML parse error: {e}")))?,
            other => {
                return Err(Error::Config(format!(
                    "unsupported config extension: {other}"
                )));
            }
        };

        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Write `config` as `config.yml` in the config directory.
    pub fn save(&self, config: &AppConfig) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.config_dir)?;
        let path = self.config_dir.join("config.yml");
        let yaml = serde_yaml::to_string(config)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(&path, yaml)?;
        info!("wrote config to {}", path.display());
        Ok(path)
    }
}

/// Apply `WPMOVE_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("WPMOVE_GATEWAY_HOST") {
        config.gateway.host = host;
    }
    if let Some(port) = lookup("WPMOVE_GATEWAY_PORT") {
        config.gateway.port = parse_port("WPMOVE_GATEWAY_PORT", &port)?;
    }
    if let Some(host) = lookup("WPMOVE_DB_HOST") {
        config.database.host = host;
    }
    if let Some(port) = lookup("WPMOVE_DB_PORT") {
        config.database.port = parse_port("WPMOVE_DB_PORT", &port)?;
    }
    if let Some(flag) = lookup("WPMOVE_DB_TRANSACTIONAL") {
        config.database.transactional = match flag.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" | "" => false,
            other => {
                return Err(Error::Config(format!(
                    "WPMOVE_DB_TRANSACTIONAL: expected a boolean, got {other:?}"
                )));
            }
        };
    }
    Ok(())
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key}: invalid port {value:?}")))
}
