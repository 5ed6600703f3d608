use serde::{Deserialize, Serialize};

/// Top-level configuration, read from `~/.wpmove/config.yml` when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Where the WordPress database lives. Name, user and password are supplied
/// per migration and are never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    /// Run the seven updates inside a single transaction and roll back on
    /// the first failure instead of keeping partial progress.
    pub transactional: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            transactional: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_mysql_without_transaction() {
        let config = AppConfig::default();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 3306);
        assert!(!config.database.transactional);
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let config: AppConfig = serde_yaml::from_str("database:\n  port: 3307\n").unwrap();
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.gateway, GatewayConfig::default());
    }
}
