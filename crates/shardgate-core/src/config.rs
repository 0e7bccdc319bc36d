//! gate.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level daemon configuration, loaded from a TOML file.
///
/// Every section and field has a working default so an empty file (or no
/// file at all) yields a runnable single-node configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GateConfig {
    pub database: DatabaseConfig,
    pub registry: RegistrySettings,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL.
    pub url: String,
    /// Maximum connections in the pool; bounded independently of probe
    /// concurrency.
    pub pool_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Hours a continuously-unreachable endpoint is retained before
    /// eviction.
    pub retention_hours: u64,
    /// Timeout for the synchronous seed probe on add.
    pub probe_timeout_secs: u64,
    /// Timeout for per-endpoint probes during the reconciliation cycle.
    pub refresh_timeout_secs: u64,
    /// Period between reconciliation cycles.
    pub reconcile_interval_secs: u64,
    /// Maximum in-flight probes during status refresh.
    pub probe_concurrency: usize,
    /// Endpoints a single owner may register.
    pub max_servers_per_owner: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Listen address for the admin API, e.g. "127.0.0.1:8090".
    pub bind: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://shardgate.db".to_string(),
            pool_size: 5,
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            retention_hours: 72,
            probe_timeout_secs: 5,
            refresh_timeout_secs: 3,
            reconcile_interval_secs: 3600,
            probe_concurrency: 16,
            max_servers_per_owner: 5,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8090".to_string(),
        }
    }
}

impl GateConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GateConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl RegistrySettings {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours * 3600)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_runnable() {
        let config = GateConfig::default();
        assert_eq!(config.registry.retention_hours, 72);
        assert_eq!(config.registry.probe_timeout_secs, 5);
        assert_eq!(config.registry.max_servers_per_owner, 5);
        assert_eq!(config.database.pool_size, 5);
        assert_eq!(config.api.bind, "127.0.0.1:8090");
    }

    #[test]
    fn parse_partial_file_keeps_defaults() {
        let toml_str = r#"
[database]
url = "sqlite:///var/lib/shardgate/gate.db"

[registry]
retention_hours = 24
"#;
        let config: GateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.url, "sqlite:///var/lib/shardgate/gate.db");
        assert_eq!(config.database.pool_size, 5);
        assert_eq!(config.registry.retention_hours, 24);
        assert_eq!(config.registry.reconcile_interval_secs, 3600);
    }

    #[test]
    fn parse_empty_is_default() {
        let config: GateConfig = toml::from_str("").unwrap();
        assert_eq!(config.registry.retention(), Duration::from_secs(72 * 3600));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = GateConfig::default();
        let text = config.to_toml_string().unwrap();
        let back: GateConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.api.bind, config.api.bind);
        assert_eq!(back.registry.probe_concurrency, 16);
    }
}
