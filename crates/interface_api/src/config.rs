//! API configuration

use std::time::Duration;

use core_kernel::Cents;
use domain_staging::ApprovalPolicy;
use infra_db::DatabaseConfig;
use serde::Deserialize;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_PORT=9090` or `API_AUTO_CREATE_CLIENTS=false`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Maximum pooled database connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// Seconds to wait for a free connection before giving up
    pub acquire_timeout_secs: u64,
    /// Register unknown clients when their first record is approved
    pub auto_create_clients: bool,
    /// Payment term flag for auto-created clients
    pub default_has_payment_term: bool,
    /// Credit limit in cents for auto-created clients
    pub default_credit_limit: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/credit_ledger".to_string(),
            log_level: "info".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 30,
            auto_create_clients: true,
            default_has_payment_term: false,
            default_credit_limit: 0,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings for the ledger database
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .with_pool_size(self.min_connections, self.max_connections)
            .with_acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }

    /// Approval rules for the ledger service
    pub fn approval_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy {
            auto_create_clients: self.auto_create_clients,
            default_has_payment_term: self.default_has_payment_term,
            default_credit_limit: Cents::new(self.default_credit_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_auto_creates() {
        let policy = ApiConfig::default().approval_policy();
        assert!(policy.auto_create_clients);
        assert_eq!(policy.default_credit_limit, Cents::ZERO);
    }

    #[test]
    fn test_database_config_follows_pool_settings() {
        let config = ApiConfig {
            max_connections: 25,
            min_connections: 5,
            acquire_timeout_secs: 3,
            ..ApiConfig::default()
        };
        let database = config.database_config();
        assert_eq!(database.url, "postgres://localhost/credit_ledger");
        assert_eq!(database.max_connections, 25);
        assert_eq!(database.min_connections, 5);
        assert_eq!(database.acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_server_addr() {
        let config = ApiConfig {
            port: 9090,
            ..ApiConfig::default()
        };
        assert_eq!(config.server_addr(), "0.0.0.0:9090");
    }
}
