//! API configuration
//!
//! Values are layered key by key: built-in defaults, then the optional
//! `config/tada.toml`, then `TADA_`-prefixed environment variables with
//! `__` between nested keys (`TADA_SERVER__PORT=9090`,
//! `TADA_RATES__PER_KM__CAR=11`).

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};
use domain_travel::{
    AccessPolicy, Capability, ClaimEngine, RateConfig, Role, TransportMode, TransportRates,
};
use infra_db::DatabaseConfig;

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub auth: AuthConfig,
    pub rates: RateSettings,
    pub access: AccessSettings,
    /// Default filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseSettings::default(),
            auth: AuthConfig::default(),
            rates: RateSettings::default(),
            access: AccessSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/tada".to_string(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
        }
    }
}

/// Allowance and per-km rates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSettings {
    pub currency: String,
    pub daily_rate: Decimal,
    /// Per-km rate keyed by transport mode name
    pub per_km: HashMap<String, Decimal>,
}

impl Default for RateSettings {
    fn default() -> Self {
        let reference = RateConfig::default();
        Self {
            currency: reference.currency().code().to_string(),
            daily_rate: reference.daily_rate.amount(),
            per_km: reference
                .transport
                .per_km
                .iter()
                .map(|(mode, rate)| (mode.as_str().to_string(), *rate))
                .collect(),
        }
    }
}

/// Which roles hold each capability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSettings {
    pub reviewers: Vec<String>,
    pub payers: Vec<String>,
    pub viewers: Vec<String>,
}

impl Default for AccessSettings {
    fn default() -> Self {
        let staff = vec!["admin".to_string(), "hr".to_string(), "finance".to_string()];
        Self {
            reviewers: staff.clone(),
            payers: staff.clone(),
            viewers: staff,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `config/tada.toml` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(environment())
    }

    fn load_with(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&ApiConfig::default())?)
            .add_source(File::with_name("config/tada").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database.url.clone())
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
    }

    /// Builds and validates the rate table
    pub fn rate_config(&self) -> Result<RateConfig, ConfigError> {
        let currency = Currency::from_str(&self.rates.currency)
            .map_err(|e| ConfigError::Message(format!("rates.currency: {e}")))?;

        let mut transport = TransportRates::new(currency);
        for (name, rate) in &self.rates.per_km {
            let mode = TransportMode::from_str(name)
                .map_err(|e| ConfigError::Message(format!("rates.per_km: {e}")))?;
            transport = transport.with_rate(mode, *rate);
        }

        RateConfig::new(Money::new(self.rates.daily_rate, currency), transport)
            .map_err(|e| ConfigError::Message(e.to_string()))
    }

    pub fn access_policy(&self) -> Result<AccessPolicy, ConfigError> {
        let grants = [
            (&self.access.reviewers, Capability::ReviewClaims, "access.reviewers"),
            (&self.access.payers, Capability::DisburseClaims, "access.payers"),
            (&self.access.viewers, Capability::ViewAllClaims, "access.viewers"),
        ];

        let mut policy = AccessPolicy::empty();
        for (names, capability, key) in grants {
            for role in parse_roles(names, key)? {
                policy = policy.grant(role, capability);
            }
        }
        Ok(policy)
    }

    /// The claim engine described by this configuration
    pub fn engine(&self) -> Result<ClaimEngine, ConfigError> {
        Ok(ClaimEngine::new(self.rate_config()?, self.access_policy()?))
    }
}

/// `TADA_` prefix, `__` between nested keys
fn environment() -> Environment {
    Environment::with_prefix("TADA")
        .prefix_separator("_")
        .separator("__")
}

fn parse_roles(names: &[String], key: &str) -> Result<BTreeSet<Role>, ConfigError> {
    names
        .iter()
        .map(|name| Role::from_str(name).map_err(|e| ConfigError::Message(format!("{key}: {e}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_travel::Actor;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_match_reference_rates() {
        let config = ApiConfig::default();
        assert_eq!(config.rate_config().unwrap(), RateConfig::default());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_default_access_matches_domain_default() {
        assert_eq!(ApiConfig::default().access_policy().unwrap(), AccessPolicy::default());
    }

    #[test]
    fn test_unknown_transport_mode_is_rejected() {
        let mut config = ApiConfig::default();
        config.rates.per_km.insert("rocket".to_string(), dec!(100));
        assert!(config.rate_config().is_err());
    }

    #[test]
    fn test_non_positive_daily_rate_is_rejected() {
        let mut config = ApiConfig::default();
        config.rates.daily_rate = Decimal::ZERO;
        assert!(config.engine().is_err());
    }

    #[test]
    fn test_managers_can_be_made_reviewers() {
        let mut config = ApiConfig::default();
        config.access.reviewers.push("manager".to_string());
        let policy = config.access_policy().unwrap();

        let manager = Actor::staff("m-1", Role::Manager);
        assert!(policy.allows(&manager, Capability::ReviewClaims));
        assert!(!policy.allows(&manager, Capability::DisburseClaims));
    }

    fn load_from(vars: &[(&str, &str)]) -> ApiConfig {
        let source = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<config::Map<String, String>>();
        ApiConfig::load_with(environment().source(Some(source))).unwrap()
    }

    #[test]
    fn test_environment_overrides_nested_keys() {
        let config = load_from(&[
            ("TADA_SERVER__PORT", "9090"),
            ("TADA_AUTH__JWT_SECRET", "prod-secret"),
            ("TADA_DATABASE__URL", "postgres://db/tada"),
            ("TADA_RATES__PER_KM__CAR", "11"),
            ("TADA_LOG_LEVEL", "debug"),
        ]);

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.jwt_secret, "prod-secret");
        assert_eq!(config.database.url, "postgres://db/tada");
        assert_eq!(config.log_level, "debug");

        let rates = config.rate_config().unwrap();
        assert_eq!(
            rates.transport.rate_for(TransportMode::Car).map(|m| m.amount()),
            Some(dec!(11))
        );
        assert_eq!(
            rates.transport.rate_for(TransportMode::Train).map(|m| m.amount()),
            Some(dec!(8))
        );
    }

    #[test]
    fn test_unrelated_variables_are_ignored() {
        let config = load_from(&[("TADAX_SERVER__PORT", "1"), ("PORT", "2")]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.jwt_secret, AuthConfig::default().jwt_secret);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let mut config = ApiConfig::default();
        config.access.payers.push("auditor".to_string());
        assert!(config.access_policy().is_err());
    }
}
