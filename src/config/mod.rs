use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub telemetry_enabled: bool,
    #[serde(default = "default_telemetry_service_name")]
    pub telemetry_service_name: String,
    #[serde(default = "default_telemetry_service_version")]
    pub telemetry_service_version: String,
    #[serde(default = "default_telemetry_environment")]
    pub telemetry_environment: String,
    #[serde(default = "default_telemetry_otlp_endpoint")]
    pub telemetry_otlp_endpoint: String,
}

fn default_catalog_path() -> String {
    "data/europe-destinations.csv".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_telemetry_service_name() -> String {
    "wayfarer".to_string()
}

fn default_telemetry_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_telemetry_environment() -> String {
    "production".to_string()
}

fn default_telemetry_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(source: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_max_connections", 5)?
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(map))
    }

    #[test]
    fn test_defaults_apply() {
        let config = AppConfig::from_environment(source(&[
            ("DATABASE_URL", "postgres://localhost/wayfarer"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.catalog_path, "data/europe-destinations.csv");
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(!config.telemetry_enabled);
        assert_eq!(config.telemetry_service_name, "wayfarer");
    }

    #[test]
    fn test_overrides_and_missing_secret() {
        let config = AppConfig::from_environment(source(&[
            ("DATABASE_URL", "postgres://localhost/wayfarer"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("JWT_SECRET", "secret"),
            ("TELEMETRY_ENABLED", "true"),
        ]))
        .unwrap();
        assert_eq!(config.database_max_connections, 12);
        assert!(config.telemetry_enabled);

        let result = AppConfig::from_environment(source(&[(
            "DATABASE_URL",
            "postgres://localhost/wayfarer",
        )]));
        assert!(result.is_err());
    }
}
