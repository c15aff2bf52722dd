//! Configuration management for the GreenFund backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with GF_ prefix (`GF__JWT__SECRET`)

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// LLM advisory service configuration
    pub openai: OpenAiConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Geocoding configuration
    pub geocoding: GeocodingConfig,

    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    /// API key; advisory endpoints fail with a configuration error when unset
    pub api_key: Option<String>,

    /// Chat completion model, must accept image input for soil photos
    pub model: String,

    /// Base URL of the chat completions API
    pub base_url: String,

    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    pub api_endpoint: String,

    /// Extra attempts after the first failed request
    pub max_retries: u32,

    /// Delay before the first retry, doubled on every further retry
    pub base_delay_ms: u64,

    pub timeout_secs: u64,

    pub forecast_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Nominatim search endpoint
    pub api_endpoint: String,

    /// ISO country codes the search is restricted to
    pub country_codes: String,

    /// User-Agent sent with every request, required by Nominatim's usage policy
    pub user_agent: String,

    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("GF_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (GF_ prefix)
            .add_source(
                Environment::with_prefix("GF")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    fn defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 1800)?
            .set_default("openai.model", "gpt-4o-mini")?
            .set_default("openai.base_url", "https://api.openai.com/v1")?
            .set_default("openai.timeout_secs", 60)?
            .set_default("weather.api_endpoint", "https://api.open-meteo.com/v1/forecast")?
            .set_default("weather.max_retries", 2)?
            .set_default("weather.base_delay_ms", 1000)?
            .set_default("weather.timeout_secs", 15)?
            .set_default("weather.forecast_days", 7)?
            .set_default("geocoding.api_endpoint", "https://nominatim.openstreetmap.org/search")?
            .set_default("geocoding.country_codes", "ke")?
            .set_default("geocoding.user_agent", "GreenFundApp/1.0")?
            .set_default("geocoding.timeout_secs", 10)?
            .set_default("cors.allowed_origins", vec!["http://localhost:5173"])
    }
}

/// Defaults plus the required keys, for unit tests
#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::defaults("test")
        .and_then(|b| b.set_override("database.url", "postgres://localhost/greenfund_test"))
        .and_then(|b| b.set_override("jwt.secret", "test-secret"))
        .and_then(|b| b.build())
        .and_then(|c| c.try_deserialize())
        .expect("test configuration")
}
