use crate::errors::config_error::ConfigError;
use chrono::Duration;
use std::env;

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub http_port: u16,
    pub frontend_url: Option<String>,
    pub token_ttl: Duration,
}

impl Config {
    /// Reads configuration from the process environment. Call after `dotenvy` has run.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let http_port = match lookup("HTTP_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|error| ConfigError::Invalid("HTTP_PORT", error.to_string()))?,
            None => DEFAULT_HTTP_PORT,
        };

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(hours) => hours
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or(ConfigError::Invalid(
                    "TOKEN_TTL_HOURS",
                    format!("{hours} is not a positive number of hours"),
                ))?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            http_port,
            frontend_url: lookup("FRONTEND_URL").filter(|url| !url.is_empty()),
            token_ttl: Duration::hours(token_ttl_hours),
        })
    }
}
