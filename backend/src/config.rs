use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::services::statistics::CorrelationMethod;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: Url,
    pub access_token: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
    pub default_window_minutes: u32,
    pub correlation_method: CorrelationMethod,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("TEST_SERVER_BASE_URL").ok_or(ConfigError::Missing("TEST_SERVER_BASE_URL"))?;
        let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            name: "TEST_SERVER_BASE_URL",
            value: raw_url.clone(),
            reason: e.to_string(),
        })?;

        let access_token = lookup("ACCESS_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("ACCESS_TOKEN"))?;

        let correlation_method = match lookup("CORRELATION_METHOD") {
            Some(raw) => raw.parse::<CorrelationMethod>().map_err(|reason: String| ConfigError::Invalid {
                name: "CORRELATION_METHOD",
                value: raw.clone(),
                reason,
            })?,
            None => CorrelationMethod::default(),
        };

        let default_window_minutes = parse_or(&lookup, "DEFAULT_WINDOW_MINUTES", 50u32)?;
        if default_window_minutes == 0 {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_WINDOW_MINUTES",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            base_url,
            access_token,
            port: parse_or(&lookup, "PORT", 5000u16)?,
            cache_ttl: Duration::from_secs(parse_or(&lookup, "CACHE_TTL_SECS", 60u64)?),
            upstream_timeout: Duration::from_secs(parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 10u64)?),
            default_window_minutes,
            correlation_method,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
