use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_port: u16,
    pub market_data_url: String,
    pub request_timeout: Duration,
    pub products_refresh: Duration,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 3000,
            market_data_url: "https://api.exchange.coinbase.com".to_string(),
            request_timeout: Duration::from_secs(10),
            products_refresh: Duration::from_secs(300),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, falling back to defaults
    /// for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_port = parse_var(&lookup, "API_PORT")?.unwrap_or(defaults.api_port);

        let market_data_url = lookup("MARKET_DATA_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.market_data_url);

        let request_timeout = parse_var::<u64, _>(&lookup, "REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let products_refresh = parse_var::<u64, _>(&lookup, "PRODUCTS_REFRESH_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.products_refresh);

        for (name, value) in [
            ("REQUEST_TIMEOUT_SECS", request_timeout),
            ("PRODUCTS_REFRESH_SECS", products_refresh),
        ] {
            if value.is_zero() {
                return Err(ConfigError::Invalid {
                    name,
                    value: "0".to_string(),
                    reason: "must be at least 1 second".to_string(),
                });
            }
        }

        let log_format = match lookup("LOG_FORMAT").map(|s| s.trim().to_lowercase()) {
            None => defaults.log_format,
            Some(s) if s == "text" => LogFormat::Text,
            Some(s) if s == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other,
                    reason: "expected \"text\" or \"json\"".to_string(),
                });
            }
        };

        Ok(Self {
            api_port,
            market_data_url,
            request_timeout,
            products_refresh,
            log_format,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };

    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        })
}
