use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::models::geo_models::TileLayer;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub geocoder: GeocoderConfig,
    pub lookup_debounce: Duration,
    pub tile_layer: TileLayer,
    pub avatar_max_bytes: usize,
    pub sentry_dsn: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "WhoweMap/1.0 (+https://whowe.io)".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            frontend_url: "http://localhost:8080".to_string(),
            geocoder: GeocoderConfig::default(),
            lookup_debounce: Duration::from_millis(400),
            tile_layer: TileLayer {
                url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
            },
            avatar_max_bytes: 5 * 1024 * 1024,
            sentry_dsn: None,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |name: &str, default: String| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
        };

        let geocoder = GeocoderConfig {
            base_url: text("GEOCODER_URL", defaults.geocoder.base_url),
            user_agent: text("GEOCODER_USER_AGENT", defaults.geocoder.user_agent),
            timeout: Duration::from_secs(parse_var(
                &lookup,
                "GEOCODER_TIMEOUT_SECS",
                defaults.geocoder.timeout.as_secs(),
            )?),
            max_retries: parse_var(&lookup, "GEOCODER_MAX_RETRIES", defaults.geocoder.max_retries)?,
            retry_backoff: Duration::from_millis(parse_var(
                &lookup,
                "GEOCODER_RETRY_BACKOFF_MS",
                defaults.geocoder.retry_backoff.as_millis() as u64,
            )?),
        };

        Ok(Self {
            host: text("HOST", defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            frontend_url: text("FRONTEND_URL", defaults.frontend_url),
            geocoder,
            lookup_debounce: Duration::from_millis(parse_var(
                &lookup,
                "LOOKUP_DEBOUNCE_MS",
                defaults.lookup_debounce.as_millis() as u64,
            )?),
            tile_layer: TileLayer {
                url_template: text("MAP_TILE_URL", defaults.tile_layer.url_template),
                attribution: text("MAP_TILE_ATTRIBUTION", defaults.tile_layer.attribution),
            },
            avatar_max_bytes: parse_var(&lookup, "AVATAR_MAX_BYTES", defaults.avatar_max_bytes)?,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        _ => Ok(default),
    }
}
