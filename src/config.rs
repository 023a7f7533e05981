// src/config.rs

use crate::errors::ConfigError;
use std::collections::HashMap;
use std::net::SocketAddr;
use url::Url;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    pub sync_secret: String,
    pub source_csv_url: Url,
    pub geocoder_base_url: Url,
    pub geocoder_user_agent: String,
    pub geocoder_country: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let max_workers = match get("MAX_WORKERS") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "MAX_WORKERS",
                    reason: format!("'{v}' is not a positive integer"),
                })?,
            None => 8,
        };

        Ok(Self {
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "listings.sqlite3".into()),
            bind_addr,
            max_workers,
            sync_secret: required("SYNC_SECRET")?,
            source_csv_url: parse_http_url("SOURCE_CSV_URL", &required("SOURCE_CSV_URL")?)?,
            geocoder_base_url: parse_http_url(
                "GEOCODER_BASE_URL",
                &get("GEOCODER_BASE_URL").unwrap_or_else(|| DEFAULT_GEOCODER_URL.into()),
            )?,
            geocoder_user_agent: get("GEOCODER_USER_AGENT")
                .unwrap_or_else(|| "listing-sync/0.1".into()),
            geocoder_country: get("GEOCODER_COUNTRY").unwrap_or_else(|| "ar".into()),
        })
    }
}

fn parse_http_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
