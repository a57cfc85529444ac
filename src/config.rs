// src/config.rs
use std::net::SocketAddr;

use thiserror::Error;

use crate::auth::sessions::DEFAULT_SESSION_TTL_SECS;
use crate::domain::PriceGrammar;
use crate::pipeline::{DateCutoff, FacetMode, PipelineConfig};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{var}='{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// URL or path of the listings CSV.
    pub listings_location: String,
    /// URL or path of the `user,password` CSV.
    pub credentials_location: String,
    pub bind_addr: SocketAddr,
    pub db_path: String,
    pub max_workers: usize,
    pub session_ttl_secs: i64,
    /// Initial map center (lat, lng) handed to the display layer.
    pub map_center: (f64, f64),
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            get(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let optional = |var: &'static str| get(var).filter(|v| !v.trim().is_empty());

        let mut pipeline = match optional("PIPELINE_VARIANT").as_deref() {
            None | Some("basic") => PipelineConfig::basic(),
            Some("extended") => PipelineConfig::extended(),
            Some(other) => return Err(invalid("PIPELINE_VARIANT", other, "expected basic|extended")),
        };

        if let Some(v) = optional("FACET_MODE") {
            pipeline.facet_mode = match v.as_str() {
                "multi" => FacetMode::Multi,
                "single" => FacetMode::Single,
                _ => return Err(invalid("FACET_MODE", &v, "expected multi|single")),
            };
        }
        if let Some(v) = optional("PRICE_GRAMMAR") {
            pipeline.price_grammar = match v.as_str() {
                "scalar" => PriceGrammar::Scalar,
                "range" => PriceGrammar::RangeCapable,
                _ => return Err(invalid("PRICE_GRAMMAR", &v, "expected scalar|range")),
            };
        }
        if let Some(v) = optional("DATE_CUTOFF") {
            pipeline.date_cutoff = match v.as_str() {
                "enabled" => DateCutoff::Enabled,
                "disabled" => DateCutoff::Disabled,
                _ => return Err(invalid("DATE_CUTOFF", &v, "expected enabled|disabled")),
            };
        }
        if let Some(v) = optional("PRICE_COLUMN") {
            pipeline.price_column = v.trim().to_string();
        }

        let bind_addr = match optional("BIND_ADDR") {
            Some(v) => v
                .parse::<SocketAddr>()
                .map_err(|e| invalid("BIND_ADDR", &v, &e.to_string()))?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let max_workers = match optional("MAX_WORKERS") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("MAX_WORKERS", &v, "expected a positive integer")),
            },
            None => 8,
        };

        let session_ttl_secs = match optional("SESSION_TTL_SECS") {
            Some(v) => match v.parse::<i64>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("SESSION_TTL_SECS", &v, "expected a positive integer")),
            },
            None => DEFAULT_SESSION_TTL_SECS,
        };

        let map_center = match optional("MAP_CENTER") {
            Some(v) => parse_center(&v).ok_or_else(|| invalid("MAP_CENTER", &v, "expected 'lat,lng'"))?,
            None => (23.0225, 72.5714),
        };

        Ok(Self {
            listings_location: required("LISTINGS_CSV_URL")?,
            credentials_location: required("CREDENTIALS_CSV_URL")?,
            bind_addr,
            db_path: optional("DB_PATH").unwrap_or_else(|| "listing_map.sqlite3".to_string()),
            max_workers,
            session_ttl_secs,
            map_center,
            pipeline,
        })
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_center(v: &str) -> Option<(f64, f64)> {
    let (lat, lng) = v.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}
