//! Daemon configuration, loaded from the environment.

use std::env;

use thiserror::Error;

use evescan_core::RegionId;
use evescan_esi::EsiConfig;
use evescan_sync::SyncConfig;

/// Default region table: Jita's region, The Forge.
const DEFAULT_REGIONS: &str = "Jita=10000002";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but unusable.
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Full daemon configuration.
#[derive(Debug, Clone)]
pub struct EvescandConfig {
    /// Postgres connection string.
    pub database_url: String,

    /// Maximum connections in the shared pool.
    pub max_db_connections: u32,

    /// Region name → id table; one sync worker per entry.
    pub regions: Vec<(String, RegionId)>,

    /// Sync cycle settings.
    pub sync: SyncConfig,

    /// Remote API client settings.
    pub esi: EsiConfig,
}

impl EvescandConfig {
    /// Load configuration from the environment.
    ///
    /// `DATABASE_URL` is required; everything else has a default. Regions are
    /// given as a comma-separated `Name=id` list, e.g.
    /// `EVESCAN_REGIONS=Jita=10000002,Amarr=10000043`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let regions = parse_regions(
            &env::var("EVESCAN_REGIONS").unwrap_or_else(|_| DEFAULT_REGIONS.to_string()),
        )?;

        let mut sync = SyncConfig::default();
        if let Some(interval) = parse_var::<u64>("EVESCAN_SYNC_INTERVAL_SECS")? {
            sync.sync_interval_secs = interval;
        }
        if let Some(batch_size) = parse_var::<usize>("EVESCAN_BATCH_SIZE")? {
            sync.batch_size = batch_size;
        }

        let mut esi = EsiConfig::default();
        if let Ok(base_url) = env::var("EVESCAN_ESI_BASE_URL") {
            esi.base_url = base_url;
        }
        if let Ok(user_agent) = env::var("EVESCAN_USER_AGENT") {
            esi.user_agent = user_agent;
        }
        if let Some(timeout) = parse_var::<u64>("EVESCAN_REQUEST_TIMEOUT_SECS")? {
            esi.request_timeout_secs = timeout;
        }
        if let Some(max_attempts) = parse_var::<u32>("EVESCAN_MAX_ATTEMPTS")? {
            esi.max_attempts = max_attempts;
        }
        if let Some(backoff_base) = parse_var::<f64>("EVESCAN_BACKOFF_BASE")? {
            esi.backoff_base = backoff_base;
        }

        let max_db_connections = parse_var::<u32>("EVESCAN_MAX_DB_CONNECTIONS")?.unwrap_or(10);

        Ok(Self {
            database_url,
            max_db_connections,
            regions,
            sync,
            esi,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Err(_) => Ok(None),
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var,
                message: e.to_string(),
            }),
    }
}

fn parse_regions(spec: &str) -> Result<Vec<(String, RegionId)>, ConfigError> {
    let mut regions = Vec::new();
    for entry in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, id) = entry.split_once('=').ok_or_else(|| ConfigError::Invalid {
            var: "EVESCAN_REGIONS",
            message: format!("expected Name=id, got '{entry}'"),
        })?;
        let id = id
            .trim()
            .parse::<RegionId>()
            .map_err(|e| ConfigError::Invalid {
                var: "EVESCAN_REGIONS",
                message: e.to_string(),
            })?;
        regions.push((name.trim().to_string(), id));
    }

    if regions.is_empty() {
        return Err(ConfigError::Invalid {
            var: "EVESCAN_REGIONS",
            message: "at least one region is required".to_string(),
        });
    }

    Ok(regions)
}
