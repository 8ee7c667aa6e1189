use std::{env, time::Duration};

use log::*;
use loyalty_common::helpers::parse_seconds;
use loyalty_engine::{AccrualConfig, WorkerConfig};

const DEFAULT_LPS_HOST: &str = "127.0.0.1";
const DEFAULT_LPS_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty_store.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_ACCRUAL_URL: &str = "http://127.0.0.1:8081";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_ACCRUAL_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Scheme, host and port of the accrual authority.
    pub accrual_url: String,
    /// Pause between reconciliation cycles.
    pub poll_interval: Duration,
    /// Upper bound on a single request to the accrual authority.
    pub accrual_timeout: Duration,
    /// Back-off used when the accrual authority rate limits us without a usable `Retry-After` header.
    pub default_retry_after: Duration,
    /// How long to wait for the reconciliation worker to stop once the HTTP server has shut down.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LPS_HOST.to_string(),
            port: DEFAULT_LPS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            accrual_url: DEFAULT_ACCRUAL_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            accrual_timeout: DEFAULT_ACCRUAL_TIMEOUT,
            default_retry_after: DEFAULT_RETRY_AFTER,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("LPS_HOST").ok().unwrap_or_else(|| DEFAULT_LPS_HOST.into());
        let port = env::var("LPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for LPS_PORT. {e} Using the default, {DEFAULT_LPS_PORT}, instead."
                    );
                    DEFAULT_LPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_LPS_PORT);
        let database_url = env::var("LPS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LPS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let db_max_connections = env::var("LPS_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .or_else(|| {
                        warn!("🪛️ Invalid configuration value for LPS_DB_MAX_CONNECTIONS: {s}");
                        None
                    })
            })
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let accrual_url = env::var("LPS_ACCRUAL_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LPS_ACCRUAL_URL is not set. Using the default, {DEFAULT_ACCRUAL_URL}.");
            DEFAULT_ACCRUAL_URL.into()
        });
        Self {
            host,
            port,
            database_url,
            db_max_connections,
            accrual_url,
            poll_interval: seconds_from_env("LPS_POLL_INTERVAL", DEFAULT_POLL_INTERVAL),
            accrual_timeout: seconds_from_env("LPS_ACCRUAL_TIMEOUT", DEFAULT_ACCRUAL_TIMEOUT),
            default_retry_after: seconds_from_env("LPS_DEFAULT_RETRY_AFTER", DEFAULT_RETRY_AFTER),
            shutdown_timeout: seconds_from_env("LPS_SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT),
        }
    }

    pub fn accrual_config(&self) -> AccrualConfig {
        AccrualConfig {
            base_url: self.accrual_url.clone(),
            timeout: self.accrual_timeout,
            default_retry_after: self.default_retry_after,
        }
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig { poll_interval: self.poll_interval }
    }
}

fn seconds_from_env(name: &str, default: Duration) -> Duration {
    env::var(name)
        .map_err(|_| info!("🪛️ {name} is not set. Using the default value of {}s.", default.as_secs()))
        .and_then(|s| {
            parse_seconds(&s, false).ok_or_else(|| {
                warn!("🪛️ Invalid configuration value for {name}: '{s}'. Using {}s instead.", default.as_secs())
            })
        })
        .unwrap_or(default)
}
