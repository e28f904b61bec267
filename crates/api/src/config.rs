use roadpulse_core::liveness::{OFFLINE_THRESHOLD_SECS, SWEEP_INTERVAL_SECS};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Device id prefix authorized on the direct channel (default: `ESP32`).
    pub device_id_prefix: String,
    /// Bound on a single incident-store write, in seconds (default: `5`).
    pub storage_timeout_secs: u64,
    /// Silence after which the sweep marks a device offline (default: 1 hour).
    pub liveness_offline_secs: u64,
    /// Period of the background liveness sweep (default: 5 minutes).
    pub liveness_sweep_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `DEVICE_ID_PREFIX`      | `ESP32`                 |
    /// | `STORAGE_TIMEOUT_SECS`  | `5`                     |
    /// | `LIVENESS_OFFLINE_SECS` | `3600`                  |
    /// | `LIVENESS_SWEEP_SECS`   | `300`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_env_u64("REQUEST_TIMEOUT_SECS", 30);

        let device_id_prefix =
            std::env::var("DEVICE_ID_PREFIX").unwrap_or_else(|_| "ESP32".into());

        let storage_timeout_secs = parse_env_u64("STORAGE_TIMEOUT_SECS", 5);
        let liveness_offline_secs =
            parse_env_u64("LIVENESS_OFFLINE_SECS", OFFLINE_THRESHOLD_SECS);
        let liveness_sweep_secs = parse_env_u64("LIVENESS_SWEEP_SECS", SWEEP_INTERVAL_SECS);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            device_id_prefix,
            storage_timeout_secs,
            liveness_offline_secs,
            liveness_sweep_secs,
        }
    }
}

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid u64"))
}
