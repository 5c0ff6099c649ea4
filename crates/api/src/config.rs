use std::path::PathBuf;

use autocheck_core::scoring::MAX_DAMAGE_SCORE;

/// Defect detector connection settings.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Base URL of the detector service.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Images sent to the detector in parallel during one scoring pass.
    pub concurrency: usize,
}

/// Vehicle registry connection settings. Absent when lookups are disabled.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub url: String,
    pub token: Option<String>,
    /// Per-section request timeout in seconds.
    pub timeout_secs: u64,
}

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
    /// HTTP request timeout in seconds (default: `120`). Scoring runs
    /// inside the request, so this bounds a whole detector pass.
    pub request_timeout_secs: u64,
    /// Root directory for uploaded images.
    pub storage_root: PathBuf,
    pub detector: DetectorConfig,
    pub registry: Option<RegistryConfig>,
    /// Scorer calibration constant.
    pub max_damage_score: f64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `0.0.0.0`                |
    /// | `PORT`                  | `3000`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `120`                    |
    /// | `STORAGE_ROOT`          | `storage/analyses`       |
    /// | `DETECTOR_URL`          | `http://localhost:4070`  |
    /// | `DETECTOR_TIMEOUT_SECS` | `60`                     |
    /// | `DETECTOR_CONCURRENCY`  | `4`                      |
    /// | `REGISTRY_URL`          | unset (lookups disabled) |
    /// | `REGISTRY_TOKEN`        | unset                    |
    /// | `REGISTRY_TIMEOUT_SECS` | `15`                     |
    /// | `MAX_DAMAGE_SCORE`      | `12.0`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let storage_root = PathBuf::from(
            std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage/analyses".into()),
        );

        let detector = DetectorConfig {
            url: std::env::var("DETECTOR_URL").unwrap_or_else(|_| "http://localhost:4070".into()),
            timeout_secs: std::env::var("DETECTOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .expect("DETECTOR_TIMEOUT_SECS must be a valid u64"),
            concurrency: std::env::var("DETECTOR_CONCURRENCY")
                .unwrap_or_else(|_| "4".into())
                .parse()
                .expect("DETECTOR_CONCURRENCY must be a valid usize"),
        };

        let registry = std::env::var("REGISTRY_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| RegistryConfig {
                url,
                token: std::env::var("REGISTRY_TOKEN").ok(),
                timeout_secs: std::env::var("REGISTRY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".into())
                    .parse()
                    .expect("REGISTRY_TIMEOUT_SECS must be a valid u64"),
            });

        let max_damage_score: f64 = std::env::var("MAX_DAMAGE_SCORE")
            .map(|v| v.parse().expect("MAX_DAMAGE_SCORE must be a number"))
            .unwrap_or(MAX_DAMAGE_SCORE);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            storage_root,
            detector,
            registry,
            max_damage_score,
        }
    }
}
