use std::path::PathBuf;
use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields except the access password have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown drain timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Shared secret expected as the bearer credential on all
    /// non-health endpoints.
    pub access_password: String,
    /// Deployment environment name, echoed by the health endpoint.
    pub environment: String,
    /// Service name, echoed by the health endpoint.
    pub service_name: String,
    /// Root directory for per-request upload staging.
    pub staging_dir: PathBuf,
    /// Simulated per-step processing delay.
    pub step_delay: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                   |
    /// |-------------------------|---------------------------|
    /// | `HOST`                  | `0.0.0.0`                 |
    /// | `PORT`                  | `8000`                    |
    /// | `CORS_ORIGINS`          | `http://localhost:3000`   |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                      |
    /// | `ACCESS_PASSWORD`       | (required)                |
    /// | `APP_ENV`               | `development`             |
    /// | `SERVICE_NAME`          | `docgen-backend`          |
    /// | `STAGING_DIR`           | `$TMPDIR/docgen`          |
    /// | `STEP_DELAY_MS`         | `2000`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let access_password =
            std::env::var("ACCESS_PASSWORD").expect("ACCESS_PASSWORD must be set");

        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let service_name =
            std::env::var("SERVICE_NAME").unwrap_or_else(|_| "docgen-backend".into());

        let staging_dir = std::env::var("STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("docgen"));

        let step_delay_ms: u64 = std::env::var("STEP_DELAY_MS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("STEP_DELAY_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            access_password,
            environment,
            service_name,
            staging_dir,
            step_delay: Duration::from_millis(step_delay_ms),
        }
    }
}
