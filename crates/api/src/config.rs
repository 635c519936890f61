use std::time::Duration;

use gateway_core::job::TransitionPolicy;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight dispatches (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Base URL of the AutoML core (default: `http://localhost:8000`).
    pub automl_core_url: String,
    /// Timeout for a single forwarding request to the AutoML core (default: `30`).
    pub dispatch_timeout_secs: u64,
    /// Maximum accepted request body, dataset upload included (default: 100 MiB).
    pub max_upload_bytes: usize,
    /// Reject status transitions the job lifecycle does not define
    /// (default: `false`, last write wins).
    pub strict_transitions: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `8080`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `AUTOML_CORE_URL`       | `http://localhost:8000`    |
    /// | `DISPATCH_TIMEOUT_SECS` | `30`                       |
    /// | `MAX_UPLOAD_BYTES`      | `104857600`                |
    /// | `STRICT_TRANSITIONS`    | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
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

        let automl_core_url = std::env::var("AUTOML_CORE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:8000".into());

        let dispatch_timeout_secs: u64 = std::env::var("DISPATCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("DISPATCH_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "104857600".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let strict_transitions = std::env::var("STRICT_TRANSITIONS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            automl_core_url,
            dispatch_timeout_secs,
            max_upload_bytes,
            strict_transitions,
        }
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        if self.strict_transitions {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        }
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// `1`, `true`, `yes` and `on` (any case) enable a flag.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
