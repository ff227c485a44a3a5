use std::time::Duration;

use renotracker_storage::S3Settings;

use crate::auth::jwt::JwtConfig;

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
    /// Grace period for in-flight requests after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// Object storage settings for document uploads.
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `COOKIE_SECURE`        | `0`                        |
    ///
    /// See [`JwtConfig::from_env`] and [`StorageConfig::from_env`] for the
    /// nested sections.
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
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let cookie_secure = env_flag("COOKIE_SECURE");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            cookie_secure,
            storage: StorageConfig::from_env(),
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// Default lifetime of presigned download URLs.
const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;

/// Longest lifetime S3 SigV4 accepts for a presigned URL (7 days).
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 3600;

/// Parse `PRESIGN_EXPIRY_SECS`, which must lie in `1..=MAX_PRESIGN_EXPIRY_SECS`.
fn parse_presign_expiry(raw: Option<String>) -> Result<u64, String> {
    let secs = match raw.as_deref().map(str::trim) {
        None | Some("") => return Ok(DEFAULT_PRESIGN_EXPIRY_SECS),
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| format!("PRESIGN_EXPIRY_SECS must be a valid u64, got '{value}'"))?,
    };
    if !(1..=MAX_PRESIGN_EXPIRY_SECS).contains(&secs) {
        return Err(format!(
            "PRESIGN_EXPIRY_SECS must be between 1 and {MAX_PRESIGN_EXPIRY_SECS}, got {secs}"
        ));
    }
    Ok(secs)
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// `None` when MinIO credentials are missing; uploads are then skipped
    /// and downloads answer 503.
    pub s3: Option<S3Settings>,
    pub presign_expiry_secs: u64,
}

impl StorageConfig {
    /// Load object storage settings.
    ///
    /// | Env Var                 | Default              |
    /// |-------------------------|----------------------|
    /// | `MINIO_ENDPOINT`        | `http://minio:9000`  |
    /// | `MINIO_PUBLIC_ENDPOINT` | (internal endpoint)  |
    /// | `MINIO_ACCESS_KEY`      | --                   |
    /// | `MINIO_SECRET_KEY`      | --                   |
    /// | `MINIO_BUCKET`          | `renovation`         |
    /// | `AWS_REGION`            | `us-east-1`          |
    /// | `PRESIGN_EXPIRY_SECS`   | `3600`               |
    ///
    /// Storage is enabled only when endpoint, both keys and the bucket are
    /// non-empty. Panics on an expiry outside `1..=604800`.
    pub fn from_env() -> Self {
        let endpoint = trimmed_env("MINIO_ENDPOINT").unwrap_or_else(|| "http://minio:9000".into());
        let public_endpoint = trimmed_env("MINIO_PUBLIC_ENDPOINT");
        let access_key = trimmed_env("MINIO_ACCESS_KEY");
        let secret_key = trimmed_env("MINIO_SECRET_KEY");
        let bucket = trimmed_env("MINIO_BUCKET").unwrap_or_else(|| "renovation".into());
        let region = trimmed_env("AWS_REGION").unwrap_or_else(|| "us-east-1".into());

        let presign_expiry_secs = parse_presign_expiry(std::env::var("PRESIGN_EXPIRY_SECS").ok())
            .unwrap_or_else(|e| panic!("{e}"));

        let s3 = match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) if !endpoint.is_empty() && !bucket.is_empty() => {
                Some(S3Settings {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    public_endpoint: public_endpoint.map(|e| e.trim_end_matches('/').to_string()),
                    access_key,
                    secret_key,
                    bucket,
                    region,
                })
            }
            _ => None,
        };

        Self {
            s3,
            presign_expiry_secs,
        }
    }

    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            s3: None,
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Admin bootstrap
// ---------------------------------------------------------------------------

/// Email of the account created on a fresh install when `ADMIN_EMAIL` is unset.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@local";

/// Bootstrap admin account, read once at startup.
#[derive(Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// Overwrite an existing bootstrap account with these values.
    pub update: bool,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("update", &self.update)
            .finish_non_exhaustive()
    }
}

impl AdminConfig {
    /// | Env Var          | Default        |
    /// |------------------|----------------|
    /// | `ADMIN_EMAIL`    | `admin@local`  |
    /// | `ADMIN_PASSWORD` | `admin`        |
    /// | `ADMIN_NAME`     | `Admin`        |
    /// | `ADMIN_UPDATE`   | `0`            |
    pub fn from_env() -> Self {
        Self {
            email: trimmed_env("ADMIN_EMAIL")
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.into())
                .to_lowercase(),
            password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "admin".into()),
            display_name: trimmed_env("ADMIN_NAME").unwrap_or_else(|| "Admin".into()),
            update: env_flag("ADMIN_UPDATE"),
        }
    }
}

/// Read an env var, treating blank values as unset.
fn trimmed_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `1` / `true` / `yes` (any case) enable a flag; anything else disables it.
fn env_flag(name: &str) -> bool {
    trimmed_env(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
