//! CLI argument parsing, validation, and startup helpers.

use std::time::Duration;

use clap::Parser;
use tracing::error;
use url::Url;

use crate::ServerConfig;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
    Test,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pawgate",
    about = "Session gateway and authenticated API proxy for the pet-care admin"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Backend API base URL. Proxied paths are appended to it
    #[arg(long, env = "BACKEND_API_URL", default_value = "http://localhost:8080/api")]
    pub backend_url: String,

    /// Force the Secure cookie flag on (true) or off (false). Defaults to on in production
    #[arg(long, env = "COOKIE_SECURE")]
    pub cookie_secure: Option<bool>,

    /// Deployment environment
    #[arg(long, env = "APP_ENV", value_enum, default_value = "development")]
    pub app_env: AppEnv,

    /// Client inactivity timeout in milliseconds, advertised to clients
    #[arg(long, env = "SESSION_TIMEOUT_MS", default_value = "1800000")]
    pub session_timeout_ms: u64,

    /// Timeout for backend calls in seconds. Unbounded when unset
    #[arg(long, env = "BACKEND_TIMEOUT_SECS")]
    pub backend_timeout_secs: Option<u64>,

    /// Serve the mock login endpoint under /api/mock/v1/auth/login
    #[arg(long)]
    pub mock_auth: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// An explicit override wins; otherwise cookies are Secure only in production.
pub fn resolve_secure_cookies(cookie_secure: Option<bool>, app_env: AppEnv) -> bool {
    cookie_secure.unwrap_or(app_env == AppEnv::Production)
}

/// Parse and validate the backend URL.
/// Returns None and logs an error if validation fails.
pub fn validate_backend_url(backend_url: &str) -> Option<Url> {
    let url = match Url::parse(backend_url) {
        Ok(url) => url,
        Err(e) => {
            error!(url = %backend_url, error = %e, "Invalid backend URL");
            return None;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        error!(url = %backend_url, "Backend URL must use http or https");
        return None;
    }

    if url.query().is_some() || url.fragment().is_some() {
        error!(url = %backend_url, "Backend URL must not carry a query or fragment");
        return None;
    }

    Some(url)
}

/// Build ServerConfig from parsed arguments.
pub fn build_config(args: &Args) -> Option<ServerConfig> {
    let backend_url = validate_backend_url(&args.backend_url)?;

    if args.session_timeout_ms == 0 {
        error!("Session timeout must be greater than zero");
        return None;
    }

    Some(ServerConfig {
        backend_url,
        secure_cookies: resolve_secure_cookies(args.cookie_secure, args.app_env),
        session_timeout: Duration::from_millis(args.session_timeout_ms),
        backend_timeout: args.backend_timeout_secs.map(Duration::from_secs),
        mock_auth: args.mock_auth,
    })
}
