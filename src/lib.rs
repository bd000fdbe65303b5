pub mod auth;
pub mod cli;
pub mod envelope;
pub mod error;
pub mod mock;
pub mod proxy;
pub mod session;
pub mod state;

use auth::{CookiePolicy, page_not_found, require_session};
use axum::{
    Router, middleware,
    routing::{any, post},
};
use error::GatewayResult;
use proxy::{BackendClient, proxy_handler};
use state::GatewayState;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

/// Prefix under which requests are proxied to the backend.
pub const API_PREFIX: &str = "/api";

/// Prefix of the session routes (login, logout, session status).
pub const AUTH_PREFIX: &str = "/auth";

pub struct ServerConfig {
    /// Backend API base URL (e.g., "http://localhost:8080/api")
    pub backend_url: Url,
    /// Whether to set Secure flag on cookies
    pub secure_cookies: bool,
    /// Client inactivity timeout, advertised on the session route
    pub session_timeout: Duration,
    /// Timeout for backend calls; unbounded when None
    pub backend_timeout: Option<Duration>,
    /// Serve the mock login endpoint
    pub mock_auth: bool,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> GatewayResult<Router> {
    let state = GatewayState {
        backend: BackendClient::new(&config.backend_url, config.backend_timeout)?,
        cookies: CookiePolicy::new(config.secure_cookies),
        session_timeout: config.session_timeout,
    };

    let mut api_router = Router::new();
    if config.mock_auth {
        api_router = api_router.route("/mock/v1/auth/login", post(mock::mock_login));
    }
    let api_router = api_router
        .route("/{*path}", any(proxy_handler))
        .with_state(state.clone());

    // Anything else is a page; the guard decides whether it needs a session.
    let pages = Router::new()
        .fallback(page_not_found)
        .layer(middleware::from_fn(require_session));

    Ok(Router::new()
        .nest(API_PREFIX, api_router)
        .nest(AUTH_PREFIX, auth::router(state))
        .fallback_service(pages))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> GatewayResult<()> {
    let app = create_app(&config)?;
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await?;
    Ok(())
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> GatewayResult<(tokio::task::JoinHandle<()>, SocketAddr)> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
