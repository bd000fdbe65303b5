//! Ending a client session: server-side cookie clear, local clear, and the
//! navigation the caller should perform.

use std::future::Future;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use super::clock::Clock;
use super::manager::SessionManager;
use super::store::KeyValueStore;

/// Where the UI shell should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Login,
}

impl Navigation {
    pub fn path(&self) -> &'static str {
        match self {
            Navigation::Login => "/login",
        }
    }
}

#[derive(Debug, Error)]
pub enum TerminateError {
    #[error("logout request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("logout returned status {0}")]
    Rejected(StatusCode),
}

/// Invalidates the server half of a session (the HTTP-only cookies).
pub trait SessionTerminator: Send + Sync {
    fn terminate(&self) -> impl Future<Output = Result<(), TerminateError>> + Send;
}

/// Terminator that calls the gateway's `POST auth/logout`. The client must
/// send the session cookies along for the gateway to clear them.
#[derive(Debug, Clone)]
pub struct GatewayLogout {
    client: reqwest::Client,
    logout_url: Url,
}

impl GatewayLogout {
    /// `gateway_url` may carry a base path; the logout route is resolved
    /// under it.
    pub fn new(client: reqwest::Client, gateway_url: &Url) -> Result<Self, url::ParseError> {
        let mut base = gateway_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            logout_url: base.join("auth/logout")?,
        })
    }

    pub fn logout_url(&self) -> &Url {
        &self.logout_url
    }
}

impl SessionTerminator for GatewayLogout {
    async fn terminate(&self) -> Result<(), TerminateError> {
        let response = self.client.post(self.logout_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TerminateError::Rejected(status));
        }
        Ok(())
    }
}

/// The session is no longer valid: clear both halves and send the user to
/// the login page. Server-side failures do not stop the local clear.
pub async fn handle_unauthorized<S, C, T>(
    manager: &SessionManager<S, C>,
    terminator: &T,
) -> Navigation
where
    S: KeyValueStore,
    C: Clock,
    T: SessionTerminator,
{
    warn!("Unauthorized session detected");
    if let Err(e) = terminator.terminate().await {
        error!(error = %e, "Failed to clear server cookies");
    }
    manager.clear_session();
    Navigation::Login
}

/// User-initiated logout. Returns the navigation to perform when `redirect`
/// is set.
pub async fn logout<S, C, T>(
    manager: &SessionManager<S, C>,
    terminator: &T,
    redirect: bool,
) -> Option<Navigation>
where
    S: KeyValueStore,
    C: Clock,
    T: SessionTerminator,
{
    info!("Logging out");
    if let Err(e) = terminator.terminate().await {
        error!(error = %e, "Logout error");
    }
    manager.clear_session();
    redirect.then_some(Navigation::Login)
}
