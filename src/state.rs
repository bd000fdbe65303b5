//! Shared state for the proxy and auth routes.

use std::time::Duration;

use crate::auth::CookiePolicy;
use crate::proxy::BackendClient;

#[derive(Debug, Clone)]
pub struct GatewayState {
    pub backend: BackendClient,
    pub cookies: CookiePolicy,
    /// Client-side inactivity timeout, advertised on `/auth/session`.
    pub session_timeout: Duration,
}
