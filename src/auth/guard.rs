//! Page route protection: no access cookie means a trip to the login page.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::form_urlencoded;

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};

/// Login page path.
pub const LOGIN_PATH: &str = "/login";

/// Page prefixes reachable without a session.
pub const PUBLIC_PREFIXES: [&str; 5] = ["/login", "/signup", "/find-password", "/error", "/auth"];

/// Prefixes never guarded (API traffic and static assets).
pub const UNGUARDED_PREFIXES: [&str; 4] = ["/api", "/_next/static", "/_next/image", "/favicon.ico"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin(String),
}

pub fn guard_decision(path: &str, has_access_token: bool) -> GuardDecision {
    let exempt = PUBLIC_PREFIXES
        .iter()
        .chain(UNGUARDED_PREFIXES.iter())
        .any(|prefix| path.starts_with(prefix));

    if exempt || has_access_token {
        return GuardDecision::Allow;
    }

    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("return_to", path)
        .finish();
    GuardDecision::RedirectToLogin(format!("{}?{}", LOGIN_PATH, query))
}

/// Middleware redirecting unauthenticated page requests to the login page.
pub async fn require_session(request: Request, next: Next) -> Response {
    let has_token = get_cookie(request.headers(), ACCESS_COOKIE_NAME).is_some_and(|t| !t.is_empty());
    match guard_decision(request.uri().path(), has_token) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectToLogin(location) => {
            tracing::debug!(path = %request.uri().path(), "No session, redirecting to login");
            Redirect::temporary(&location).into_response()
        }
    }
}

/// Pages are served by the frontend host, not here.
pub async fn page_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
