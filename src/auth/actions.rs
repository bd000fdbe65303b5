//! Server-side session actions: login, logout and token reads.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use super::cookie::SessionTokens;
use super::types::{Credentials, LoginData, TokenPair};
use crate::envelope::Envelope;
use crate::proxy::{BackendClient, LOGIN_PATH, LOGOUT_PATH};
use crate::state::GatewayState;

/// Result of a login attempt.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The backend's body, untouched, or the synthetic failure envelope.
    pub envelope: Value,
    /// Present only when the backend reported `code == "200"` with tokens.
    pub session: Option<TokenPair>,
}

/// POST credentials to the backend. The envelope is handed back whatever its
/// `code`; only a logical success yields a session.
pub async fn login(backend: &BackendClient, credentials: &Credentials) -> LoginOutcome {
    let body = match request_login(backend, credentials).await {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Login request failed");
            return LoginOutcome {
                envelope: failure_envelope(),
                session: None,
            };
        }
    };

    let session = serde_json::from_value::<Envelope<LoginData>>(body.clone())
        .ok()
        .filter(Envelope::is_success)
        .and_then(|env| env.data)
        .map(|data| data.token_pair());

    match &session {
        Some(_) => info!(user = %credentials.user_id, "Login succeeded"),
        None => info!(
            user = %credentials.user_id,
            code = body.get("code").and_then(|c| c.as_str()).unwrap_or("?"),
            "Login rejected"
        ),
    }

    LoginOutcome {
        envelope: body,
        session,
    }
}

async fn request_login(backend: &BackendClient, credentials: &Credentials) -> reqwest::Result<Value> {
    backend
        .post_json(LOGIN_PATH, credentials, None)
        .await?
        .json::<Value>()
        .await
}

fn failure_envelope() -> Value {
    serde_json::to_value(Envelope::<()>::login_failed()).unwrap_or(Value::Null)
}

/// Best-effort backend logout. Failures are logged, never returned.
pub async fn logout(backend: &BackendClient, tokens: &SessionTokens) {
    let Some(access_token) = tokens.access_token.as_deref() else {
        return;
    };

    match backend
        .post_json(LOGOUT_PATH, &serde_json::json!({}), Some(access_token))
        .await
    {
        Ok(response) if !response.status().is_success() => {
            warn!(status = %response.status(), "Backend logout returned an error")
        }
        Ok(_) => info!("Backend session invalidated"),
        Err(e) => error!(error = %e, "Server logout failed"),
    }
}

/// Pure read of the cookie pair.
pub fn get_tokens(headers: &HeaderMap) -> SessionTokens {
    SessionTokens::from_headers(headers)
}

/// An access cookie is present. Says nothing about its validity upstream.
pub fn is_authenticated(headers: &HeaderMap) -> bool {
    get_tokens(headers).access_token.is_some()
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/session", get(session_handler))
        .with_state(state)
}

async fn login_handler(
    State(state): State<GatewayState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let Json(credentials) = match credentials {
        Ok(credentials) => credentials,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable login request");
            return Json(failure_envelope()).into_response();
        }
    };

    let outcome = login(&state.backend, &credentials).await;
    let mut response = Json(outcome.envelope).into_response();
    if let Some(pair) = outcome.session {
        state.cookies.set_session(
            response.headers_mut(),
            &pair.access_token,
            &pair.refresh_token,
        );
    }
    response
}

async fn logout_handler(State(state): State<GatewayState>, headers: HeaderMap) -> Response {
    logout(&state.backend, &get_tokens(&headers)).await;
    let mut response = Envelope::<()>::empty_ok().into_response();
    state.cookies.clear_session(response.headers_mut());
    response
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionStatus {
    authenticated: bool,
    session_timeout_ms: u128,
}

async fn session_handler(State(state): State<GatewayState>, headers: HeaderMap) -> Response {
    Envelope::ok(SessionStatus {
        authenticated: is_authenticated(&headers),
        session_timeout_ms: state.session_timeout.as_millis(),
    })
    .into_response()
}
