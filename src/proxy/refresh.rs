//! One-shot token refresh followed by a single replay of the original call.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use super::client::{OutboundRequest, REFRESH_PATH};
use super::headers::{relay_response, set_bearer};
use crate::auth::TokenPair;
use crate::envelope::{Envelope, EnvelopeResponse};
use crate::state::GatewayState;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("backend rejected refresh with status {0}")]
    Rejected(StatusCode),
    #[error("refresh response is not JSON: {0}")]
    InvalidBody(#[source] reqwest::Error),
    #[error("refresh response carries no access token")]
    MissingAccessToken,
}

/// Handle an upstream 401 for `original`.
///
/// Without a refresh token the caller gets `Unauthorized` and no outbound
/// call is made. On a successful refresh `original` is replayed exactly once
/// with the new bearer, its response is returned whatever its status, and the
/// new pair is written to cookies. A failed refresh, or a replay that never
/// gets a response, clears both cookies and answers `Session expired`.
pub async fn refresh_and_retry(
    state: &GatewayState,
    mut original: OutboundRequest,
    refresh_token: Option<String>,
) -> Response {
    let Some(refresh_token) = refresh_token else {
        info!(url = %original.url, "Upstream 401 and no refresh token");
        return EnvelopeResponse(StatusCode::UNAUTHORIZED, Envelope::unauthorized())
            .into_response();
    };

    let pair = match refresh_tokens(state, &refresh_token).await {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "Token refresh failed, clearing session");
            return session_expired(state);
        }
    };

    set_bearer(&mut original.headers, &pair.access_token);
    match state.backend.send(&original).await {
        Ok(upstream) => {
            info!(url = %original.url, status = %upstream.status(), "Retried after refresh");
            let mut response = relay_response(upstream);
            state.cookies.set_session(
                response.headers_mut(),
                &pair.access_token,
                &pair.refresh_token,
            );
            response
        }
        Err(e) => {
            warn!(url = %original.url, error = %e, "Retry after refresh failed, clearing session");
            session_expired(state)
        }
    }
}

fn session_expired(state: &GatewayState) -> Response {
    let mut response =
        EnvelopeResponse(StatusCode::UNAUTHORIZED, Envelope::session_expired()).into_response();
    state.cookies.clear_session(response.headers_mut());
    response
}

/// Exchange a refresh token for a new pair.
pub async fn refresh_tokens(
    state: &GatewayState,
    refresh_token: &str,
) -> Result<TokenPair, RefreshError> {
    let response = state
        .backend
        .post_json(REFRESH_PATH, &json!({ "refreshToken": refresh_token }), None)
        .await
        .map_err(RefreshError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(RefreshError::Rejected(status));
    }

    let body: Value = response.json().await.map_err(RefreshError::InvalidBody)?;
    extract_token_pair(&body, refresh_token).ok_or(RefreshError::MissingAccessToken)
}

/// Pull the new pair out of either the enveloped (`data.*`) or flat shape.
/// The refresh token falls back to `prior` when the backend does not rotate it.
pub fn extract_token_pair(body: &Value, prior: &str) -> Option<TokenPair> {
    let lookup = |pointers: &[&str]| {
        pointers
            .iter()
            .filter_map(|p| body.pointer(p).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .map(str::to_string)
    };

    let access_token = lookup(&["/data/token", "/data/accessToken", "/accessToken", "/token"])?;
    let refresh_token =
        lookup(&["/data/refreshToken", "/refreshToken"]).unwrap_or_else(|| prior.to_string());

    Some(TokenPair {
        access_token,
        refresh_token,
    })
}
