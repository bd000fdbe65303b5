//! The `/api/{*path}` forwarding handler.

use axum::{
    body::{Body, to_bytes},
    extract::{Path, State},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info};

use super::client::OutboundRequest;
use super::headers::{relay_response, sanitize_request_headers, set_bearer};
use super::refresh::refresh_and_retry;
use crate::auth::SessionTokens;
use crate::envelope::{Envelope, EnvelopeResponse};
use crate::state::GatewayState;

/// Largest inbound body buffered for forwarding (board attachments included).
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Forward any request under the proxy prefix to the backend.
pub async fn proxy_handler(
    State(state): State<GatewayState>,
    Path(path): Path<String>,
    request: Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();
    let url = state.backend.target_url(&path, parts.uri.query());
    let tokens = SessionTokens::from_headers(&parts.headers);

    let mut headers = sanitize_request_headers(&parts.headers);
    match &tokens.access_token {
        Some(token) => {
            debug!(prefix = %token_prefix(token), "Attaching access token");
            set_bearer(&mut headers, token);
        }
        None => debug!("No access token cookie, forwarding unauthenticated"),
    }

    let body = if carries_body(&parts.method) {
        match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!(url = %url, error = %e, "Failed to read request body");
                return internal_error();
            }
        }
    } else {
        None
    };

    let outbound = OutboundRequest {
        method: parts.method,
        url,
        headers,
        body,
    };

    info!(method = %outbound.method, url = %outbound.url, "Forwarding");
    match state.backend.send(&outbound).await {
        Ok(upstream) if upstream.status() == StatusCode::UNAUTHORIZED => {
            info!(url = %outbound.url, "Upstream returned 401, attempting refresh");
            refresh_and_retry(&state, outbound, tokens.refresh_token).await
        }
        Ok(upstream) => {
            debug!(url = %outbound.url, status = %upstream.status(), "Upstream responded");
            relay_response(upstream)
        }
        Err(e) => transport_failure(&outbound.url, &e),
    }
}

fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}

fn internal_error() -> Response {
    EnvelopeResponse(StatusCode::INTERNAL_SERVER_ERROR, Envelope::internal_error()).into_response()
}

/// Log a failed backend call and answer with the 500 envelope.
fn transport_failure(url: &str, e: &reqwest::Error) -> Response {
    error!(url = %url, error = %e, "Backend request failed");
    internal_error()
}
