//! Header rewriting for proxied requests and responses.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};

/// Request headers that describe the inbound connection and must not be
/// forwarded. `content-length` is recomputed by the client.
pub const HOP_BY_HOP_REQUEST_HEADERS: [&str; 10] = [
    "host",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Response headers that are derived from the backend's framing and may be
/// stale once the body is re-streamed.
pub const STRIPPED_RESPONSE_HEADERS: [&str; 4] = [
    "content-length",
    "content-encoding",
    "transfer-encoding",
    "connection",
];

/// Copy inbound headers, dropping hop-by-hop ones.
pub fn sanitize_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in HOP_BY_HOP_REQUEST_HEADERS {
        out.remove(name);
    }
    out
}

/// Set `Authorization: Bearer <token>`, replacing any client-supplied value.
pub fn set_bearer(headers: &mut HeaderMap, token: &str) {
    match HeaderValue::from_str(&format!("Bearer {}", token)) {
        Ok(value) => {
            headers.insert(header::AUTHORIZATION, value);
        }
        Err(_) => tracing::warn!("Access token contains invalid header characters, not attaching"),
    }
}

/// Convert a backend response into one for the caller, streaming the body.
pub fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();

    let mut headers = HeaderMap::new();
    for (name, value) in upstream.headers() {
        if !STRIPPED_RESPONSE_HEADERS.contains(&name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
