//! Authenticated reverse proxy to the backend API.
//!
//! Requests under the proxy prefix are forwarded with the access token from
//! the session cookie. An upstream 401 triggers at most one refresh and one
//! replay. Concurrent 401s are not coalesced: each inbound request runs its
//! own refresh.

mod client;
mod handler;
mod headers;
mod refresh;

pub use client::{BackendClient, LOGIN_PATH, LOGOUT_PATH, OutboundRequest, REFRESH_PATH};
pub use handler::{MAX_BODY_BYTES, proxy_handler};
pub use headers::{
    HOP_BY_HOP_REQUEST_HEADERS, STRIPPED_RESPONSE_HEADERS, relay_response,
    sanitize_request_headers, set_bearer,
};
pub use refresh::{RefreshError, extract_token_pair, refresh_and_retry, refresh_tokens};
