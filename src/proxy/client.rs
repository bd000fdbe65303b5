//! HTTP client for the backend API with connection pooling.

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Backend login endpoint, relative to the base URL.
pub const LOGIN_PATH: &str = "v1/auth/login";
/// Backend refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "v1/auth/refresh";
/// Backend logout endpoint, relative to the base URL.
pub const LOGOUT_PATH: &str = "v1/auth/logout";

/// A fully prepared outbound call. Kept around so it can be replayed once
/// after a token refresh.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Client for forwarding requests to the backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the given base URL. `timeout` of `None` leaves
    /// outbound calls unbounded.
    pub fn new(base_url: &Url, timeout: Option<Duration>) -> GatewayResult<Self> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidBackendUrl {
                url: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        let mut builder = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(GatewayError::HttpClient)?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{path}{?query}`.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query {
            Some(query) if !query.is_empty() => format!("{}/{}?{}", self.base_url, path, query),
            _ => format!("{}/{}", self.base_url, path),
        }
    }

    /// Send a prepared request as-is.
    pub async fn send(&self, request: &OutboundRequest) -> reqwest::Result<Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        builder.send().await
    }

    /// POST a JSON body to an endpoint relative to the base URL.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        bearer: Option<&str>,
    ) -> reqwest::Result<Response> {
        let mut builder = self.client.post(self.target_url(path, None)).json(body);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder.send().await
    }
}
