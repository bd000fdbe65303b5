#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use pawgate::{ServerConfig, create_app};
use std::time::Duration;
use url::Url;
use wiremock::{Match, MockServer};

pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub fn test_config(backend_url: &str) -> ServerConfig {
    ServerConfig {
        backend_url: Url::parse(backend_url).expect("Invalid URL"),
        secure_cookies: false,
        session_timeout: SESSION_TIMEOUT,
        backend_timeout: Some(Duration::from_secs(5)),
        mock_auth: false,
    }
}

/// Gateway app proxying to the given mock backend.
pub fn app_for(backend: &MockServer) -> Router {
    create_app(&test_config(&backend.uri())).expect("Failed to create app")
}

/// URL of a local port with nothing listening on it.
pub async fn dead_backend_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");
    drop(listener);
    format!("http://{}", addr)
}

pub fn auth_cookies(access_token: &str, refresh_token: &str) -> String {
    format!(
        "accessToken={}; refreshToken={}",
        access_token, refresh_token
    )
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of a cookie being set (not cleared) in the response.
pub fn set_cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies
        .iter()
        .filter(|c| !c.contains("Max-Age=0"))
        .find_map(|c| c.strip_prefix(&format!("{}=", name)))
        .and_then(|rest| rest.split(';').next())
        .map(str::to_string)
}

/// Check if cookies contain a token being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", cookie_name)) && c.contains("Max-Age=0"))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Matches requests that carry no Authorization header.
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &wiremock::Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}
