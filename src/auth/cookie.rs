//! Session cookie reading and writing.
//!
//! The browser holds the token pair in two HTTP-only cookies. Reads come from
//! the inbound `Cookie` header; writes are `Set-Cookie` headers appended to
//! the outgoing response.

use axum::http::{HeaderMap, HeaderValue, header};

/// Cookie name for the access token (24 hours).
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// Cookie name for the refresh token (7 days).
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Access token cookie lifetime in seconds.
pub const ACCESS_COOKIE_MAX_AGE: u64 = 24 * 60 * 60;

/// Refresh token cookie lifetime in seconds.
pub const REFRESH_COOKIE_MAX_AGE: u64 = 7 * 24 * 60 * 60;

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = cookie_header.to_str() else {
            continue;
        };
        for part in cookie_header.split(';') {
            let part = part.trim();
            if let Some((key, value)) = part.split_once('=') {
                if key.trim() == name {
                    return Some(value.trim());
                }
            }
        }
    }
    None
}

/// The token pair as found on an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    /// Read both tokens. Empty values count as absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name| {
            get_cookie(headers, name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            access_token: read(ACCESS_COOKIE_NAME),
            refresh_token: read(REFRESH_COOKIE_NAME),
        }
    }
}

/// Attributes shared by every session cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn build(&self, name: &str, value: &str, max_age: u64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
            name, value, max_age, secure
        )
    }

    pub fn access_cookie(&self, token: &str) -> String {
        self.build(ACCESS_COOKIE_NAME, token, ACCESS_COOKIE_MAX_AGE)
    }

    pub fn refresh_cookie(&self, token: &str) -> String {
        self.build(REFRESH_COOKIE_NAME, token, REFRESH_COOKIE_MAX_AGE)
    }

    /// Append `Set-Cookie` headers storing a new token pair.
    pub fn set_session(&self, headers: &mut HeaderMap, access_token: &str, refresh_token: &str) {
        append_cookie(headers, &self.access_cookie(access_token));
        append_cookie(headers, &self.refresh_cookie(refresh_token));
    }

    /// Append `Set-Cookie` headers expiring both session cookies.
    pub fn clear_session(&self, headers: &mut HeaderMap) {
        append_cookie(headers, &self.build(ACCESS_COOKIE_NAME, "", 0));
        append_cookie(headers, &self.build(REFRESH_COOKIE_NAME, "", 0));
    }
}

fn append_cookie(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Token is not a valid cookie value, skipping"),
    }
}
