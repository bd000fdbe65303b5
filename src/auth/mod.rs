//! Cookie-held sessions for the browser.
//!
//! The access token (24h) and refresh token (7d) live in HTTP-only cookies
//! that only this service reads. Login and logout are exposed as routes;
//! the proxy uses the same cookies to authenticate backend calls.

mod actions;
mod cookie;
mod guard;
mod types;

pub use actions::{LoginOutcome, get_tokens, is_authenticated, login, logout, router};
pub use cookie::{
    ACCESS_COOKIE_MAX_AGE, ACCESS_COOKIE_NAME, CookiePolicy, REFRESH_COOKIE_MAX_AGE,
    REFRESH_COOKIE_NAME, SessionTokens, get_cookie,
};
pub use guard::{GuardDecision, guard_decision, page_not_found, require_session};
pub use types::{Credentials, LoginData, TokenPair, UserInfo};
