//! The `{code, message, data}` response wrapper shared with the backend.
//!
//! Logical success is carried in `code`, not in the HTTP status: the backend
//! routinely answers HTTP 200 with `code: "401"`. Callers must check
//! [`Envelope::is_success`] rather than the transport status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Code string that denotes logical success.
pub const SUCCESS_CODE: &str = "200";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(code: impl Into<String>, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(SUCCESS_CODE, "OK", Some(data))
    }

    /// True only when `code == "200"`, whatever HTTP status carried it.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl Envelope<()> {
    pub fn empty_ok() -> Self {
        Self::new(SUCCESS_CODE, "OK", None)
    }

    pub fn unauthorized() -> Self {
        Self::new("401", "Unauthorized", None)
    }

    pub fn session_expired() -> Self {
        Self::new("401", "Session expired", None)
    }

    pub fn internal_error() -> Self {
        Self::new("500", "Internal Server Error", None)
    }

    pub fn login_failed() -> Self {
        Self::new("500", "Login failed due to server error", None)
    }
}

/// An envelope paired with the HTTP status it is sent with.
pub struct EnvelopeResponse<T>(pub StatusCode, pub Envelope<T>);

impl<T: Serialize> IntoResponse for EnvelopeResponse<T> {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        EnvelopeResponse(StatusCode::OK, self).into_response()
    }
}
