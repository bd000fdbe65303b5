//! Stand-in login endpoint for running the frontend without a backend.

use axum::{Json, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::envelope::Envelope;

pub const MOCK_USER_ID: &str = "admin";
pub const MOCK_PASSWORD: &str = "12345678";
pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";
pub const MOCK_REFRESH_TOKEN: &str = "mock-refresh-token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockLoginRequest {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    user_pwd: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MockLoginData {
    access_token: &'static str,
    refresh_token: &'static str,
    user: MockUser,
}

#[derive(Debug, Serialize)]
struct MockUser {
    id: String,
    name: &'static str,
}

/// Accepts exactly the mock admin; every other pair gets a logical 401
/// carried over HTTP 200, the way the real backend reports it.
pub async fn mock_login(Json(request): Json<MockLoginRequest>) -> impl IntoResponse {
    info!(user = %request.user_id, "Mock login request");

    if request.user_id == MOCK_USER_ID && request.user_pwd == MOCK_PASSWORD {
        return Envelope::ok(MockLoginData {
            access_token: MOCK_ACCESS_TOKEN,
            refresh_token: MOCK_REFRESH_TOKEN,
            user: MockUser {
                id: request.user_id,
                name: "Admin User",
            },
        })
        .into_response();
    }

    Envelope::<()>::new("401", "Password does not match", None).into_response()
}
