//! Tests for ending a client session through the gateway's logout route.

mod common;

use common::*;
use pawgate::session::{
    GatewayLogout, ManualClock, MemoryStore, Navigation, SessionManager, SessionTerminator,
    TerminateError, handle_unauthorized,
};
use pawgate::start_server;
use reqwest::StatusCode;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn terminator_for(gateway_url: &str) -> GatewayLogout {
    GatewayLogout::new(reqwest::Client::new(), &Url::parse(gateway_url).unwrap()).unwrap()
}

#[tokio::test]
async fn test_terminate_against_running_gateway() {
    let backend = MockServer::start().await;
    let (handle, addr) = start_server(test_config(&backend.uri()), 0).await.unwrap();

    let terminator = terminator_for(&format!("http://{}", addr));
    assert!(terminator.terminate().await.is_ok());

    handle.abort();
}

#[tokio::test]
async fn test_terminate_under_base_path() {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/console/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&gateway)
        .await;

    let terminator = terminator_for(&format!("{}/console", gateway.uri()));
    assert!(terminator.terminate().await.is_ok());
}

#[tokio::test]
async fn test_terminate_rejected() {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&gateway)
        .await;

    let result = terminator_for(&gateway.uri()).terminate().await;
    assert!(matches!(
        result,
        Err(TerminateError::Rejected(StatusCode::SERVICE_UNAVAILABLE))
    ));
}

#[tokio::test]
async fn test_terminate_unreachable_gateway() {
    let result = terminator_for(&dead_backend_url().await).terminate().await;
    assert!(matches!(result, Err(TerminateError::Transport(_))));
}

#[tokio::test]
async fn test_unauthorized_clears_local_session_when_gateway_is_down() {
    let manager = SessionManager::with_clock(MemoryStore::new(), ManualClock::new(1_000));
    manager.update_last_activity();
    manager.set_saved_id("admin");

    let terminator = terminator_for(&dead_backend_url().await);
    let nav = handle_unauthorized(&manager, &terminator).await;

    assert_eq!(nav, Navigation::Login);
    assert_eq!(manager.last_activity(), None);
    assert_eq!(manager.saved_id().as_deref(), Some("admin"));
}
