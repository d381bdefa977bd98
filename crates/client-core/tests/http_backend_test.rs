//! HttpBackend against a mock HTTP server

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webphone_client_core::client::config::{PREPARE_CALL_PATH, TOKEN_PATH};
use webphone_client_core::{CallBackend, ClientConfig, ClientError, HttpBackend};

async fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::from_config(&ClientConfig::new().with_backend_base(&server.uri()))
}

#[tokio::test]
async fn test_fetch_token_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "jwt-123" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = backend(&server).await.fetch_token().await.unwrap();
    assert_eq!(response.into_token(), Ok("jwt-123".to_string()));
}

#[tokio::test]
async fn test_token_response_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "expires": 60 })))
        .mount(&server)
        .await;

    let response = backend(&server).await.fetch_token().await.unwrap();
    assert_eq!(response.into_token(), Err(ClientError::MissingToken));
}

#[tokio::test]
async fn test_prepare_call_sends_phone_number() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREPARE_CALL_PATH))
        .and(body_json(serde_json::json!({ "phoneNumber": "+13322309337" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "callId": "call-42" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = backend(&server).await.prepare_call("+13322309337").await.unwrap();
    assert_eq!(response.into_call_id(), Ok("call-42".to_string()));
}

#[tokio::test]
async fn test_non_success_status_is_request_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREPARE_CALL_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend(&server).await.prepare_call("+1555").await.unwrap_err();
    assert_eq!(err, ClientError::RequestFailed { status: 500 });
    assert_eq!(err.to_string(), "Request failed: 500");
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = backend(&server).await.fetch_token().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let backend = HttpBackend::new("http://127.0.0.1:1/token", "http://127.0.0.1:1/prepare");

    let err = backend.fetch_token().await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }));
}
