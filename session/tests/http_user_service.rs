//! HTTP user service against a mock server.

#![allow(clippy::unwrap_used)] // Test code

use importer_session::api::{FieldMappingQuery, LoginRequest, PermissionQuery};
use importer_session::mocks::{RecordingNotifier, RecordingOrderList};
use importer_session::providers::{ApiSettings, ConfigAdapter, HttpUserService, UserService};
use importer_session::{
    ErrorKind, FieldMappingId, Password, ServiceError, SessionConfig, SessionController,
};
use importer_testing::init_test_tracing;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> HttpUserService {
    init_test_tracing();
    HttpUserService::new(ApiSettings::with_instance(&server.uri()))
}

#[tokio::test]
async fn login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "USERNAME": "alice", "PASSWORD": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server)
        .login(&LoginRequest {
            username: "alice".to_string(),
            password: Password::from("secret"),
        })
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.data["token"], "abc");
}

#[tokio::test]
async fn permission_check_uses_given_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkPermission"))
        .and(header("Authorization", "Bearer fresh-token"))
        .and(body_json(json!({ "permissionId": "IMPORT_APP_VIEW" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hasPermission": true })))
        .expect(1)
        .mount(&server)
        .await;

    let users = service(&server);
    users.settings().update_token("stale-token");

    let response = users
        .check_permission(
            &PermissionQuery {
                permission_id: "IMPORT_APP_VIEW".to_string(),
            },
            "fresh-token",
        )
        .await
        .unwrap();

    assert_eq!(response.data["hasPermission"], true);
}

#[tokio::test]
async fn requests_carry_configured_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user-profile"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "userLoginId": "alice" })))
        .expect(1)
        .mount(&server)
        .await;

    let users = service(&server);
    users.settings().update_token("token-1");

    let response = users.get_profile().await.unwrap();
    assert_eq!(response.data["userLoginId"], "alice");
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/performFind"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let response = service(&server)
        .get_field_mappings(&FieldMappingQuery::new("MAPPING_PURCHASE_ORDER", 20))
        .await
        .unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(response.data, json!("Internal Server Error"));
    assert!(!response.is_success());
}

#[tokio::test]
async fn unreachable_server_is_a_request_failure() {
    let users = HttpUserService::new(ApiSettings::with_instance("http://127.0.0.1:9"));

    let result = users.get_profile().await;

    assert!(matches!(result, Err(ServiceError::RequestFailed(_))));
}

#[tokio::test]
async fn controller_logs_in_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "token-http" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/checkPermission"))
        .and(header("Authorization", "Bearer token-http"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hasPermission": true })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user-profile"))
        .and(header("Authorization", "Bearer token-http"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userLoginId": "alice",
            "userTimeZone": "UTC",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/performFind"))
        .and(body_json(json!({
            "inputFields": { "mappingPrefTypeEnumId": "MAPPING_PURCHASE_ORDER" },
            "fieldList": ["mappingPrefName", "mappingPrefId", "mappingPrefValue"],
            "viewSize": 20,
            "entityName": "DataManagerMapping",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "docs": [{
                "mappingPrefId": "100",
                "mappingPrefName": "Default",
                "mappingPrefValue": "{\"orderId\":\"PO\"}",
            }],
        })))
        .mount(&server)
        .await;

    let settings = ApiSettings::with_instance(&server.uri());
    let controller = SessionController::new(
        HttpUserService::new(settings.clone()),
        RecordingNotifier::new(),
        settings.clone(),
        RecordingOrderList::new(),
        SessionConfig::default()
            .with_permission_id("IMPORT_APP_VIEW")
            .with_request_timeout(Duration::from_secs(5)),
    );

    controller.login("alice", "secret").await.unwrap();

    assert_eq!(settings.token().as_deref(), Some("token-http"));
    let mappings = controller.field_mappings().await;
    assert_eq!(
        mappings[&FieldMappingId::new("100")].value.get("orderId"),
        Some("PO")
    );

    controller.logout().await;
    assert_eq!(settings.token(), None);
}

#[tokio::test]
async fn server_error_during_login_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let settings = ApiSettings::with_instance(&server.uri());
    let notifier = RecordingNotifier::new();
    let controller = SessionController::new(
        HttpUserService::new(settings.clone()),
        notifier.clone(),
        settings,
        RecordingOrderList::new(),
        SessionConfig::default().with_request_timeout(Duration::from_secs(5)),
    );

    let error = controller.login("alice", "secret").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::TransportOrServer);
    assert!(!controller.is_authenticated().await);
    assert_eq!(notifier.toasts().len(), 1);
}
