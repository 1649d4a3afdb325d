//! Login and logout through the controller.

#![allow(clippy::unwrap_used)] // Test code

use importer_session::constants::messages;
use importer_session::mocks::{
    ConfigEvent, MockUserService, RecordingConfigAdapter, RecordingNotifier, RecordingOrderList,
};
use importer_session::{
    ApiResponse, ErrorKind, Facility, FieldMappingValue, Operation, SessionAction, SessionConfig,
    SessionController, SessionError,
};
use importer_testing::init_test_tracing;
use serde_json::json;
use std::time::Duration;

type Controller =
    SessionController<MockUserService, RecordingNotifier, RecordingConfigAdapter, RecordingOrderList>;

struct Fixture {
    controller: Controller,
    users: MockUserService,
    notifier: RecordingNotifier,
    adapter: RecordingConfigAdapter,
    orders: RecordingOrderList,
}

fn fixture(users: MockUserService, config: SessionConfig) -> Fixture {
    init_test_tracing();
    let notifier = RecordingNotifier::new();
    let adapter = RecordingConfigAdapter::new();
    let orders = RecordingOrderList::new();
    let controller = SessionController::new(
        users.clone(),
        notifier.clone(),
        adapter.clone(),
        orders.clone(),
        config.with_request_timeout(Duration::from_secs(5)),
    );
    Fixture {
        controller,
        users,
        notifier,
        adapter,
        orders,
    }
}

fn backend() -> MockUserService {
    let value: FieldMappingValue = [("orderId", "PO Number")].into_iter().collect();
    MockUserService::new()
        .with_account("alice", "secret")
        .with_mapping("M1", "Purchase orders", &value)
}

#[tokio::test]
async fn login_without_permission_commits_token_once() {
    let f = fixture(backend(), SessionConfig::default());

    let payload = f.controller.login("alice", "secret").await.unwrap();

    assert_eq!(payload.token(), Some("token-1"));
    assert_eq!(f.controller.token().await.as_deref(), Some("token-1"));
    assert_eq!(f.adapter.token_updates(), vec!["token-1".to_string()]);
    assert_eq!(f.users.call_count(Operation::CheckPermission), 0);
    assert!(f.notifier.toasts().is_empty());
}

#[tokio::test]
async fn login_runs_post_login_tasks_before_returning() {
    let f = fixture(
        backend(),
        SessionConfig::default().with_default_date_format("dd/MM/yyyy"),
    );
    f.controller.set_date_time_format("yyyy").await;

    f.controller.login("alice", "secret").await.unwrap();

    assert_eq!(
        f.users.calls(),
        vec![
            Operation::Login,
            Operation::GetProfile,
            Operation::GetFieldMappings
        ]
    );
    let state = f.controller.snapshot().await;
    assert_eq!(
        state.current_user.and_then(|u| u.user_login_id).as_deref(),
        Some("alice")
    );
    assert_eq!(state.field_mappings.len(), 1);
    assert_eq!(state.date_time_format, "dd/MM/yyyy");
}

fn outcome_name(action: &SessionAction) -> &'static str {
    match action {
        SessionAction::GetProfile { .. } => "GetProfile",
        SessionAction::ProfileUpdated { .. } => "ProfileUpdated",
        SessionAction::GetFieldMappings { .. } => "GetFieldMappings",
        SessionAction::FieldMappingsReplaced { .. } => "FieldMappingsReplaced",
        SessionAction::DateTimeFormatUpdated { .. } => "DateTimeFormatUpdated",
        SessionAction::LoginCompleted { .. } => "LoginCompleted",
        _ => "other",
    }
}

#[tokio::test]
async fn post_login_outcomes_are_broadcast_in_order() {
    let f = fixture(backend(), SessionConfig::default());
    let mut observed = f.controller.store().subscribe_actions();

    f.controller.login("alice", "secret").await.unwrap();

    let mut names = Vec::new();
    loop {
        let action = observed.recv().await.unwrap();
        names.push(outcome_name(&action));
        if matches!(action, SessionAction::LoginCompleted { .. }) {
            break;
        }
    }
    // Feedback is broadcast once its own follow-ups have finished.
    assert_eq!(
        names,
        vec![
            "FieldMappingsReplaced",
            "GetFieldMappings",
            "ProfileUpdated",
            "GetProfile",
            "DateTimeFormatUpdated",
            "LoginCompleted",
        ]
    );
}

#[tokio::test]
async fn login_with_granted_permission_checks_with_new_token() {
    let f = fixture(
        backend().with_permission("IMPORT_APP_VIEW"),
        SessionConfig::default().with_permission_id("IMPORT_APP_VIEW"),
    );

    f.controller.login("alice", "secret").await.unwrap();

    assert_eq!(f.users.permission_tokens(), vec!["token-1".to_string()]);
    assert!(f.controller.is_authenticated().await);
}

#[tokio::test]
async fn login_with_denied_permission_commits_nothing() {
    let f = fixture(
        backend(),
        SessionConfig::default().with_permission_id("IMPORT_APP_VIEW"),
    );

    let error = f.controller.login("alice", "secret").await.unwrap_err();

    assert_eq!(
        error,
        SessionError::PermissionDenied {
            permission_id: "IMPORT_APP_VIEW".to_string()
        }
    );
    assert!(!f.controller.is_authenticated().await);
    assert!(f.adapter.token_updates().is_empty());
    assert_eq!(f.users.call_count(Operation::GetProfile), 0);
    assert_eq!(f.notifier.toasts(), vec![messages::PERMISSION_DENIED.to_string()]);
}

#[tokio::test]
async fn failed_permission_check_is_a_permission_failure() {
    let f = fixture(
        backend(),
        SessionConfig::default().with_permission_id("IMPORT_APP_VIEW"),
    );
    f.users.respond_with(
        Operation::CheckPermission,
        ApiResponse::new(502, json!("Bad Gateway")),
    );

    let error = f.controller.login("alice", "secret").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::TransportOrServer);
    assert!(error.is_permission_failure());
    assert!(!f.controller.is_authenticated().await);
    assert_eq!(f.notifier.toasts(), vec![messages::PERMISSION_DENIED.to_string()]);
}

#[tokio::test]
async fn wrong_password_rejects_with_credentials_toast() {
    let f = fixture(backend(), SessionConfig::default());

    let error = f.controller.login("alice", "wrong").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Application);
    assert!(error.is_auth_failure());
    assert!(!f.controller.is_authenticated().await);
    assert_eq!(
        f.notifier.toasts(),
        vec![messages::INCORRECT_CREDENTIALS.to_string()]
    );
}

#[tokio::test]
async fn unreachable_login_rejects_with_generic_toast() {
    let f = fixture(backend(), SessionConfig::default());
    f.users.fail_with(Operation::Login, "connection refused");

    let error = f.controller.login("alice", "secret").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::TransportOrServer);
    assert_eq!(
        f.notifier.toasts(),
        vec![messages::SOMETHING_WENT_WRONG.to_string()]
    );
}

#[tokio::test]
async fn advisory_event_message_is_toasted() {
    let f = fixture(
        backend().with_event_message("Alert: scheduled maintenance at 22:00"),
        SessionConfig::default(),
    );

    f.controller.login("alice", "secret").await.unwrap();

    assert_eq!(
        f.notifier.toasts(),
        vec!["Alert: scheduled maintenance at 22:00".to_string()]
    );
}

#[tokio::test]
async fn profile_failure_after_login_does_not_fail_login() {
    let f = fixture(backend(), SessionConfig::default());
    f.users
        .respond_with(Operation::GetProfile, ApiResponse::new(500, json!("oops")));

    f.controller.login("alice", "secret").await.unwrap();

    assert!(f.controller.is_authenticated().await);
    assert!(f.controller.current_user().await.is_none());
    assert_eq!(f.users.call_count(Operation::GetFieldMappings), 0);
    assert_eq!(
        f.notifier.toasts(),
        vec![messages::PROFILE_FETCH_FAILED.to_string()]
    );
}

#[tokio::test]
async fn logout_clears_session_and_keeps_instance() {
    let f = fixture(backend(), SessionConfig::default().with_instance_url("acme"));
    f.controller.login("alice", "secret").await.unwrap();
    f.controller.set_facility(Some(Facility::new("WH-1"))).await;
    let selected = f.controller.field_mappings().await.into_values().next();
    f.controller.update_current_mapping(selected).await;

    f.controller.logout().await;

    let state = f.controller.snapshot().await;
    assert!(state.token.is_none());
    assert!(state.current_user.is_none());
    assert!(state.current_facility.is_none());
    assert!(state.field_mappings.is_empty());
    assert!(state.current_mapping.is_none());
    assert_eq!(state.instance_url.as_deref(), Some("acme"));
    assert_eq!(f.adapter.events().last(), Some(&ConfigEvent::Reset));
    assert_eq!(f.orders.clear_count(), 1);
}

#[tokio::test]
async fn logout_without_session_still_resets() {
    let f = fixture(backend(), SessionConfig::default());

    f.controller.logout().await;

    assert_eq!(f.adapter.reset_count(), 1);
    assert_eq!(f.orders.clear_count(), 1);
    assert!(f.users.calls().is_empty());
}

#[tokio::test]
async fn login_again_after_logout_issues_new_token() {
    let f = fixture(backend(), SessionConfig::default());

    f.controller.login("alice", "secret").await.unwrap();
    f.controller.logout().await;
    f.controller.login("alice", "secret").await.unwrap();

    assert_eq!(f.controller.token().await.as_deref(), Some("token-2"));
    assert_eq!(
        f.adapter.events(),
        vec![
            ConfigEvent::TokenUpdated("token-1".to_string()),
            ConfigEvent::Reset,
            ConfigEvent::TokenUpdated("token-2".to_string()),
        ]
    );
}
