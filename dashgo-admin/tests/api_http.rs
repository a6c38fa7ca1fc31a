//! REST adapter and runtime against a mock HTTP server

use std::sync::Arc;
use std::time::Duration;

use dashgo_admin::app::Runtime;
use dashgo_admin::domains::user_management::form::{Field, SubmissionStatus};
use dashgo_admin::domains::user_management::messages::Message;
use dashgo_admin::domains::user_management::validation::ValidationErrorKind;
use dashgo_admin::infrastructure::api_client::{ApiClient, ApiError};
use dashgo_admin::infrastructure::navigation::Route;
use dashgo_admin::infrastructure::query_cache::QueryCache;
use dashgo_admin::infrastructure::services::user_management::{
    UserAdminApiAdapter, UserAdminService,
};
use dashgo_admin::state::State;
use dashgo_model::prelude::PageRequest;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

fn adapter(server: &MockServer) -> UserAdminApiAdapter {
    let client = ApiClient::new(format!("{}/api", server.uri()), Duration::from_secs(5))
        .expect("valid base url");
    UserAdminApiAdapter::new(Arc::new(client))
}

fn user_json(id: u64, name: &str, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "email": email,
        "created_at": "2023-01-07T15:30:00Z"
    })
}

#[tokio::test]
async fn list_users_sends_paging_and_reads_total_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-count", "42")
                .set_body_json(json!({ "users": [user_json(11, "Ada", "ada@example.com")] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = adapter(&server)
        .list_users(PageRequest::new(2, 10).unwrap())
        .await
        .unwrap();

    assert_eq!(page.total_count, 42);
    assert_eq!(page.last_page(), 5);
    assert_eq!(page.users[0].id.as_str(), "11");
    assert_eq!(page.users[0].registration_date(), "January 7, 2023");
}

#[tokio::test]
async fn missing_total_header_falls_back_to_page_length() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                user_json(1, "Ada", "ada@example.com"),
                user_json(2, "Grace", "grace@example.com")
            ]
        })))
        .mount(&server)
        .await;

    let page = adapter(&server)
        .list_users(PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn create_user_posts_the_user_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(body_partial_json(json!({
            "user": {
                "name": "Ada",
                "email": "ada@example.com",
                "password": "abcdef",
                "password_confirmation": "abcdef"
            }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "user": user_json(7, "Ada", "ada@example.com") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = State::new(Arc::new(adapter(&server)), QueryCache::new(Duration::from_secs(60)));
    let mut runtime = Runtime::new(state);
    runtime.dispatch(Message::CreateUser);
    for (field, value) in [
        (Field::Name, "Ada"),
        (Field::Email, "ada@example.com"),
        (Field::Password, "abcdef"),
        (Field::PasswordConfirmation, "abcdef"),
    ] {
        runtime.dispatch(Message::CreateUserFormUpdate(field, value.to_string()));
    }
    runtime.dispatch(Message::CreateUserFormSubmit);

    // Submission plus the listing refetch after the redirect
    runtime.run_until_idle().await;

    let um = &runtime.state().domains.user_management.state;
    assert_eq!(runtime.state().route, Route::UserList);
    assert_eq!(um.last_created.as_ref().map(|u| u.id.as_str()), Some("7"));
}

#[tokio::test]
async fn unprocessable_entity_maps_to_field_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": {
                "email": ["has already been taken"],
                "name": "is reserved"
            }
        })))
        .mount(&server)
        .await;

    let state = State::new(Arc::new(adapter(&server)), QueryCache::new(Duration::from_secs(60)));
    let mut runtime = Runtime::new(state);
    runtime.dispatch(Message::CreateUser);
    for (field, value) in [
        (Field::Name, "admin"),
        (Field::Email, "ada@example.com"),
        (Field::Password, "abcdef"),
        (Field::PasswordConfirmation, "abcdef"),
    ] {
        runtime.dispatch(Message::CreateUserFormUpdate(field, value.to_string()));
    }
    runtime.dispatch(Message::CreateUserFormSubmit);
    runtime.run_until_idle().await;

    let form = runtime
        .state()
        .domains
        .user_management
        .state
        .create_form
        .as_ref()
        .expect("form stays open");
    assert_eq!(form.status(), SubmissionStatus::Failed);
    assert_eq!(
        form.errors().kind(Field::Email),
        Some(&ValidationErrorKind::Server(
            "E-mail has already been taken".to_string()
        ))
    );
    assert_eq!(
        form.error(Field::Name).map(|e| e.message()),
        Some("Name is reserved".to_string())
    );
}

#[tokio::test]
async fn server_errors_are_opaque_status_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let request = dashgo_model::prelude::CreateUserRequest::new(dashgo_model::NewUser {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        password: Zeroizing::new("abcdef".to_string()),
        password_confirmation: Zeroizing::new("abcdef".to_string()),
        created_at: chrono::Utc::now(),
    });
    let err = adapter(&server).create_user(request).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Status { status, ref body } if status.as_u16() == 500 && body == "boom"
    ));
}

#[tokio::test]
async fn bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api/", server.uri()), Duration::from_secs(5))
        .unwrap()
        .with_token(Some("s3cret".to_string()));
    assert!(client.has_token().await);

    let page = UserAdminApiAdapter::new(Arc::new(client))
        .list_users(PageRequest::default())
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.last_page(), 1);
}
