//! End-to-end session flows over real HTTP against a mock API server.

use std::sync::Arc;

use authkeep_core::api::{ApiRequest, HttpTransport};
use authkeep_core::store::MemoryTokenStore;
use authkeep_core::{
    AuthError, AuthGateway, Config, Endpoints, Messages, SessionController, SessionState,
    TokenBackend, TokenKey, TokenStore, Transport,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_body() -> serde_json::Value {
    json!({
        "access": "acc-1",
        "refresh": "ref-1",
        "token_type": "bearer",
        "exp": "2099-01-01T00:15:00Z",
        "issued_at": "2099-01-01T00:00:00Z",
        "token_id": "tid-1",
        "user": {"id": 42, "email": "user@example.com", "role": "user", "can_login": true}
    })
}

fn me_body() -> serde_json::Value {
    json!({
        "id": 42,
        "email": "user@example.com",
        "role": "user",
        "can_login": true,
        "is_active": true,
        "registered_at": "2024-05-01T10:00:00",
        "locked_until": null,
        "failed_login_attempts": 0
    })
}

fn session(server: &MockServer, store: Arc<MemoryTokenStore>) -> SessionController {
    let transport = HttpTransport::new(&server.uri()).expect("Failed to build transport");
    let gateway = AuthGateway::authorized(
        Arc::new(transport),
        store,
        Endpoints::default(),
        Messages::default(),
    );
    SessionController::new(gateway)
}

fn stored_session() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_tokens(&[
        (TokenKey::Access, "stored-acc"),
        (TokenKey::Refresh, "stored-ref"),
        (TokenKey::Csrf, "stored-csrf"),
    ]))
}

fn assert_cleared(store: &MemoryTokenStore) {
    for key in TokenKey::ALL {
        assert_eq!(store.get(key).unwrap(), None, "{} should be cleared", key);
    }
}

#[tokio::test]
async fn test_login_sends_normalized_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "user@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session(&server, store.clone());

    let user = session.login(" USER@Example.com ", " secret ").await.unwrap();

    assert_eq!(user.id, 42);
    assert!(session.is_authenticated());
    assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("acc-1"));
    assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("ref-1"));
}

#[tokio::test]
async fn test_login_rejected_shows_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Неверный email или пароль"})),
        )
        .mount(&server)
        .await;

    let session = session(&server, Arc::new(MemoryTokenStore::new()));

    let err = session.login("user@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.to_string(), "Неверный email или пароль");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_initialize_without_token_makes_no_requests() {
    let server = MockServer::start().await;
    let session = session(&server, Arc::new(MemoryTokenStore::new()));

    assert_eq!(session.initialize().await, SessionState::Unauthenticated);

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_initialize_restores_stored_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header("authorization", "Bearer stored-acc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
        .expect(1)
        .mount(&server)
        .await;

    let session = session(&server, stored_session());

    let state = session.initialize().await;

    assert!(matches!(state, SessionState::Authenticated(ref u) if u.email == "user@example.com"));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_initialize_with_rejected_token_clears_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = stored_session();
    let session = session(&server, store.clone());

    assert_eq!(session.initialize().await, SessionState::Unauthenticated);
    assert_cleared(&store);
}

#[tokio::test]
async fn test_concurrent_initialize_issues_one_identity_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(me_body())
                .set_delay(std::time::Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = session(&server, stored_session());

    let (a, b, c) = tokio::join!(session.initialize(), session.initialize(), session.initialize());

    assert_eq!(a, b);
    assert_eq!(b, c);
    assert!(matches!(a, SessionState::Authenticated(_)));
}

#[tokio::test]
async fn test_register_mismatch_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let session = session(&server, Arc::new(MemoryTokenStore::new()));

    let err = session.register("a@b.com", "p1", "p2").await.unwrap_err();

    assert!(matches!(err, AuthError::PasswordMismatch { .. }));
}

#[tokio::test]
async fn test_register_success_keeps_session_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(body_json(json!({"email": "a@b.com", "password": "p1", "password_confirm": "p1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            json!({"id": 5, "email": "a@b.com", "role": "user", "can_login": true}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session(&server, store.clone());
    session.initialize().await;

    let user = session.register("A@B.com", "p1", "p1").await.unwrap();

    assert_eq!(user.id, 5);
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert!(!store.has_access_token());
}

#[tokio::test]
async fn test_any_unauthorized_response_ends_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/reports"))
        .and(header("authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session(&server, store.clone());
    session.login("user@example.com", "secret").await.unwrap();
    assert!(session.is_authenticated());

    // An application request unrelated to auth, routed through the authorizer
    let response = session
        .gateway()
        .transport()
        .send(ApiRequest::get("/api/v1/reports"))
        .await
        .unwrap();

    assert_eq!(response.status, 401);
    assert!(!session.is_authenticated());
    assert_eq!(store.get(TokenKey::Access).unwrap(), None);
    assert_eq!(store.get(TokenKey::Refresh).unwrap(), None);
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "stored-ref"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "acc-2",
            "refresh": "ref-2",
            "token_type": "bearer",
            "exp": "2099-01-01T00:30:00Z",
            "issued_at": "2099-01-01T00:15:00Z",
            "token_id": "tid-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = stored_session();
    let session = session(&server, store.clone());

    let tokens = session.refresh().await.unwrap();

    assert_eq!(tokens.token_id, "tid-2");
    assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("acc-2"));
    assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("ref-2"));
}

#[tokio::test]
async fn test_logout_clears_all_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
        .mount(&server)
        .await;

    let store = stored_session();
    let session = session(&server, store.clone());
    session.initialize().await;

    session.logout().await.unwrap();

    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert_cleared(&store);
}

#[tokio::test]
async fn test_unreachable_api_uses_fallback_message() {
    // Nothing listens on port 9 on a test host
    let transport = HttpTransport::new("http://127.0.0.1:9").unwrap();
    let gateway = AuthGateway::authorized(
        Arc::new(transport),
        Arc::new(MemoryTokenStore::new()),
        Endpoints::default(),
        Messages::default(),
    );
    let session = SessionController::new(gateway);

    let err = session.login("user@example.com", "secret").await.unwrap_err();

    assert_eq!(err.to_string(), "Could not sign in");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_from_config_wires_the_stack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        api_base_url: server.uri(),
        token_backend: TokenBackend::Memory,
        ..Config::default()
    };
    let session = SessionController::from_config(&config).unwrap();

    session.login("user@example.com", "secret").await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.access_token().as_deref(), Some("acc-1"));
}
