//! Auth backend tests
//!
//! Register/login/logout against a mocked backend, error message
//! selection, token propagation and session persistence through the
//! auth view-model.

use mockito::{Matcher, Server};
use nitflex::api::auth::{LOGIN_FAILED, REGISTER_FAILED};
use nitflex::api::{AuthClient, AuthError, TokenPropagator};
use nitflex::models::{LoginRequest, RegisterRequest, Resource};
use nitflex::store::PrefsStore;
use nitflex::viewmodel::AuthViewModel;

fn ann() -> RegisterRequest {
    RegisterRequest {
        name: "Ann".to_string(),
        email: "ann@x.com".to_string(),
        password: "p1".to_string(),
        password_confirmation: "p1".to_string(),
    }
}

fn ann_login() -> LoginRequest {
    LoginRequest {
        email: "ann@x.com".to_string(),
        password: "p1".to_string(),
    }
}

// =============================================================================
// Auth Client Tests
// =============================================================================

#[tokio::test]
async fn test_register_success() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/api/register")
        .match_header("accept", "application/json")
        .match_body(Matcher::PartialJsonString(
            r#"{"name": "Ann", "email": "ann@x.com", "password": "p1", "password_confirmation": "p1"}"#
                .to_string(),
        ))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token": "abc", "user": {"name": "Ann"}}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    let client = AuthClient::new(server.url(), &prefs);
    let response = client.register(&ann()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.token.as_deref(), Some("abc"));
    assert_eq!(response.user.unwrap().name, "Ann");
}

#[tokio::test]
async fn test_login_422_uses_email_errors() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/api/login")
        .with_status(422)
        .with_body(r#"{"message": "failed", "errors": {"email": ["invalid"]}}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    let client = AuthClient::new(server.url(), &prefs);
    let err = client.login(&ann_login()).await.unwrap_err();

    assert_eq!(
        err,
        AuthError::Rejected {
            status: 422,
            message: "invalid".to_string()
        }
    );
    assert_eq!(err.to_string(), "invalid");
}

#[tokio::test]
async fn test_login_uses_body_message() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/api/login")
        .with_status(401)
        .with_body(r#"{"message": "Invalid credentials"}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    let client = AuthClient::new(server.url(), &prefs);
    let err = client.login(&ann_login()).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn test_fallback_messages() {
    let mut server = Server::new_async().await;

    let _login = server
        .mock("POST", "/api/login")
        .with_status(500)
        .with_body("<html>oops</html>")
        .create_async()
        .await;
    let _register = server
        .mock("POST", "/api/register")
        .with_status(422)
        .with_body(r#"{"errors": {"password": ["too short"]}}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    let client = AuthClient::new(server.url(), &prefs);

    let err = client.login(&ann_login()).await.unwrap_err();
    assert_eq!(err.to_string(), LOGIN_FAILED);

    // 422 without email errors and without a message
    let err = client.register(&ann()).await.unwrap_err();
    assert_eq!(err.to_string(), REGISTER_FAILED);
}

#[tokio::test]
async fn test_unreachable_backend() {
    let prefs = PrefsStore::in_memory();
    let client = AuthClient::new("http://127.0.0.1:9", &prefs);

    let err = client.login(&ann_login()).await.unwrap_err();
    assert_eq!(err, AuthError::Connection);
    assert_eq!(
        err.to_string(),
        "Couldn't reach server. Check your internet connection."
    );
}

#[tokio::test]
async fn test_logout_sends_bearer_token() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/api/logout")
        .match_header("authorization", "Bearer abc")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(r#"{"message": "Logged out"}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    prefs.save_auth_token("abc").await.unwrap();
    let client = AuthClient::new(server.url(), &prefs);
    client.logout().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_login_never_carries_token() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/api/login")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"token": "new", "user": {"name": "Ann"}}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    prefs.save_auth_token("stale").await.unwrap();
    let client = AuthClient::new(server.url(), &prefs);
    client.login(&ann_login()).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_logout_sends_token_when_base_host_differs_in_case() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/api/logout")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"message": "Logged out"}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    prefs.save_auth_token("tok").await.unwrap();
    let base = server.url().replace("127.0.0.1", "LOCALHOST");
    let client = AuthClient::new(base, &prefs);
    client.logout().await.unwrap();

    mock.assert_async().await;
}

// =============================================================================
// Token Propagator Tests
// =============================================================================

fn request(url: &str) -> reqwest::Request {
    reqwest::Client::new().get(url).build().unwrap()
}

#[tokio::test]
async fn test_propagator_attaches_token_to_backend_paths() {
    let prefs = PrefsStore::in_memory();
    prefs.save_auth_token("tok-1").await.unwrap();
    let propagator = TokenPropagator::new("http://backend.test:8000", prefs.subscribe());

    let decorated = propagator.decorate(request("http://backend.test:8000/api/profile"));
    assert_eq!(
        decorated.headers().get("authorization").unwrap(),
        "Bearer tok-1"
    );
    assert_eq!(
        decorated.headers().get("accept").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_propagator_matches_normalized_origin() {
    let prefs = PrefsStore::in_memory();
    prefs.save_auth_token("tok-1").await.unwrap();

    for (base, url) in [
        ("http://Backend.Test:8000", "http://backend.test:8000/api/profile"),
        ("https://backend.test:443", "https://backend.test/api/logout"),
        ("http://backend.test:80/", "http://backend.test/api/watchlist"),
    ] {
        let propagator = TokenPropagator::new(base, prefs.subscribe());
        let decorated = propagator.decorate(request(url));
        assert_eq!(
            decorated.headers().get("authorization").map(|v| v.to_str().unwrap()),
            Some("Bearer tok-1"),
            "{} under {} should carry the token",
            url,
            base
        );
    }

    // Login stays bare under a differently spelled base too
    let propagator = TokenPropagator::new("https://BACKEND.test:443", prefs.subscribe());
    let decorated = propagator.decorate(request("https://backend.test/api/login"));
    assert!(decorated.headers().get("authorization").is_none());
}

#[tokio::test]
async fn test_propagator_skips_auth_paths_and_other_hosts() {
    let prefs = PrefsStore::in_memory();
    prefs.save_auth_token("tok-1").await.unwrap();
    let propagator = TokenPropagator::new("http://backend.test:8000/", prefs.subscribe());

    for url in [
        "http://backend.test:8000/api/login",
        "http://backend.test:8000/api/register",
        "http://backend.test:8000/api/login?next=home",
        "https://api.themoviedb.org/3/movie/popular",
    ] {
        let decorated = propagator.decorate(request(url));
        assert!(
            decorated.headers().get("authorization").is_none(),
            "{} should not carry a token",
            url
        );
    }
}

#[tokio::test]
async fn test_propagator_without_token_forwards_unmodified() {
    let prefs = PrefsStore::in_memory();
    let propagator = TokenPropagator::new("http://backend.test:8000", prefs.subscribe());

    let decorated = propagator.decorate(request("http://backend.test:8000/api/logout"));
    assert!(decorated.headers().get("authorization").is_none());
}

#[tokio::test]
async fn test_propagator_sees_token_updates() {
    let prefs = PrefsStore::in_memory();
    let propagator = TokenPropagator::new("http://backend.test:8000", prefs.subscribe());

    prefs.save_auth_token("later").await.unwrap();
    let decorated = propagator.decorate(request("http://backend.test:8000/api/logout"));
    assert_eq!(
        decorated.headers().get("authorization").unwrap(),
        "Bearer later"
    );

    prefs.clear_auth().await.unwrap();
    let decorated = propagator.decorate(request("http://backend.test:8000/api/logout"));
    assert!(decorated.headers().get("authorization").is_none());
}

// =============================================================================
// Session Flow (view-model)
// =============================================================================

#[tokio::test]
async fn test_register_persists_session() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/register")
        .with_status(201)
        .with_body(r#"{"token": "abc", "user": {"name": "Ann"}}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    let vm = AuthViewModel::new(AuthClient::new(server.url(), &prefs), prefs.clone());
    let state_rx = vm.registration_state();
    assert_eq!(*state_rx.borrow(), Resource::Initial);

    let state = vm.register(ann()).await;

    assert!(state.is_success());
    assert_eq!(*state_rx.borrow(), state);
    assert_eq!(prefs.auth_token().as_deref(), Some("abc"));
    assert_eq!(prefs.user_name().as_deref(), Some("Ann"));
    assert!(vm.is_signed_in());
}

#[tokio::test]
async fn test_failed_login_keeps_signed_out() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/login")
        .with_status(422)
        .with_body(r#"{"message": "failed", "errors": {"email": ["invalid"]}}"#)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    let vm = AuthViewModel::new(AuthClient::new(server.url(), &prefs), prefs.clone());

    let state = vm.login(ann_login()).await;

    assert_eq!(state, Resource::Error("invalid".to_string()));
    assert_eq!(*vm.login_state().borrow(), state);
    assert!(prefs.auth_token().is_none());
}

#[tokio::test]
async fn test_login_then_logout() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/api/login")
        .with_status(200)
        .with_body(r#"{"token": "tok-9", "user": {"id": 3, "name": "Ann", "email": "ann@x.com"}}"#)
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/api/logout")
        .match_header("authorization", "Bearer tok-9")
        .with_status(200)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    let vm = AuthViewModel::new(AuthClient::new(server.url(), &prefs), prefs.clone());

    assert!(vm.login(ann_login()).await.is_success());
    assert_eq!(vm.auth_token().as_deref(), Some("tok-9"));

    vm.logout().await.unwrap();

    logout.assert_async().await;
    assert!(vm.auth_token().is_none());
    assert!(vm.user_name().is_none());
    assert_eq!(*vm.login_state().borrow(), Resource::Initial);
    assert_eq!(*vm.registration_state().borrow(), Resource::Initial);
}

#[tokio::test]
async fn test_logout_clears_session_when_backend_fails() {
    let mut server = Server::new_async().await;
    let _logout = server
        .mock("POST", "/api/logout")
        .with_status(500)
        .create_async()
        .await;

    let prefs = PrefsStore::in_memory();
    prefs.save_session("tok", Some("Ann".to_string())).await.unwrap();
    let vm = AuthViewModel::new(AuthClient::new(server.url(), &prefs), prefs.clone());

    vm.logout().await.unwrap();
    assert!(prefs.auth_token().is_none());
    assert!(prefs.user_name().is_none());
}
