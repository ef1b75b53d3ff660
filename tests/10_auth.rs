mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{send, test_app};

#[tokio::test]
async fn root_and_health_respond() -> Result<()> {
    let t = test_app();

    let (status, body) = send(&t.app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "MindSync API");
    assert_eq!(body["status"], "running");

    let (status, body) = send(&t.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn signup_without_elevated_key_defers_confirmation() -> Result<()> {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "a@x.com", "password": "p1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_null());
    assert!(body["message"].as_str().unwrap().contains("verify"));
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["email_confirmed"], false);
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_is_rejected_regardless_of_password() -> Result<()> {
    let t = test_app();

    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "dup@x.com", "password": "p1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "dup@x.com", "password": "different" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("already registered"), "got: {message}");
    assert!(message.contains("login"), "got: {message}");
    Ok(())
}

#[tokio::test]
async fn login_returns_session_and_identity() -> Result<()> {
    let t = test_app();

    send(
        &t.app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "b@x.com", "password": "secret" })),
    )
    .await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "b@x.com", "password": "secret" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(body["access_token"].is_string());
    assert_eq!(body["user"]["email"], "b@x.com");
    Ok(())
}

#[tokio::test]
async fn wrong_password_login_is_unauthorized() -> Result<()> {
    let t = test_app();

    send(
        &t.app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "c@x.com", "password": "right" })),
    )
    .await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "c@x.com", "password": "wrong" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid email or password"));
    Ok(())
}

#[tokio::test]
async fn unknown_account_login_suggests_signup() -> Result<()> {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ghost@x.com", "password": "p" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].as_str().unwrap().contains("sign up"));
    Ok(())
}

#[tokio::test]
async fn me_returns_identity_bound_to_token() -> Result<()> {
    let t = test_app();
    let token = t.identity.issue("u-42", "me@x.com");

    let (status, body) = send(&t.app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], "u-42");
    assert_eq!(body["user"]["email"], "me@x.com");
    Ok(())
}

#[tokio::test]
async fn me_without_header_is_not_authenticated() -> Result<()> {
    let t = test_app();

    let (status, body) = send(&t.app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authenticated");
    Ok(())
}

#[tokio::test]
async fn me_with_unresolvable_token_is_invalid() -> Result<()> {
    let t = test_app();

    let (status, body) = send(&t.app, Method::GET, "/api/auth/me", Some("nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
    Ok(())
}
