mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use tradejournal_api::database::UserStore;

#[tokio::test]
async fn health_and_root_respond() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = app.send(Method::GET, "/", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn sign_up_returns_token_pair_and_hides_hash() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(json!({
                "email": "Trader@Example.com",
                "username": "trader",
                "password": "correct-horse-battery"
            })),
        )
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert!(data["expires_at"].is_string());
    assert_eq!(data["user"]["email"], "trader@example.com");
    assert!(data["user"].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_conflict_and_creates_nothing() -> Result<()> {
    let app = TestApp::new();
    app.sign_up("dup@example.com", "first").await?;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(json!({
                "email": "dup@example.com",
                "username": "second",
                "password": "correct-horse-battery"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "user with this email or username already exists");

    let stored = app.stores.users.find_by_email("dup@example.com").await?;
    assert_eq!(stored.map(|u| u.username), Some("first".to_string()));
    Ok(())
}

#[tokio::test]
async fn sign_in_accepts_only_the_right_password() -> Result<()> {
    let app = TestApp::new();
    app.sign_up("login@example.com", "login").await?;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            Some(json!({ "email": "LOGIN@example.com", "password": "correct-horse-battery" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access_token"].is_string());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            Some(json!({ "email": "login@example.com", "password": "wrong-password" })),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid email or password");
    Ok(())
}

#[tokio::test]
async fn malformed_sign_up_is_rejected_with_field() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(json!({ "email": "a@example.com", "username": "ab", "password": "correct-horse" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["username"].is_string());

    let (status, body) = app
        .send(Method::POST, "/api/v1/auth/sign-up", None, Some(json!({ "email": 7 })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn refresh_issues_a_working_access_token() -> Result<()> {
    let app = TestApp::new();
    let (_, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(json!({
                "email": "refresh@example.com",
                "username": "refresher",
                "password": "correct-horse-battery"
            })),
        )
        .await?;
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap_or_default().to_string();
    let access_token = body["data"]["access_token"].as_str().unwrap_or_default().to_string();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    let new_access = body["data"]["access_token"].as_str().unwrap_or_default().to_string();

    let (status, _) = app.send(Method::GET, "/api/v1/journals", Some(&new_access), None).await?;
    assert_eq!(status, StatusCode::OK);

    // refresh tokens are not bearer tokens and access tokens do not refresh
    let (status, _) = app.send(Method::GET, "/api/v1/journals", Some(&refresh_token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": access_token })),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/v1/journals", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app
        .send(Method::GET, "/api/v1/journals", Some("not.a.token"), None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
