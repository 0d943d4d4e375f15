mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let app = common::TestApp::new();

    let res = app.send(Method::GET, "/projects", None, None).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthorized() -> Result<()> {
    let app = common::TestApp::new();
    let claims = brew_projects::auth::Claims::for_owner(Uuid::new_v4(), 1);
    let forged = brew_projects::auth::generate_jwt(&claims, "some-other-secret")?;

    let res = app.send(Method::GET, "/projects", Some(&forged), None).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_without_subject_is_rejected_before_any_store_access() -> Result<()> {
    let app = common::TestApp::new();
    let token = common::token_with_sub(None);
    // A store access would surface as a resource failure instead
    app.repo.set_offline(true);

    let res = app
        .send(Method::POST, "/projects", Some(&token), Some(json!({ "name": "Demo" })))
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_IDENTITY");
    Ok(())
}

#[tokio::test]
async fn malformed_subject_is_rejected() -> Result<()> {
    let app = common::TestApp::new();
    let token = common::token_with_sub(Some("not-a-uuid".to_string()));

    let res = app.send(Method::GET, "/projects", Some(&token), None).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_IDENTITY");
    assert!(res.body["message"].as_str().unwrap_or_default().contains("not-a-uuid"));
    Ok(())
}
