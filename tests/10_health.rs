mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn root_describes_the_api() -> Result<()> {
    let app = common::TestApp::new();

    let res = app.send(Method::GET, "/", None, None).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Brew Projects API");
    assert!(res.body["endpoints"]["projects"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_reports_both_stores() -> Result<()> {
    let app = common::TestApp::new();

    let res = app.send(Method::GET, "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["database"], "ok");
    assert_eq!(res.body["storage"], "ok");

    app.store.set_offline(true);
    let res = app.send(Method::GET, "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["status"], "degraded");
    assert_eq!(res.body["database"], "ok");
    assert_eq!(res.body["storage"], "unavailable");
    Ok(())
}
