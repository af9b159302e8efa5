//! Tests whether the 'healthz' route reports the configuration state

use anyhow::Result;
use reqwest::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn healthz_ok() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get_healthz().await?;

    assert_eq!(StatusCode::OK, res.status(), "Healthcheck FAILED!");
    assert_eq!("all good", res.text().await?);

    Ok(())
}

#[tokio::test]
async fn healthz_lists_each_missing_field() -> Result<()> {
    let cases = [
        (
            TestApp::spawn_with(|config| {
                config.api_key = None;
                config.group = None;
            })
            .await?,
            "missing apikey\nmissing group\n",
        ),
        (
            TestApp::spawn_with(|config| config.referers.clear()).await?,
            "missing referer\n",
        ),
        (
            TestApp::spawn_with(|config| {
                config.api_key = None;
                config.group = None;
                config.referers.clear();
                config.host = None;
            })
            .await?,
            "missing apikey\nmissing group\nmissing referer\nmissing host\n",
        ),
    ];

    for (app, expected_body) in cases {
        let res = app.get_healthz().await?;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
        assert_eq!(expected_body, res.text().await?);
    }

    Ok(())
}

#[tokio::test]
async fn healthz_reports_non_numeric_mailerlite_group() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.group = Some("news".to_string())).await?;

    let res = app.get_healthz().await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert_eq!("missing group\n", res.text().await?);

    Ok(())
}

#[tokio::test]
async fn invalid_path_404() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.http_client.get(app.url("/invalidpath")).send().await?;

    assert!(
        res.status() == StatusCode::NOT_FOUND,
        "Invalid Path check FAILED!, expected: {}, got: {}",
        404,
        res.status().as_u16()
    );

    Ok(())
}
