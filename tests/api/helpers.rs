//! Shared setup for the integration tests: spawns the app on a random port and points it at
//! a `wiremock` server standing in for the newsletter provider.
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::OnceLock,
};

use anyhow::Result;
use reqwest::{redirect, Response};
use secrecy::SecretString;
use serde_json::Value;
use subrelay::{
    config::{AppConfig, NetConfig, RelayConfig},
    init_dbg_tracing, App,
};
use wiremock::MockServer;

pub const PROVIDER_PATH: &str = "/api/subscribers";
pub const ALLOWED_REFERER: &str = "https://example.com/";
pub const TEST_GROUP: &str = "424242";
pub const CLIENT_IP: &str = "203.0.113.9";

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub provider_server: MockServer,
}

const TEST_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_dbg_tracing();
        }
    });
}

/// A complete MailerLite config pointing at `provider_uri`.
pub fn valid_relay_config(provider_uri: &str) -> RelayConfig {
    RelayConfig {
        api_key: Some(SecretString::from("test-api-key")),
        group: Some(TEST_GROUP.to_string()),
        referers: vec![ALLOWED_REFERER.to_string()],
        host: Some("subscribe.example.com".to_string()),
        redirect_url: Some("https://example.com/home".to_string()),
        provider_url: Some(format!("{provider_uri}{PROVIDER_PATH}")),
        timeout_millis: 500,
        ..Default::default()
    }
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the app after letting the caller tweak the relay config.
    pub async fn spawn_with<F>(configure: F) -> Result<Self>
    where
        F: FnOnce(&mut RelayConfig),
    {
        init_test_subscriber();

        let provider_server = MockServer::start().await;
        let mut relay_config = valid_relay_config(&provider_server.uri());
        configure(&mut relay_config);

        let config = AppConfig {
            net_config: NetConfig {
                bind_addr: TEST_IP,
                // Trying to bind port 0 will trigger an OS scan for an available port
                // which will then be bound to the application.
                app_port: 0,
            },
            relay_config,
        };

        let app = App::build_from_config(config).await?;
        let addr = app.local_addr()?;
        tokio::spawn(subrelay::serve(app));

        let http_client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(TestApp {
            addr,
            http_client,
            provider_server,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// POST / the way the proxied front-end would: TLS flag on, allowed referer, client ip set.
    pub async fn post_subscribe(&self, body: &Value) -> Result<Response> {
        self.post_subscribe_with_headers(
            body.to_string(),
            &[
                ("x-forwarded-ssl", "on"),
                ("referer", ALLOWED_REFERER),
                ("fly-client-ip", CLIENT_IP),
            ],
        )
        .await
    }

    pub async fn post_subscribe_with_headers(
        &self,
        body: String,
        headers: &[(&str, &str)],
    ) -> Result<Response> {
        let mut req = self
            .http_client
            .post(self.url("/"))
            .header("Content-Type", "application/json")
            .body(body);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        Ok(req.send().await?)
    }

    pub async fn get_healthz(&self) -> Result<Response> {
        Ok(self.http_client.get(self.url("/healthz")).send().await?)
    }
}

/// Asserts the status code and the `{"error": ...}` body of a relay response.
pub async fn assert_json_error(resp: Response, status: u16, message: &str) -> Result<()> {
    assert_eq!(status, resp.status().as_u16(), "unexpected status code");
    assert_eq!(
        "application/json",
        resp.headers()["content-type"],
        "error body should be json"
    );
    let body: Value = resp.json().await?;
    assert_eq!(serde_json::json!({ "error": message }), body);
    Ok(())
}
