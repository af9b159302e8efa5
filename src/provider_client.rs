use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use secrecy::SecretString;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::{
    config::RelayConfig,
    provider::{self, SubscriptionContext, SubscriptionProvider},
};

const JSON_UTF8: &str = "application/json; charset=UTF-8";
const JSON: &str = "application/json";

/// What the provider answered. Only the status decides the outcome, the body is for the logs.
#[derive(Debug)]
pub struct ProviderResponse {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Debug)]
pub struct ProviderClient {
    pub http_client: Client,
    pub url: reqwest::Url,
    provider: Box<dyn SubscriptionProvider>,
    api_key: SecretString,
    permits: Semaphore,
}

impl ProviderClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        provider: Box<dyn SubscriptionProvider>,
        api_key: SecretString,
        timeout: std::time::Duration,
        max_concurrent: usize,
    ) -> Result<Self> {
        let url =
            reqwest::Url::parse(url.as_ref()).map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::ClientInit)?;

        Ok(ProviderClient {
            http_client,
            url,
            provider,
            api_key,
            permits: Semaphore::new(max_concurrent.max(1)),
        })
    }

    /// Builds the client for the configured provider.
    /// The config has to be valid, see `RelayConfig::is_valid`.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let provider = config.provider.build(config)?;
        let api_key = config.api_key.clone().ok_or(Error::MissingApiKey)?;
        let url = config
            .provider_url
            .as_deref()
            .unwrap_or_else(|| config.provider.default_url());

        Self::new(
            url,
            provider,
            api_key,
            config.timeout(),
            config.concurrency_limit(),
        )
    }

    pub fn shape_payload(
        &self,
        body: &[u8],
        ctx: &SubscriptionContext<'_>,
    ) -> provider::Result<Vec<u8>> {
        self.provider.shape_payload(body, ctx)
    }

    /// Sends the payload to the provider exactly once.
    /// Non-success statuses are *not* an error here, they are returned for the caller to translate.
    #[tracing::instrument(name = "Posting subscription to provider", skip_all)]
    pub async fn post_subscription(&self, payload: Vec<u8>) -> Result<ProviderResponse> {
        debug!(
            "{:<12} - {}: {}",
            "PAYLOAD",
            self.provider.kind().as_ref(),
            String::from_utf8_lossy(&payload)
        );

        let _permit = self.permits.acquire().await?;

        let request = self
            .http_client
            .post(self.url.clone())
            .headers(self.headers()?)
            .body(payload)
            .build()
            .map_err(Error::RequestBuild)?;

        let response = self.http_client.execute(request).await.map_err(|e| {
            error!("{:<12} - calling provider failed: {e}", "TRANSPORT");
            Error::Transport(e)
        })?;

        let status = response.status();
        info!("{:<12} - {status}", "RESP STATUS");
        debug!("{:<12} - {:?}", "RESP HEADERS", response.headers());
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
        debug!("{:<12} - {body}", "RESP BODY");

        Ok(ProviderResponse { status, body })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut authorization = HeaderValue::from_str(&self.provider.authorization(&self.api_key))
            .map_err(|_| Error::InvalidApiKey)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        headers.insert(AUTHORIZATION, authorization);

        Ok(headers)
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, strum_macros::AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("failed to parse the provider url: {0}")]
    UrlParsing(String),
    #[error("no api key configured")]
    MissingApiKey,
    #[error("api key can not be used as a header value")]
    InvalidApiKey,
    #[error("failed to build the http client: {0}")]
    ClientInit(reqwest::Error),
    #[error("failed to build the provider request: {0}")]
    RequestBuild(reqwest::Error),
    #[error("provider request failed: {0}")]
    Transport(reqwest::Error),

    #[error("provider error: {0}")]
    Provider(#[from] provider::Error),
    #[error("outbound request limiter closed: {0}")]
    Limiter(#[from] tokio::sync::AcquireError),
}
