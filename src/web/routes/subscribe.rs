use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    provider::SubscriptionContext,
    web::{guard, Error, Result},
    AppState,
};

/// Anything but a POST just sends the visitor back to the site.
/// With no redirect url and no referers there is no site to go back to.
pub async fn redirect_home(State(app_state): State<AppState>) -> Result<impl IntoResponse> {
    let location = app_state
        .relay_config
        .redirect_url()
        .ok_or(Error::ServiceUnavailable)?
        .to_string();

    Ok((StatusCode::FOUND, [(LOCATION, location)]))
}

#[tracing::instrument(name = "Relaying subscription", skip_all)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: core::result::Result<Bytes, BytesRejection>,
) -> Result<Json<Value>> {
    let provider_client = app_state
        .provider_client
        .as_ref()
        .ok_or(Error::ServiceUnavailable)?;
    let relay_config = &app_state.relay_config;

    guard::check_request(&headers, relay_config)?;
    let body = body?;

    let ctx = SubscriptionContext {
        client_ip: guard::header_str(&headers, &relay_config.client_ip_header),
    };
    let payload = provider_client.shape_payload(&body, &ctx)?;

    let response = provider_client.post_subscription(payload).await?;

    translate_provider_status(response.status)
}

/// 200 and 201 mean subscribed, every other status is passed back as is with a generic message.
pub fn translate_provider_status(status: StatusCode) -> Result<Json<Value>> {
    match status {
        StatusCode::OK | StatusCode::CREATED => {
            info!("{:<12} - subscribed", "SUCCESS");
            Ok(Json(json!({ "status": "subscribed" })))
        }
        other => Err(Error::SubscriptionFailed(other)),
    }
}
