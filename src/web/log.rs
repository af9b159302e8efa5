use axum::http::{Method, StatusCode, Uri};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::error::ClientError;
use crate::web::Error;

/// Emits one structured line per request once the response is final.
pub fn log_request(
    request_id: &str,
    req_method: &Method,
    uri: &Uri,
    status_code: StatusCode,
    web_error: Option<&Error>,
    client_error: Option<ClientError>,
) {
    let logline = LogLine {
        timestamp: chrono::Utc::now().to_rfc3339(),
        request_id,
        req_method: req_method.as_str(),
        uri: uri.to_string(),
        status_code: status_code.as_u16(),
        client_error_type: client_error.as_ref().map(|ce| ce.as_ref()),
        web_error_type: web_error.map(|we| we.as_ref()),
        web_error_data: web_error.map(|we| we.to_string()),
    };

    if web_error.is_some() {
        warn!("LOGLINE: {}", json!(logline));
    } else {
        info!("LOGLINE: {}", json!(logline));
    }
}

#[derive(Serialize)]
struct LogLine<'a> {
    timestamp: String,
    request_id: &'a str,

    req_method: &'a str,
    uri: String,
    status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    client_error_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_error_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_error_data: Option<String>,
}
