use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Uri},
    response::Response,
};
use serde_json::json;

use crate::web::{log, Error, REQUEST_ID_HEADER};

/// Turns a stashed `web::Error` into the client facing `{"error": ...}` body.
/// Headers set further in (request id, CORS) are kept.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    let request_id = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();

    let web_error = resp.extensions().get::<Arc<Error>>().cloned();
    let client_status_and_error = web_error
        .as_deref()
        .map(Error::status_code_and_client_error);

    let status = client_status_and_error
        .as_ref()
        .map(|(status, _)| *status)
        .unwrap_or(resp.status());

    log::log_request(
        &request_id,
        &req_method,
        &uri,
        status,
        web_error.as_deref(),
        client_status_and_error.as_ref().map(|(_, ce)| *ce),
    );

    let Some((status, client_error)) = client_status_and_error else {
        return resp;
    };

    let client_error_body = json!({ "error": client_error.to_string() });

    let (mut parts, _body) = resp.into_parts();
    parts.status = status;
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(client_error_body.to_string()))
}
