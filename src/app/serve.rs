use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::{
    web::{midware, routes::routes, REQUEST_ID_HEADER},
    App, AppState, Result,
};

/// The core async function returning a future that will serve this application.
///
/// Accepts an `App` and sets up a TraceLayer that provides console logging.
///
/// Current implementation might return an IO error from `axum::serve`
pub async fn serve(app: App) -> Result<()> {
    let App {
        app_state,
        listener,
    } = app;

    axum::serve(listener, build_router(app_state)).await?;

    Ok(())
}

/// The full router with every middleware layer, without binding anything.
pub fn build_router(app_state: AppState) -> Router {
    let x_request_id: HeaderName = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace_layer = build_trace_layer();

    Router::new().merge(routes(app_state)).layer(
        ServiceBuilder::new()
            // Set UUID per request
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            .layer(trace_layer)
            // Responses travel the stack bottom up, so the propagation layer below runs first
            // and the mapper already sees the request id header.
            .layer(middleware::map_response(midware::response_mapper))
            // Propagate UUID to response, keep it last so it processes the response first!
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// Per-request span keyed by the request id, plus one line when the response goes out.
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_request(|req: &Request<Body>, _span: &Span| {
            tracing::debug!(uri = %req.uri(), "relay request started")
        })
        .on_response(log_response)
}

fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "relay",
        request_id,
        method = %req.method(),
        path = req.uri().path()
    )
}

fn log_response(res: &Response<Body>, latency: Duration, _span: &Span) {
    let status = res.status().as_u16();
    let latency_ms = latency.as_millis() as u64;

    match status {
        500.. => tracing::error!(status, latency_ms, "relay request failed"),
        400..=499 => tracing::warn!(status, latency_ms, "relay request rejected"),
        _ => tracing::info!(status, latency_ms, "relay request done"),
    }
}
