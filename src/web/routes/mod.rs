//! Contains all the routes that this application can handle.

mod health;
mod subscribe;

use axum::{
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::AppState;
use health::healthz;
use subscribe::{redirect_home, subscribe};

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", post(subscribe).fallback(redirect_home))
        // The subscribe form is posted from another origin.
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .route("/healthz", get(healthz))
        .with_state(app_state)
}
