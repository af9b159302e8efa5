use axum::{extract::State, http::StatusCode};

use crate::AppState;

/// 200 "all good", or 500 and a "missing <field>" line for each required field that isn't set.
pub async fn healthz(State(app_state): State<AppState>) -> (StatusCode, String) {
    let missing = app_state.relay_config.missing_fields();

    if missing.is_empty() {
        return (StatusCode::OK, "all good".to_string());
    }

    let body: String = missing
        .iter()
        .map(|field| format!("missing {}\n", field.as_ref()))
        .collect();

    (StatusCode::INTERNAL_SERVER_ERROR, body)
}
