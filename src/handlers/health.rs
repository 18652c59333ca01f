// src/handlers/health.rs

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{config::AppState, middleware::i18n::Locale, models::envelope::HealthResponse};

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Servidor no ar", body = HealthResponse)
    )
)]
pub async fn health_check(State(app_state): State<AppState>, locale: Locale) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: app_state.i18n_store.translate(&locale.0, "message.server_running"),
        timestamp: Utc::now(),
    })
}
