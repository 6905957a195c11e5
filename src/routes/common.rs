//! Operational routes: health, readiness, version.
//!
//! Version goes through the same envelope as every entity endpoint, so a
//! client probing the service sees the shape (and encryption mode) it will
//! get everywhere else. Health and readiness stay bare JSON for load
//! balancers that know nothing about the envelope.

use crate::envelope::{encode_response, Envelope};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    if sqlx::query("SELECT 1").fetch_optional(&state.pool).await.is_err() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: Some("ok"),
    }))
}

async fn version(State(state): State<AppState>) -> (StatusCode, Json<Envelope>) {
    let entities: Vec<&str> = state.registry.specs().map(|s| s.canonical).collect();
    let info = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "entities": entities,
        "encrypted_payloads": state.codec.is_active(),
    });
    encode_response(&state.codec, StatusCode::OK, "version", info)
}

/// GET /health, GET /ready (DB check), GET /version (enveloped).
pub fn common_routes_with_ready(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
