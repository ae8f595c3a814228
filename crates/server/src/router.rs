//! HTTP routes.
//!
//! Three public routes, mirroring what marketplaces call:
//!
//! - `GET /{token_id}` — metadata JSON
//! - `GET /image/{token_id}` — PNG image
//! - `GET /health` — liveness probe
//!
//! Both artifact routes run through the same cache path; error mapping is
//! uniform: not-minted is the requester's problem (404), an unreachable
//! chain is temporary (503), everything else is a 500.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chanclas_core::{artifact::ArtifactCache, types::TokenId};
use serde_json::json;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared request state.
pub struct AppState {
    pub cache: ArtifactCache,
}

/// Builds the service router with tracing and a concurrency ceiling.
pub fn build_router(state: Arc<AppState>, max_concurrent_requests: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/:token_id", get(metadata))
        .route("/image/:token_id", get(image))
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn metadata(
    State(state): State<Arc<AppState>>,
    Path(token_id): Path<TokenId>,
) -> Response {
    match state.cache.get_or_generate(token_id).await {
        Ok(artifact) => Json(artifact.metadata.clone()).into_response(),
        Err(e) => error_response(token_id, &e),
    }
}

async fn image(State(state): State<Arc<AppState>>, Path(token_id): Path<TokenId>) -> Response {
    match state.cache.get_or_generate(token_id).await {
        Ok(artifact) => {
            ([(header::CONTENT_TYPE, "image/png")], artifact.image.clone()).into_response()
        }
        Err(e) => error_response(token_id, &e),
    }
}

fn error_response(token_id: TokenId, error: &chanclas_core::artifact::ArtifactError) -> Response {
    let status = if error.is_not_minted() {
        StatusCode::NOT_FOUND
    } else if error.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        tracing::error!(token_id, error = %error, "artifact request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
