//! HTTP read endpoint over the conditions cache.

use std::collections::BTreeMap;

use axum::{extract::State, response::Json, routing::get, Router};
use common::ConditionsEntry;
use conditions::ConditionsCache;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const CONDITIONS_PATH: &str = "/current-conditions";

pub fn create_router(cache: ConditionsCache) -> Router {
    Router::new()
        .route(CONDITIONS_PATH, get(current_conditions))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(cache)
}

/// Whole cache as-is. Always 200, even when every park is a fallback entry.
async fn current_conditions(
    State(cache): State<ConditionsCache>,
) -> Json<BTreeMap<String, ConditionsEntry>> {
    Json(cache.snapshot())
}
