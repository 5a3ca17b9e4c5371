use crate::handlers::{listings, sync};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "gateway" }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/listings", get(listings::list_active))
        .route("/listings/mark-sold", post(sync::mark_sold))
        .route("/listings/:artwork_id", get(listings::by_artwork))
        .route("/listings/:artwork_id/verify", get(listings::verify))
        .route("/listings/:artwork_id/cleanup", post(listings::cleanup))
        .route("/sync/listing", post(sync::sync_listing))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
