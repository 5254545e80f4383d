use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use mp4trim_core::storage::StorageArea;

use super::{clips, handlers, middleware::metrics_middleware, retention};
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the video itself.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config()
        .upload
        .max_bytes
        .saturating_add(FORM_OVERHEAD_BYTES)
        .try_into()
        .unwrap_or(usize::MAX);

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Clips
        .route(
            "/clips",
            post(clips::create_clip).layer(DefaultBodyLimit::max(body_limit)),
        )
        // Retention
        .route("/retention/sweep", post(retention::sweep))
        .with_state(Arc::clone(&state));

    // Produced files, served straight from the storage directories
    let layout = state.layout();
    let media = Router::new()
        .nest_service(
            "/uploads",
            ServeDir::new(layout.dir(StorageArea::Uploads)),
        )
        .nest_service("/clips", ServeDir::new(layout.dir(StorageArea::Clips)))
        .nest_service(
            "/thumbnails",
            ServeDir::new(layout.dir(StorageArea::Thumbnails)),
        );

    Router::new()
        .route("/", get(handlers::index))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .nest("/media", media)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
