//! Retention API handlers.

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use mp4trim_core::SweepStats;

use crate::state::AppState;

/// POST /api/v1/retention/sweep
///
/// Runs one sweep immediately and reports what it did.
pub async fn sweep(State(state): State<Arc<AppState>>) -> Json<SweepStats> {
    let stats = state.sweep().await;
    info!(
        processed = stats.processed,
        deleted = stats.deleted,
        "Manual retention sweep"
    );
    Json(stats)
}
