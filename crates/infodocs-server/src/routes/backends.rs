use axum::Json;
use axum::extract::State;
use infodocs_export::convert::CapabilitySummary;

use crate::state::AppState;

/// Which PDF and raster backends this process found at start-up.
pub async fn backend_status(State(state): State<AppState>) -> Json<CapabilitySummary> {
    Json(state.renderer.converter().capabilities().summary())
}
