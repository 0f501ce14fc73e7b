use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use infodocs_core::models::template::Template;

use super::blocking;
use crate::error::ApiError;
use crate::state::AppState;

/// Active public templates, sorted by name.
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<Template>>, ApiError> {
    let templates = blocking(move || Ok(state.renderer.templates().public()?)).await?;
    Ok(Json(templates.as_ref().clone()))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Template>, ApiError> {
    let template = blocking(move || Ok(state.renderer.templates().get(id)?)).await?;
    Ok(Json(template.as_ref().clone()))
}

/// Called by the template editor after it rewrites a template record.
pub async fn invalidate_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    state.renderer.templates().invalidate(Some(id));
    StatusCode::NO_CONTENT
}

pub async fn invalidate_all(State(state): State<AppState>) -> StatusCode {
    state.renderer.templates().invalidate_all();
    StatusCode::NO_CONTENT
}
