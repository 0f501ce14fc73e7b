use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use jiff::Timestamp;
use jiff::tz::TimeZone;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use infodocs_core::keys;
use infodocs_core::models::artifact::ArtifactFormat;
use infodocs_core::models::category::Category;
use infodocs_core::models::document::{DocumentDetails, DocumentInstance};
use infodocs_core::models::organization::{Authoritative, Organization};
use infodocs_export::pipeline::RenderJob;
use infodocs_storage::error::StorageError;
use infodocs_storage::records;

use super::blocking;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CertificateRequest {
    pub template_id: Uuid,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub certificate_data: Map<String, Value>,
    /// Existing document the render belongs to. Generation creates one when
    /// absent.
    #[serde(default)]
    pub document_id: Option<Uuid>,
}

/// Render HTML for the browser.
pub async fn preview(
    State(state): State<AppState>,
    Json(req): Json<CertificateRequest>,
) -> Result<Html<String>, ApiError> {
    let outcome = blocking(move || {
        let job = build_job(&state, req, Timestamp::now())?;
        Ok(state.renderer.render_preview(&job)?)
    })
    .await?;
    Ok(Html(outcome.html))
}

/// Render a PDF for download without storing anything but materialized
/// images.
pub async fn pdf(
    State(state): State<AppState>,
    Json(req): Json<CertificateRequest>,
) -> Result<Response, ApiError> {
    let job = blocking({
        let state = state.clone();
        move || build_job(&state, req, Timestamp::now())
    })
    .await?;
    let target_id = job.target_id;
    let outcome = state.renderer.render_final_blocking(job, false).await?;
    Ok(attachment(ArtifactFormat::Pdf, target_id, outcome.pdf))
}

/// Render the first page of the PDF as an image.
pub async fn image(
    State(state): State<AppState>,
    Json(req): Json<CertificateRequest>,
) -> Result<Response, ApiError> {
    let job = blocking({
        let state = state.clone();
        move || build_job(&state, req, Timestamp::now())
    })
    .await?;
    let target_id = job.target_id;
    let outcome = state.renderer.render_final_blocking(job, true).await?;
    let image = outcome
        .image
        .ok_or_else(|| ApiError::Internal("render returned no image".to_string()))?;
    let format = state.renderer.settings().raster.format.artifact();
    Ok(attachment(format, target_id, image))
}

/// Create a document: store the record first, then render and attach the
/// PDF. A failed render leaves the stored record without a PDF.
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<CertificateRequest>,
) -> Result<(StatusCode, Json<DocumentInstance>), ApiError> {
    let (instance, job) = blocking({
        let state = state.clone();
        move || create_record(&state, req, Timestamp::now())
    })
    .await?;
    let id = instance.id;

    let instance = match state.renderer.render_final_blocking(job, false).await {
        Ok(outcome) => {
            let state = state.clone();
            blocking(move || {
                let mut instance = instance;
                for asset in &outcome.materialized {
                    if instance.record_asset(&asset.field, &asset.path) {
                        tracing::debug!(
                            document_id = %id,
                            field = %asset.field,
                            path = %asset.path,
                            "asset path recorded"
                        );
                    }
                }
                let path =
                    state.store.save_artifact(&outcome.pdf, id, ArtifactFormat::Pdf.extension())?;
                instance.attach_pdf(path);
                records::save_record(&state.records_dir, &keys::document(id), &instance)?;
                tracing::info!(
                    document_id = %id,
                    warnings = outcome.warnings.len(),
                    "document PDF attached"
                );
                Ok(instance)
            })
            .await?
        }
        Err(e) => {
            tracing::error!(document_id = %id, error = %e, "document saved without PDF");
            instance
        }
    };

    Ok((StatusCode::CREATED, Json(instance)))
}

/// First phase of generation: validate and store the record, and build the
/// job that renders it.
fn create_record(
    state: &AppState,
    req: CertificateRequest,
    generated_at: Timestamp,
) -> Result<(DocumentInstance, RenderJob), ApiError> {
    let template = state.renderer.templates().get(req.template_id)?;
    let id = req.document_id.unwrap_or_else(Uuid::new_v4);

    let instance = DocumentInstance::new(
        id,
        &template,
        req.certificate_data.clone(),
        req.organization_id,
        None,
        "",
        generated_at,
    )?;
    let organization = load_organization(state, template.category, instance.organization_id)?;
    records::save_record(&state.records_dir, &keys::document(id), &instance)?;
    tracing::info!(
        document_id = %id,
        template_id = %template.id,
        category = %template.category,
        "document record saved"
    );

    let job = RenderJob {
        authoritative: Authoritative {
            date: Some(format_date(generated_at)),
            display_name: non_empty(instance.details.display_name()),
            organization,
        },
        template,
        data: req.certificate_data,
        target_id: id,
    };
    Ok((instance, job))
}

fn build_job(
    state: &AppState,
    req: CertificateRequest,
    generated_at: Timestamp,
) -> Result<RenderJob, ApiError> {
    let template = state.renderer.templates().get(req.template_id)?;
    let category = template.category;
    let organization = load_organization(state, category, req.organization_id)?;

    let details = DocumentDetails::from_data(category, &req.certificate_data, "");
    let target_id = req.document_id.unwrap_or(template.id);

    Ok(RenderJob {
        authoritative: Authoritative {
            date: Some(format_date(generated_at)),
            display_name: non_empty(details.display_name()),
            organization,
        },
        template,
        data: req.certificate_data,
        target_id,
    })
}

/// The organization is always read from its record; a `spa` block in the
/// payload is never used for identity or address fields.
fn load_organization(
    state: &AppState,
    category: Category,
    organization_id: Option<Uuid>,
) -> Result<Option<Organization>, ApiError> {
    let Some(id) = organization_id.filter(|_| category.requires_organization()) else {
        return Ok(None);
    };
    match records::load_record(&state.records_dir, &keys::organization(id)) {
        Ok(organization) => Ok(Some(organization)),
        Err(StorageError::NotFound { .. }) => {
            Err(ApiError::NotFound(format!("organization not found: {id}")))
        }
        Err(e) => Err(e.into()),
    }
}

fn format_date(at: Timestamp) -> String {
    at.to_zoned(TimeZone::system()).strftime("%d/%m/%Y").to_string()
}

fn non_empty(name: Option<&str>) -> Option<String> {
    name.filter(|n| !n.trim().is_empty()).map(str::to_string)
}

fn attachment(format: ArtifactFormat, document_id: Uuid, body: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename={}", format.filename(document_id));
    (
        [
            (header::CONTENT_TYPE, format.media_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
