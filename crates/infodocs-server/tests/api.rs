use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use infodocs_core::keys;
use infodocs_core::models::category::Category;
use infodocs_core::models::document::{DocumentDetails, DocumentInstance};
use infodocs_core::models::organization::Organization;
use infodocs_core::models::template::{Template, TemplateKind};
use infodocs_export::convert::Capabilities;
use infodocs_export::convert::backend::{BackendError, PdfBackend, PdfJob};
use infodocs_server::config::ServerConfig;
use infodocs_server::state::AppState;
use infodocs_storage::records;
use serde_json::{Map, Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

struct EchoPdf;

impl PdfBackend for EchoPdf {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn render_pdf(&self, html: &str, _job: &PdfJob<'_>) -> Result<Vec<u8>, BackendError> {
        Ok(html.as_bytes().to_vec())
    }
}

struct BrokenPdf;

impl PdfBackend for BrokenPdf {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn render_pdf(&self, _html: &str, _job: &PdfJob<'_>) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::EmptyOutput)
    }
}

const SOURCE: &str = "<p>{{spa.name}}: {{candidate_name}}, {{designation}}</p>";

struct Fixture {
    dir: TempDir,
    config: ServerConfig,
    template_id: Uuid,
    organization_id: Uuid,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.records_dir = dir.path().join("records");
        config.render.asset_roots.primary.dir = dir.path().join("media");
        config.render.asset_roots.legacy.dir = dir.path().join("uploads");
        config.render.static_dir = dir.path().join("static");

        let template = Template {
            id: Uuid::new_v4(),
            name: "ID card".into(),
            category: Category::IdCard,
            kind: TemplateKind::Html,
            variant: None,
            html_source: Some(SOURCE.into()),
            image: None,
            config: Map::new(),
            is_active: true,
            is_public: true,
            created_at: jiff::Timestamp::UNIX_EPOCH,
            updated_at: jiff::Timestamp::UNIX_EPOCH,
        };
        records::save_record(&config.records_dir, &keys::template(template.id), &template)
            .unwrap();

        let organization = Organization {
            id: Uuid::new_v4(),
            name: "Lotus Spa".into(),
            city: "Pune".into(),
            ..Default::default()
        };
        records::save_record(
            &config.records_dir,
            &keys::organization(organization.id),
            &organization,
        )
        .unwrap();

        Self {
            dir,
            config,
            template_id: template.id,
            organization_id: organization.id,
        }
    }

    fn app(&self, capabilities: Capabilities) -> Router {
        let state = AppState::new(&self.config, capabilities);
        infodocs_server::app(state, &self.config.render)
    }

    fn request(&self, organization: bool) -> Value {
        let mut body = json!({
            "template_id": self.template_id,
            "certificate_data": {
                "candidate_name": "Asha",
                "candidate_photo": "data:image/png;base64,cG5n",
                "designation": "Therapist",
                "date_of_joining": "01/04/2023",
                "contact_number": "98200 00000",
                "spa": { "name": "Spoofed" },
            },
        });
        if organization {
            body["organization_id"] = json!(self.organization_id);
        }
        body
    }
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec(), disposition)
}

#[tokio::test]
async fn health_and_backend_status() {
    let fx = Fixture::new();

    let (status, body, _) = send(fx.app(Capabilities::none()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "ok");

    let (status, body, _) = send(fx.app(Capabilities::none()), "GET", "/backends", None).await;
    assert_eq!(status, StatusCode::OK);
    let summary: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary["status"], "no_library");
    assert_eq!(summary["recommended"], Value::Null);
}

#[tokio::test]
async fn preview_uses_the_stored_organization() {
    let fx = Fixture::new();
    let (status, body, _) = send(
        fx.app(Capabilities::none()),
        "POST",
        "/certificates/preview",
        Some(fx.request(true)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert_eq!(html, "<p>Lotus Spa: Asha, Therapist</p>");
}

#[tokio::test]
async fn unknown_template_or_organization_is_not_found() {
    let fx = Fixture::new();

    let mut body = fx.request(false);
    body["template_id"] = json!(Uuid::new_v4());
    let (status, _, _) = send(fx.app(Capabilities::none()), "POST", "/certificates/preview", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut body = fx.request(false);
    body["organization_id"] = json!(Uuid::new_v4());
    let (status, _, _) = send(fx.app(Capabilities::none()), "POST", "/certificates/preview", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pdf_without_backends_is_unavailable() {
    let fx = Fixture::new();
    let (status, body, _) = send(
        fx.app(Capabilities::none()),
        "POST",
        "/certificates/pdf",
        Some(fx.request(true)),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("no PDF backend"));
}

#[tokio::test]
async fn pdf_is_returned_as_an_attachment() {
    let fx = Fixture::new();
    let document_id = Uuid::new_v4();
    let mut body = fx.request(true);
    body["document_id"] = json!(document_id);

    let (status, bytes, disposition) = send(
        fx.app(Capabilities::none().with_rich(Arc::new(EchoPdf))),
        "POST",
        "/certificates/pdf",
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"<p>Lotus Spa: Asha, Therapist</p>");
    assert_eq!(
        disposition.as_deref(),
        Some(format!("attachment; filename=certificate_{document_id}.pdf").as_str())
    );
}

#[tokio::test]
async fn image_without_raster_backend_is_unavailable() {
    let fx = Fixture::new();
    let (status, _, _) = send(
        fx.app(Capabilities::none().with_rich(Arc::new(EchoPdf))),
        "POST",
        "/certificates/image",
        Some(fx.request(true)),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn generate_stores_the_record_and_attaches_the_pdf() {
    let fx = Fixture::new();
    let (status, body, _) = send(
        fx.app(Capabilities::none().with_rich(Arc::new(EchoPdf))),
        "POST",
        "/certificates/generate",
        Some(fx.request(true)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let instance: DocumentInstance = serde_json::from_slice(&body).unwrap();
    let pdf_path = format!("certificates/certificate_{}.pdf", instance.id);
    assert_eq!(instance.certificate_pdf.as_deref(), Some(pdf_path.as_str()));
    assert_eq!(instance.organization_id, Some(fx.organization_id));
    assert_eq!(instance.display_name(), "Asha");

    let stored: DocumentInstance =
        records::load_record(&fx.config.records_dir, &keys::document(instance.id)).unwrap();
    assert_eq!(stored.certificate_pdf, instance.certificate_pdf);
    let pdf = std::fs::read(fx.dir.path().join("media").join(&pdf_path)).unwrap();
    assert_eq!(pdf, b"<p>Lotus Spa: Asha, Therapist</p>");
}

#[tokio::test]
async fn generate_records_stored_paths_instead_of_embedded_images() {
    let fx = Fixture::new();
    let (status, body, _) = send(
        fx.app(Capabilities::none().with_rich(Arc::new(EchoPdf))),
        "POST",
        "/certificates/generate",
        Some(fx.request(true)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let instance: DocumentInstance = serde_json::from_slice(&body).unwrap();

    let stored: DocumentInstance =
        records::load_record(&fx.config.records_dir, &keys::document(instance.id)).unwrap();
    let photo = stored.certificate_data["candidate_photo"].as_str().unwrap().to_string();
    assert!(photo.starts_with("certificates/cert_"), "{photo}");
    assert_eq!(std::fs::read(fx.dir.path().join("media").join(&photo)).unwrap(), b"png");
    match &stored.details {
        DocumentDetails::IdCard(d) => assert_eq!(d.candidate_photo.as_deref(), Some(photo.as_str())),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[tokio::test]
async fn generate_rejects_blank_required_fields() {
    let fx = Fixture::new();
    let mut body = fx.request(true);
    body["certificate_data"]["contact_number"] = json!("");
    let (status, body, _) = send(
        fx.app(Capabilities::none().with_rich(Arc::new(EchoPdf))),
        "POST",
        "/certificates/generate",
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("contact_number"));
    assert!(!fx.config.records_dir.join("documents").exists());
}

#[tokio::test]
async fn generate_keeps_the_record_when_rendering_fails() {
    let fx = Fixture::new();
    let (status, body, _) = send(
        fx.app(Capabilities::none().with_rich(Arc::new(BrokenPdf))),
        "POST",
        "/certificates/generate",
        Some(fx.request(true)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let instance: DocumentInstance = serde_json::from_slice(&body).unwrap();
    assert!(instance.certificate_pdf.is_none());

    let stored: DocumentInstance =
        records::load_record(&fx.config.records_dir, &keys::document(instance.id)).unwrap();
    assert_eq!(stored.id, instance.id);
    assert!(stored.certificate_pdf.is_none());
}

#[tokio::test]
async fn generate_requires_an_organization() {
    let fx = Fixture::new();
    let (status, body, _) = send(
        fx.app(Capabilities::none().with_rich(Arc::new(EchoPdf))),
        "POST",
        "/certificates/generate",
        Some(fx.request(false)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("id_card"));
}

#[tokio::test]
async fn templates_are_listed_and_invalidated() {
    let fx = Fixture::new();
    let app = fx.app(Capabilities::none());

    let (status, body, _) = send(app.clone(), "GET", "/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    let list: Vec<Template> = serde_json::from_slice(&body).unwrap();
    assert_eq!(list.len(), 1);

    let uri = format!("/templates/{}", fx.template_id);
    let (status, body, _) = send(app.clone(), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let template: Template = serde_json::from_slice(&body).unwrap();
    assert_eq!(template.name, "ID card");

    let mut renamed = template.clone();
    renamed.name = "Staff card".into();
    records::save_record(&fx.config.records_dir, &keys::template(renamed.id), &renamed).unwrap();

    let (status, _, _) = send(app.clone(), "POST", &format!("{uri}/invalidate"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body, _) = send(app, "GET", &uri, None).await;
    let template: Template = serde_json::from_slice(&body).unwrap();
    assert_eq!(template.name, "Staff card");
}

#[tokio::test]
async fn stored_assets_are_served_under_their_mount() {
    let fx = Fixture::new();
    let logo = fx.dir.path().join("media/spa_logos/lotus.png");
    std::fs::create_dir_all(logo.parent().unwrap()).unwrap();
    std::fs::write(&logo, b"png").unwrap();

    let (status, body, _) = send(
        fx.app(Capabilities::none()),
        "GET",
        "/media/spa_logos/lotus.png",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"png");
}
