//! The orchestrator: normalize, resolve assets, interpret, convert.

use std::sync::Arc;

use infodocs_core::models::organization::Authoritative;
use infodocs_core::models::render::RenderMode;
use infodocs_core::models::template::{Template, TemplateKind};
use infodocs_storage::assets::AssetStore;
use infodocs_template::value::is_truthy;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::cache::TemplateCache;
use crate::convert::{Capabilities, Converter};
use crate::error::ExportError;
use crate::normalize::normalize;
use crate::resolve::{AssetResolver, AssetWarning, MaterializedAsset};
use crate::settings::RenderSettings;

/// Decorative images filled in from the static directory when the caller
/// supplied none.
pub const STATIC_IMAGES: &[(&str, &str)] = &[
    ("certificate_background_image", "images/certificate-background.png"),
    ("certificate_stamp_image", "images/certificate-stamp.png"),
    ("certificate_signatory_image", "images/certificate-signatory.png"),
    ("default_signature_image", "images/default-signature.png"),
];

/// One render request.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub template: Arc<Template>,
    /// The caller's payload.
    pub data: Map<String, Value>,
    /// Trusted fields, re-read from storage by the caller.
    pub authoritative: Authoritative,
    /// Owner of assets materialized during the render: the document id, or
    /// any id that is stable for repeated renders of the same document.
    pub target_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    pub html: String,
    pub warnings: Vec<AssetWarning>,
}

#[derive(Debug, Clone)]
pub struct FinalOutcome {
    pub pdf: Vec<u8>,
    pub image: Option<Vec<u8>>,
    pub warnings: Vec<AssetWarning>,
    /// Embedded payloads written to the primary root by this render.
    pub materialized: Vec<MaterializedAsset>,
}

/// A context ready for interpretation, with what resolving its assets
/// produced along the way.
#[derive(Debug, Clone)]
pub struct BuiltContext<'j> {
    pub source: &'j str,
    pub context: Value,
    pub warnings: Vec<AssetWarning>,
    pub materialized: Vec<MaterializedAsset>,
}

pub struct Renderer {
    settings: RenderSettings,
    converter: Converter,
    store: Arc<dyn AssetStore>,
    templates: TemplateCache,
}

impl Renderer {
    pub fn new(
        settings: RenderSettings,
        capabilities: Capabilities,
        store: Arc<dyn AssetStore>,
        templates: TemplateCache,
    ) -> Self {
        let converter = Converter::new(capabilities, settings.styles.stylesheet())
            .with_base_url(settings.base_url())
            .with_page(&settings.styles.page_size, &settings.styles.margin);
        Self {
            settings,
            converter,
            store,
            templates,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    /// Build the render context for `job`, paired with the template source
    /// to interpret it against.
    pub fn build_context<'j>(
        &self,
        job: &'j RenderJob,
        mode: RenderMode,
    ) -> Result<BuiltContext<'j>, ExportError> {
        let template = &job.template;
        let source = match (template.kind, template.html()) {
            (TemplateKind::Html, Some(source)) => source,
            (TemplateKind::Html, None) => {
                return Err(ExportError::Content(format!(
                    "template {} has no HTML source",
                    template.id
                )));
            }
            (TemplateKind::Image, _) => {
                return Err(ExportError::Content(format!(
                    "template {} is an image template and cannot be rendered as HTML",
                    template.id
                )));
            }
        };

        let mut context = normalize(template.category, &job.data, &job.authoritative);
        let mut resolver =
            AssetResolver::new(&self.settings, self.store.as_ref(), mode, job.target_id);

        for field in template.category.asset_fields() {
            let reference = match context.get(field) {
                Some(Value::String(reference)) => reference.clone(),
                _ => String::new(),
            };
            let resolved = if reference.trim().is_empty() {
                static_default(&resolver, field).unwrap_or_default()
            } else {
                resolver.resolve(field, &reference)
            };
            context.insert(field.to_string(), Value::String(resolved));
        }

        for (field, _) in STATIC_IMAGES {
            let supplied = context.get(*field).is_some_and(is_truthy);
            if !supplied {
                let address = static_default(&resolver, field).unwrap_or_default();
                context.insert(field.to_string(), Value::String(address));
            }
        }

        // Keep the nested organization block in step with the resolved logo.
        let logo = context.get("spa_logo").cloned().unwrap_or_default();
        if let Some(Value::Object(spa)) = context.get_mut("spa") {
            if spa.contains_key("logo") {
                spa.insert("logo".into(), logo);
            }
        }

        context.insert("static_base_url".into(), Value::String(resolver.static_base()));
        context.insert("mode".into(), Value::String(mode.as_str().to_string()));
        context.insert("config".into(), Value::Object(template.config.clone()));

        let (warnings, materialized) = resolver.into_parts();
        Ok(BuiltContext {
            source,
            context: Value::Object(context),
            warnings,
            materialized,
        })
    }

    /// Render HTML for a browser.
    pub fn render_preview(&self, job: &RenderJob) -> Result<PreviewOutcome, ExportError> {
        let BuiltContext {
            source,
            context,
            warnings,
            ..
        } = self.build_context(job, RenderMode::Preview)?;
        let html = infodocs_template::render(source, &context)?;
        tracing::info!(
            template_id = %job.template.id,
            mode = %RenderMode::Preview,
            bytes = html.len(),
            warnings = warnings.len(),
            "preview rendered"
        );
        Ok(PreviewOutcome { html, warnings })
    }

    /// Render the PDF, and optionally a raster image of its first page.
    /// Blocking: call from a worker thread or through
    /// [`Renderer::render_final_blocking`].
    pub fn render_final(&self, job: &RenderJob, with_image: bool) -> Result<FinalOutcome, ExportError> {
        if with_image && self.converter.capabilities().raster_backend().is_none() {
            return Err(ExportError::Configuration(
                "no PDF to image converter available".to_string(),
            ));
        }
        let BuiltContext {
            source,
            context,
            warnings,
            materialized,
        } = self.build_context(job, RenderMode::Final)?;
        let html = infodocs_template::render(source, &context)?;

        let pdf = self.converter.to_pdf(&html)?;
        let image = if with_image {
            Some(self.converter.pdf_to_image(&pdf, &self.settings.raster)?)
        } else {
            None
        };

        tracing::info!(
            template_id = %job.template.id,
            document_id = %job.target_id,
            mode = %RenderMode::Final,
            bytes = pdf.len(),
            warnings = warnings.len(),
            "final render complete"
        );
        Ok(FinalOutcome {
            pdf,
            image,
            warnings,
            materialized,
        })
    }

    /// [`Renderer::render_final`] on the blocking worker pool, keeping PDF
    /// and image work off the async request threads.
    pub async fn render_final_blocking(
        self: &Arc<Self>,
        job: RenderJob,
        with_image: bool,
    ) -> Result<FinalOutcome, ExportError> {
        let renderer = Arc::clone(self);
        tokio::task::spawn_blocking(move || renderer.render_final(&job, with_image))
            .await
            .map_err(|e| ExportError::Worker(e.to_string()))?
    }
}

fn static_default(resolver: &AssetResolver<'_>, field: &str) -> Option<String> {
    STATIC_IMAGES
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, path)| resolver.static_asset(path))
}
