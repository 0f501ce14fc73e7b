//! Document backend converter.
//!
//! Backends are detected once at start-up. PDF rendering uses the rich-CSS
//! renderer when present and the legacy one otherwise; the choice is made
//! by availability only and a failing backend is never retried with the
//! other one. Images are always produced by rendering a PDF and rasterising
//! its first page.

pub mod backend;
pub mod poppler;
pub mod process;
pub mod weasyprint;
pub mod wkhtmltopdf;

use std::sync::Arc;

use serde::Serialize;

use crate::error::ExportError;
use crate::settings::{RasterOptions, RenderSettings};

use self::backend::{BackendError, PdfBackend, PdfJob, RasterBackend};

/// The backends available to this process. Built once, then shared
/// read-only by every render.
#[derive(Clone, Default)]
pub struct Capabilities {
    rich: Option<Arc<dyn PdfBackend>>,
    legacy: Option<Arc<dyn PdfBackend>>,
    raster: Option<Arc<dyn RasterBackend>>,
}

impl Capabilities {
    /// Detect the installed executables.
    pub fn detect(settings: &RenderSettings) -> Self {
        let capabilities = Self {
            rich: weasyprint::WeasyPrint::detect(settings.fonts_dir.as_deref())
                .map(|b| Arc::new(b) as Arc<dyn PdfBackend>),
            legacy: wkhtmltopdf::Wkhtmltopdf::detect().map(|b| Arc::new(b) as Arc<dyn PdfBackend>),
            raster: poppler::Pdftoppm::detect().map(|b| Arc::new(b) as Arc<dyn RasterBackend>),
        };
        capabilities.log();
        capabilities
    }

    /// No backends at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_rich(mut self, backend: Arc<dyn PdfBackend>) -> Self {
        self.rich = Some(backend);
        self
    }

    pub fn with_legacy(mut self, backend: Arc<dyn PdfBackend>) -> Self {
        self.legacy = Some(backend);
        self
    }

    pub fn with_raster(mut self, backend: Arc<dyn RasterBackend>) -> Self {
        self.raster = Some(backend);
        self
    }

    /// The PDF backend every render uses, if any.
    pub fn pdf_backend(&self) -> Option<&Arc<dyn PdfBackend>> {
        self.rich.as_ref().or(self.legacy.as_ref())
    }

    pub fn raster_backend(&self) -> Option<&Arc<dyn RasterBackend>> {
        self.raster.as_ref()
    }

    pub fn summary(&self) -> CapabilitySummary {
        let pdf_status = |backend: Option<&Arc<dyn PdfBackend>>| BackendStatus {
            name: backend.map(|b| b.name().to_string()),
            available: backend.is_some(),
            version: backend.and_then(|b| b.version()).map(str::to_string),
        };
        let recommended = self.pdf_backend().map(|b| b.name().to_string());

        CapabilitySummary {
            rich: pdf_status(self.rich.as_ref()),
            legacy: pdf_status(self.legacy.as_ref()),
            raster: BackendStatus {
                name: self.raster.as_ref().map(|b| b.name().to_string()),
                available: self.raster.is_some(),
                version: self
                    .raster
                    .as_ref()
                    .and_then(|b| b.version())
                    .map(str::to_string),
            },
            status: if recommended.is_some() {
                Readiness::Ready
            } else {
                Readiness::NoLibrary
            },
            recommended,
        }
    }

    fn log(&self) {
        let summary = self.summary();
        for (role, status) in [
            ("rich", &summary.rich),
            ("legacy", &summary.legacy),
            ("raster", &summary.raster),
        ] {
            if status.available {
                tracing::info!(
                    role,
                    backend = status.name.as_deref().unwrap_or_default(),
                    version = status.version.as_deref().unwrap_or_default(),
                    "document backend available"
                );
            } else {
                tracing::warn!(role, "document backend unavailable");
            }
        }
        match &summary.recommended {
            Some(backend) => tracing::info!(backend = %backend, "PDF generation ready"),
            None => tracing::error!("no PDF backend available; PDF and image output disabled"),
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("rich", &self.rich.as_ref().map(|b| b.name()))
            .field("legacy", &self.legacy.as_ref().map(|b| b.name()))
            .field("raster", &self.raster.as_ref().map(|b| b.name()))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub name: Option<String>,
    pub available: bool,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NoLibrary,
}

/// Serialisable report of the detected backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilitySummary {
    pub rich: BackendStatus,
    pub legacy: BackendStatus,
    pub raster: BackendStatus,
    pub recommended: Option<String>,
    pub status: Readiness,
}

/// Converts rendered HTML into PDF and raster bytes.
#[derive(Debug, Clone)]
pub struct Converter {
    capabilities: Capabilities,
    stylesheet: String,
    base_url: Option<String>,
    page_size: String,
    margin: String,
}

impl Converter {
    pub fn new(capabilities: Capabilities, stylesheet: String) -> Self {
        Self {
            capabilities,
            stylesheet,
            base_url: None,
            page_size: "A4".to_string(),
            margin: "0".to_string(),
        }
    }

    /// Base URL handed to backends for resolving relative references.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Page size and margin for backends that do not read `@page` rules.
    pub fn with_page(mut self, page_size: impl Into<String>, margin: impl Into<String>) -> Self {
        self.page_size = page_size.into();
        self.margin = margin.into();
        self
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn to_pdf(&self, html: &str) -> Result<Vec<u8>, ExportError> {
        let backend = self
            .capabilities
            .pdf_backend()
            .ok_or_else(|| ExportError::Configuration("no PDF backend available".to_string()))?;

        let job = PdfJob {
            stylesheet: &self.stylesheet,
            base_url: self.base_url.as_deref(),
            page_size: &self.page_size,
            margin: &self.margin,
        };
        let pdf = backend
            .render_pdf(html, &job)
            .map_err(|e| render_error(backend.name(), e))?;

        tracing::info!(backend = backend.name(), bytes = pdf.len(), "PDF rendered");
        Ok(pdf)
    }

    /// HTML to image, through a PDF render.
    pub fn to_image(&self, html: &str, options: &RasterOptions) -> Result<Vec<u8>, ExportError> {
        // Fail before rendering a PDF nobody can rasterise.
        self.raster_backend()?;
        let pdf = self.to_pdf(html)?;
        self.pdf_to_image(&pdf, options)
    }

    /// Rasterise the first page of an existing PDF.
    pub fn pdf_to_image(&self, pdf: &[u8], options: &RasterOptions) -> Result<Vec<u8>, ExportError> {
        let backend = self.raster_backend()?;
        let image = backend
            .rasterize(pdf, options)
            .map_err(|e| render_error(backend.name(), e))?;

        tracing::info!(
            backend = backend.name(),
            dpi = options.dpi,
            bytes = image.len(),
            "image rendered"
        );
        Ok(image)
    }

    fn raster_backend(&self) -> Result<&Arc<dyn RasterBackend>, ExportError> {
        self.capabilities.raster_backend().ok_or_else(|| {
            ExportError::Configuration("no PDF to image converter available".to_string())
        })
    }
}

fn render_error(backend: &str, error: BackendError) -> ExportError {
    tracing::error!(backend, error = %error, "document backend failed");
    ExportError::Render {
        backend: backend.to_string(),
        message: error.to_string(),
    }
}
