use std::path::PathBuf;

use thiserror::Error;

use crate::settings::RasterOptions;

/// Failure of a single backend invocation.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("exited with status {status:?}: {stderr}")]
    Exit { status: Option<i32>, stderr: String },

    #[error("produced no output")]
    EmptyOutput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-render inputs shared by every PDF backend.
#[derive(Debug, Clone, Copy)]
pub struct PdfJob<'a> {
    /// Print stylesheet (page size, margins, colour hints).
    pub stylesheet: &'a str,
    /// Base for resolving relative URLs in the document.
    pub base_url: Option<&'a str>,
    /// CSS page size, for backends that take it as an option.
    pub page_size: &'a str,
    /// CSS margin shorthand, for backends that take it as an option.
    pub margin: &'a str,
}

/// An HTML to PDF renderer.
pub trait PdfBackend: Send + Sync {
    /// Short stable name used in logs, errors and the capability summary.
    fn name(&self) -> &'static str;

    /// Version reported when the backend was detected.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Render a complete HTML document into PDF bytes.
    fn render_pdf(&self, html: &str, job: &PdfJob<'_>) -> Result<Vec<u8>, BackendError>;
}

/// A PDF to raster image converter. Only the first page is rasterised.
pub trait RasterBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn version(&self) -> Option<&str> {
        None
    }

    fn rasterize(&self, pdf: &[u8], options: &RasterOptions) -> Result<Vec<u8>, BackendError>;
}
