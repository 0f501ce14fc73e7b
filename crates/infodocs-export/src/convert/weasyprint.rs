use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::backend::{BackendError, PdfBackend, PdfJob};
use super::process;
use crate::styles::FontConfiguration;

pub const ENV_VAR: &str = "INFODOCS_WEASYPRINT_BIN";

/// Rich-CSS renderer backed by the `weasyprint` executable.
pub struct WeasyPrint {
    program: PathBuf,
    version: String,
    fonts_dir: Option<PathBuf>,
    fonts: OnceLock<FontConfiguration>,
}

impl WeasyPrint {
    /// Locate and check the executable.
    pub fn detect(fonts_dir: Option<&Path>) -> Option<Self> {
        let program = process::locate(ENV_VAR, "weasyprint")?;
        let version = process::detect_version(&program, "--version")?;
        Some(Self {
            program,
            version,
            fonts_dir: fonts_dir.map(Path::to_path_buf),
            fonts: OnceLock::new(),
        })
    }

    /// Built on first use, then shared by every later render.
    fn fonts(&self) -> &FontConfiguration {
        self.fonts
            .get_or_init(|| FontConfiguration::load(self.fonts_dir.as_deref()))
    }
}

impl PdfBackend for WeasyPrint {
    fn name(&self) -> &'static str {
        "weasyprint"
    }

    fn version(&self) -> Option<&str> {
        Some(&self.version)
    }

    fn render_pdf(&self, html: &str, job: &PdfJob<'_>) -> Result<Vec<u8>, BackendError> {
        let mut stylesheet = tempfile::Builder::new()
            .prefix("infodocs-")
            .suffix(".css")
            .tempfile()?;
        stylesheet.write_all(self.fonts().css.as_bytes())?;
        stylesheet.write_all(job.stylesheet.as_bytes())?;
        stylesheet.flush()?;

        let mut args: Vec<OsString> = vec![
            "--encoding".into(),
            "utf-8".into(),
            "--stylesheet".into(),
            stylesheet.path().as_os_str().to_owned(),
        ];
        if let Some(base_url) = job.base_url {
            args.push("--base-url".into());
            args.push(base_url.into());
        }
        // Read the document from stdin, write the PDF to stdout.
        args.push("-".into());
        args.push("-".into());

        let pdf = process::run(&self.program, &args, Some(html.as_bytes()))?;
        if pdf.is_empty() {
            return Err(BackendError::EmptyOutput);
        }
        Ok(pdf)
    }
}
