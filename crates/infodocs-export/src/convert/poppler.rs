use std::ffi::OsStr;
use std::path::PathBuf;

use super::backend::{BackendError, RasterBackend};
use super::process;
use crate::settings::{RasterFormat, RasterOptions};

pub const ENV_VAR: &str = "INFODOCS_PDFTOPPM_BIN";

/// PDF to raster converter backed by poppler's `pdftoppm`.
pub struct Pdftoppm {
    program: PathBuf,
    version: String,
}

impl Pdftoppm {
    pub fn detect() -> Option<Self> {
        let program = process::locate(ENV_VAR, "pdftoppm")?;
        let version = process::detect_version(&program, "-v")?;
        Some(Self { program, version })
    }
}

impl RasterBackend for Pdftoppm {
    fn name(&self) -> &'static str {
        "pdftoppm"
    }

    fn version(&self) -> Option<&str> {
        Some(&self.version)
    }

    fn rasterize(&self, pdf: &[u8], options: &RasterOptions) -> Result<Vec<u8>, BackendError> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("input.pdf");
        std::fs::write(&input, pdf)?;

        let (flag, ext) = match options.format {
            RasterFormat::Png => ("-png", "png"),
            RasterFormat::Jpeg => ("-jpeg", "jpg"),
        };
        let prefix = workdir.path().join("page");
        let dpi = options.dpi.to_string();
        let args = [
            OsStr::new(flag),
            OsStr::new("-r"),
            OsStr::new(&dpi),
            OsStr::new("-f"),
            OsStr::new("1"),
            OsStr::new("-l"),
            OsStr::new("1"),
            OsStr::new("-singlefile"),
            input.as_os_str(),
            prefix.as_os_str(),
        ];
        process::run(&self.program, args, None)?;

        let image = std::fs::read(prefix.with_extension(ext))?;
        if image.is_empty() {
            return Err(BackendError::EmptyOutput);
        }
        Ok(image)
    }
}
