use std::path::{Path, PathBuf};

use infodocs_core::models::artifact::ArtifactFormat;
use serde::{Deserialize, Serialize};

use crate::styles::PrintStyles;

/// Everything the render pipeline needs to know about its surroundings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Public base URL of the service, used to build preview asset URLs and
    /// to recognise our own URLs in final renders.
    pub base_url: String,
    pub asset_roots: AssetRoots,
    /// Directory of the decorative images shipped with the service.
    pub static_dir: PathBuf,
    pub static_mount: String,
    /// Extra font files made available to the rich-CSS renderer.
    pub fonts_dir: Option<PathBuf>,
    pub raster: RasterOptions,
    pub styles: PrintStyles,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            asset_roots: AssetRoots::default(),
            static_dir: PathBuf::from("static"),
            static_mount: "static".to_string(),
            fonts_dir: None,
            raster: RasterOptions::default(),
            styles: PrintStyles::default(),
        }
    }
}

impl RenderSettings {
    /// Make every directory absolute so `file://` URIs built from them are
    /// valid regardless of the working directory of a backend process.
    pub fn absolutize(&mut self) -> std::io::Result<()> {
        self.asset_roots.primary.dir = std::path::absolute(&self.asset_roots.primary.dir)?;
        self.asset_roots.legacy.dir = std::path::absolute(&self.asset_roots.legacy.dir)?;
        self.static_dir = std::path::absolute(&self.static_dir)?;
        if let Some(fonts) = &self.fonts_dir {
            self.fonts_dir = Some(std::path::absolute(fonts)?);
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// A directory of stored assets and the URL path it is served under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRoot {
    pub dir: PathBuf,
    pub mount: String,
}

impl AssetRoot {
    pub fn new(dir: impl Into<PathBuf>, mount: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            mount: mount.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mount(&self) -> &str {
        self.mount.trim_matches('/')
    }
}

/// Asset roots in probing order. New assets are always written to the
/// primary root; the legacy root holds files saved by earlier deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRoots {
    pub primary: AssetRoot,
    pub legacy: AssetRoot,
}

impl Default for AssetRoots {
    fn default() -> Self {
        Self {
            primary: AssetRoot::new("media", "media"),
            legacy: AssetRoot::new("uploads", "uploads"),
        }
    }
}

impl AssetRoots {
    pub fn in_order(&self) -> [&AssetRoot; 2] {
        [&self.primary, &self.legacy]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn artifact(&self) -> ArtifactFormat {
        match self {
            RasterFormat::Png => ArtifactFormat::Png,
            RasterFormat::Jpeg => ArtifactFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterOptions {
    pub dpi: u32,
    pub format: RasterFormat,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: 150,
            format: RasterFormat::Png,
        }
    }
}
