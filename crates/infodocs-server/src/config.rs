use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use infodocs_export::settings::RenderSettings;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when changing the file's shape.
const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    pub config_version: u32,
    pub bind: SocketAddr,
    /// Directory holding the template, organization and document records.
    pub records_dir: PathBuf,
    pub render: RenderSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            records_dir: PathBuf::from("records"),
            render: RenderSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Read the JSON file named by `INFODOCS_CONFIG`, or the `INFODOCS_*`
    /// variables when it is unset. Directories come back absolute.
    pub fn load() -> eyre::Result<Self> {
        let mut config = match env::var_os("INFODOCS_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::from_env(|key| env::var(key).ok())?,
        };
        config.absolutize()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> eyre::Result<Self> {
        let json: serde_json::Value = serde_json::from_str(contents)?;
        let on_disk_version = json
            .get("config_version")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        if on_disk_version > u64::from(CURRENT_VERSION) {
            return Err(eyre::eyre!(
                "config_version {on_disk_version} is newer than this build supports ({CURRENT_VERSION})"
            ));
        }

        let mut config: ServerConfig = serde_json::from_value(json)?;
        config.config_version = CURRENT_VERSION;
        Ok(config)
    }

    /// Build from `INFODOCS_*` variables read through `lookup`; anything
    /// unset keeps its default.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(bind) = var("INFODOCS_BIND") {
            config.bind = bind
                .parse()
                .map_err(|e| eyre::eyre!("invalid INFODOCS_BIND {bind:?}: {e}"))?;
        }
        if let Some(dir) = var("INFODOCS_RECORDS_DIR") {
            config.records_dir = PathBuf::from(dir);
        }

        let render = &mut config.render;
        if let Some(base_url) = var("INFODOCS_BASE_URL") {
            render.base_url = base_url;
        }
        if let Some(dir) = var("INFODOCS_MEDIA_DIR") {
            render.asset_roots.primary.dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("INFODOCS_UPLOADS_DIR") {
            render.asset_roots.legacy.dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("INFODOCS_STATIC_DIR") {
            render.static_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("INFODOCS_FONTS_DIR") {
            render.fonts_dir = Some(PathBuf::from(dir));
        }
        if let Some(dpi) = var("INFODOCS_RASTER_DPI") {
            render.raster.dpi = dpi
                .parse()
                .map_err(|e| eyre::eyre!("invalid INFODOCS_RASTER_DPI {dpi:?}: {e}"))?;
        }

        Ok(config)
    }

    pub fn absolutize(&mut self) -> eyre::Result<()> {
        self.records_dir = std::path::absolute(&self.records_dir)?;
        self.render.absolutize()?;
        Ok(())
    }
}
