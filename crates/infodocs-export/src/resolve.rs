//! Asset path resolver.
//!
//! The same image is addressed differently depending on who reads the
//! rendered HTML: a browser (preview) fetches it over HTTP, an offline PDF
//! backend (final) reads it from disk through a `file://` URI.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use infodocs_core::models::render::RenderMode;
use infodocs_storage::assets::AssetStore;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::settings::{AssetRoot, RenderSettings};

/// The four shapes an asset reference can take, decided by prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRef<'a> {
    /// `data:` URI.
    Embedded(&'a str),
    /// Relative path under one of the asset roots.
    Stored(&'a str),
    /// `http(s)://` or `file://` URL.
    External(&'a str),
    /// `blob:` reference, meaningful only inside the browser that made it.
    Ephemeral(&'a str),
}

impl<'a> AssetRef<'a> {
    pub fn classify(reference: &'a str) -> Self {
        let reference = reference.trim();
        let lower = reference
            .get(..8)
            .unwrap_or(reference)
            .to_ascii_lowercase();
        if lower.starts_with("data:") {
            AssetRef::Embedded(reference)
        } else if lower.starts_with("blob:") {
            AssetRef::Ephemeral(reference)
        } else if lower.starts_with("http://")
            || lower.starts_with("https://")
            || lower.starts_with("file://")
        {
            AssetRef::External(reference)
        } else {
            AssetRef::Stored(reference)
        }
    }
}

/// A non-fatal resolution problem. The render goes on without the asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetWarning {
    pub field: String,
    pub reference: String,
    pub reason: String,
}

impl AssetWarning {
    fn new(field: &str, reference: &str, reason: impl Into<String>) -> Self {
        // Embedded payloads can be megabytes; keep only a recognisable head.
        let reference: String = reference.chars().take(64).collect();
        Self {
            field: field.to_string(),
            reference,
            reason: reason.into(),
        }
    }
}

/// An embedded payload that was written to the primary root during a final
/// render, so the caller can store the path in place of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedAsset {
    pub field: String,
    /// Relative to the primary asset root.
    pub path: String,
}

/// Resolves the asset references of one render.
pub struct AssetResolver<'a> {
    settings: &'a RenderSettings,
    store: &'a dyn AssetStore,
    mode: RenderMode,
    /// Owner of any asset materialized during this render.
    target_id: Uuid,
    warnings: Vec<AssetWarning>,
    materialized: Vec<MaterializedAsset>,
}

impl<'a> AssetResolver<'a> {
    pub fn new(
        settings: &'a RenderSettings,
        store: &'a dyn AssetStore,
        mode: RenderMode,
        target_id: Uuid,
    ) -> Self {
        Self {
            settings,
            store,
            mode,
            target_id,
            warnings: Vec::new(),
            materialized: Vec::new(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn warnings(&self) -> &[AssetWarning] {
        &self.warnings
    }

    pub fn materialized(&self) -> &[MaterializedAsset] {
        &self.materialized
    }

    pub fn into_warnings(self) -> Vec<AssetWarning> {
        self.warnings
    }

    pub fn into_parts(self) -> (Vec<AssetWarning>, Vec<MaterializedAsset>) {
        (self.warnings, self.materialized)
    }

    /// Turn `reference` (the value of context field `field`) into an address
    /// suitable for the current mode. Problems are recorded as warnings and
    /// resolve to an empty string or a best-effort address, never an error.
    pub fn resolve(&mut self, field: &str, reference: &str) -> String {
        if reference.trim().is_empty() {
            return String::new();
        }

        match (AssetRef::classify(reference), self.mode) {
            (AssetRef::Embedded(uri), RenderMode::Preview) => uri.to_string(),
            (AssetRef::Embedded(uri), RenderMode::Final) => self.materialize(field, uri),
            (AssetRef::Stored(path), _) => self.resolve_stored(field, path),
            (AssetRef::External(url), RenderMode::Preview) => url.to_string(),
            (AssetRef::External(url), RenderMode::Final) => self.localize(field, url),
            (AssetRef::Ephemeral(blob), RenderMode::Preview) => blob.to_string(),
            (AssetRef::Ephemeral(blob), RenderMode::Final) => {
                self.warn(field, blob, "browser-local reference cannot be used in a final render");
                String::new()
            }
        }
    }

    /// Address of a decorative image under the static directory.
    pub fn static_asset(&self, relative_path: &str) -> String {
        let relative_path = relative_path.trim_start_matches('/');
        match self.mode {
            RenderMode::Preview => self.http_url(&self.settings.static_mount, relative_path),
            RenderMode::Final => {
                file_uri(&self.settings.static_dir.join(relative_path)).unwrap_or_default()
            }
        }
    }

    /// Base address of the static directory, without a trailing slash.
    pub fn static_base(&self) -> String {
        let base = match self.mode {
            RenderMode::Preview => self.http_url(&self.settings.static_mount, ""),
            RenderMode::Final => file_uri(&self.settings.static_dir).unwrap_or_default(),
        };
        base.trim_end_matches('/').to_string()
    }

    fn resolve_stored(&mut self, field: &str, path: &str) -> String {
        let settings = self.settings;
        let roots = settings.asset_roots.in_order();
        let relative = strip_mount(path, &roots);

        let found = roots
            .iter()
            .find(|root| self.store.exists(root.dir(), relative))
            .copied();
        let root = match found {
            Some(root) => root,
            None => {
                self.warn(field, path, "asset not found under any asset root");
                roots[0]
            }
        };

        match self.mode {
            RenderMode::Preview => self.http_url(root.mount(), relative),
            RenderMode::Final => match file_uri(&root.dir().join(relative)) {
                Some(uri) => uri,
                None => {
                    self.warn(field, path, "asset root is not an absolute directory");
                    String::new()
                }
            },
        }
    }

    /// Write an embedded payload to the primary root so a PDF backend can
    /// read it, then address it like any stored asset. The stored name
    /// derives from the bytes and the target id, so repeated renders reuse
    /// one file.
    fn materialize(&mut self, field: &str, uri: &str) -> String {
        let Some((media_type, bytes)) = decode_data_uri(uri) else {
            self.warn(field, uri, "embedded payload could not be decoded");
            return String::new();
        };

        match self
            .store
            .save(&bytes, self.target_id, field, extension_for(&media_type))
        {
            Ok(relative) => {
                tracing::debug!(field, path = %relative, "embedded asset materialized");
                let address = self.resolve_stored(field, &relative);
                self.materialized.push(MaterializedAsset {
                    field: field.to_string(),
                    path: relative,
                });
                address
            }
            Err(e) => {
                self.warn(field, uri, format!("embedded payload could not be stored: {e}"));
                String::new()
            }
        }
    }

    /// Rewrite one of our own HTTP URLs to the file it serves. Foreign URLs
    /// are left for the backend to fetch.
    fn localize(&mut self, field: &str, url: &str) -> String {
        let (Ok(parsed), Ok(base)) = (Url::parse(url), Url::parse(self.settings.base_url())) else {
            return url.to_string();
        };
        if parsed.scheme() == "file" {
            return url.to_string();
        }
        if parsed.origin() != base.origin() {
            tracing::warn!(field, url, "remote asset left as-is; PDF backends may not fetch it");
            return url.to_string();
        }

        let path = percent_decode(parsed.path());
        let base_path = base.path().trim_end_matches('/');
        let Some(served) = path.strip_prefix(base_path) else {
            return url.to_string();
        };
        let served = served.trim_start_matches('/');

        let static_mount = self.settings.static_mount.trim_matches('/');
        if let Some(relative) = served
            .strip_prefix(static_mount)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return self.static_asset(relative);
        }
        let settings = self.settings;
        let roots = settings.asset_roots.in_order();
        if roots.iter().any(|root| served.starts_with(&format!("{}/", root.mount()))) {
            return self.resolve_stored(field, served);
        }

        tracing::warn!(field, url, "own URL outside any asset mount left as-is");
        url.to_string()
    }

    /// `{base_url}/{mount}/{relative}` with each segment percent-encoded.
    fn http_url(&self, mount: &str, relative: &str) -> String {
        let base = self.settings.base_url();
        let segments = mount
            .split('/')
            .chain(relative.split('/'))
            .filter(|segment| !segment.is_empty());

        match Url::parse(base) {
            Ok(mut url) => {
                if let Ok(mut path) = url.path_segments_mut() {
                    path.pop_if_empty().extend(segments);
                }
                url.to_string()
            }
            Err(_) => {
                let joined: Vec<&str> = segments.collect();
                format!("{base}/{}", joined.join("/"))
            }
        }
    }

    fn warn(&mut self, field: &str, reference: &str, reason: impl Into<String>) {
        let warning = AssetWarning::new(field, reference, reason);
        tracing::warn!(
            field = %warning.field,
            reference = %warning.reference,
            mode = %self.mode,
            reason = %warning.reason,
            "asset resolution warning"
        );
        self.warnings.push(warning);
    }
}

/// Drop a leading `/` and a leading `{mount}/` of any root, so
/// `/media/a.png` and `a.png` name the same stored asset.
fn strip_mount<'p>(path: &'p str, roots: &[&AssetRoot]) -> &'p str {
    let path = path.trim().trim_start_matches('/');
    roots
        .iter()
        .find_map(|root| {
            path.strip_prefix(root.mount())
                .and_then(|rest| rest.strip_prefix('/'))
        })
        .unwrap_or(path)
}

fn file_uri(path: &Path) -> Option<String> {
    Url::from_file_path(path).ok().map(String::from)
}

/// Split a `data:` URI into its media type and decoded bytes.
fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.get(5..)?;
    let (header, payload) = rest.split_once(',')?;
    let mut params = header.split(';');
    let media_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD.decode(compact).ok()?
    } else {
        percent_decode_str(payload).collect()
    };
    if bytes.is_empty() {
        return None;
    }
    Some((media_type, bytes))
}

fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}

fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}
