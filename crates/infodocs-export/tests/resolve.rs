use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use infodocs_core::models::render::RenderMode;
use infodocs_export::resolve::{AssetRef, AssetResolver};
use infodocs_export::settings::{AssetRoot, AssetRoots, RenderSettings};
use infodocs_storage::assets::LocalAssetStore;
use tempfile::TempDir;
use url::Url;
use uuid::Uuid;

struct Fixture {
    dir: TempDir,
    settings: RenderSettings,
    store: LocalAssetStore,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings = RenderSettings {
            base_url: "http://localhost:8000/".into(),
            asset_roots: AssetRoots {
                primary: AssetRoot::new(dir.path().join("media"), "media"),
                legacy: AssetRoot::new(dir.path().join("uploads"), "uploads"),
            },
            static_dir: dir.path().join("static"),
            ..RenderSettings::default()
        };
        let store = LocalAssetStore::new(dir.path().join("media"));
        Self {
            dir,
            settings,
            store,
        }
    }

    fn put(&self, root: &str, relative: &str) {
        let path = self.dir.path().join(root).join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"img").unwrap();
    }

    fn resolver(&self, mode: RenderMode) -> AssetResolver<'_> {
        AssetResolver::new(&self.settings, &self.store, mode, Uuid::nil())
    }

    fn file_uri(&self, root: &str, relative: &str) -> String {
        Url::from_file_path(self.dir.path().join(root).join(relative))
            .unwrap()
            .to_string()
    }
}

#[test]
fn references_are_classified_by_prefix() {
    assert!(matches!(AssetRef::classify("data:image/png;base64,AAAA"), AssetRef::Embedded(_)));
    assert!(matches!(AssetRef::classify("blob:http://x/1"), AssetRef::Ephemeral(_)));
    assert!(matches!(AssetRef::classify("HTTPS://cdn/x.png"), AssetRef::External(_)));
    assert!(matches!(AssetRef::classify("file:///tmp/x.png"), AssetRef::External(_)));
    assert!(matches!(AssetRef::classify("spa_logos/x.png"), AssetRef::Stored(_)));
}

#[test]
fn stored_asset_address_depends_on_mode() {
    let fx = Fixture::new();
    fx.put("media", "spa_logos/lotus.png");

    let preview = fx.resolver(RenderMode::Preview).resolve("spa_logo", "spa_logos/lotus.png");
    assert_eq!(preview, "http://localhost:8000/media/spa_logos/lotus.png");

    let mut resolver = fx.resolver(RenderMode::Final);
    let final_uri = resolver.resolve("spa_logo", "spa_logos/lotus.png");
    assert!(final_uri.starts_with("file://"));
    assert_eq!(final_uri, fx.file_uri("media", "spa_logos/lotus.png"));
    assert!(resolver.warnings().is_empty());
}

#[test]
fn legacy_root_is_used_only_when_primary_lacks_the_file() {
    let fx = Fixture::new();
    fx.put("uploads", "spa_logos/old.png");
    let resolved = fx.resolver(RenderMode::Final).resolve("spa_logo", "spa_logos/old.png");
    assert_eq!(resolved, fx.file_uri("uploads", "spa_logos/old.png"));

    fx.put("media", "spa_logos/old.png");
    let resolved = fx.resolver(RenderMode::Final).resolve("spa_logo", "spa_logos/old.png");
    assert_eq!(resolved, fx.file_uri("media", "spa_logos/old.png"));

    let preview = fx.resolver(RenderMode::Preview).resolve("spa_logo", "/uploads/spa_logos/old.png");
    assert_eq!(preview, "http://localhost:8000/media/spa_logos/old.png");
}

#[test]
fn missing_asset_resolves_against_primary_with_a_warning() {
    let fx = Fixture::new();
    let mut resolver = fx.resolver(RenderMode::Final);
    let resolved = resolver.resolve("candidate_photo", "certificates/gone.png");
    assert_eq!(resolved, fx.file_uri("media", "certificates/gone.png"));
    assert_eq!(resolver.warnings().len(), 1);
    assert_eq!(resolver.warnings()[0].field, "candidate_photo");
}

#[test]
fn preview_urls_are_percent_encoded() {
    let fx = Fixture::new();
    fx.put("media", "spa logos/my logo.png");
    let preview = fx.resolver(RenderMode::Preview).resolve("spa_logo", "spa logos/my logo.png");
    assert_eq!(preview, "http://localhost:8000/media/spa%20logos/my%20logo.png");
}

#[test]
fn embedded_payload_passes_through_in_preview() {
    let fx = Fixture::new();
    let uri = format!("data:image/png;base64,{}", STANDARD.encode(b"png"));
    assert_eq!(fx.resolver(RenderMode::Preview).resolve("candidate_photo", &uri), uri);
}

#[test]
fn embedded_payload_is_materialized_once_in_final_mode() {
    let fx = Fixture::new();
    let uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"jpeg-bytes"));

    let mut resolver = fx.resolver(RenderMode::Final);
    let first = resolver.resolve("candidate_photo", &uri);
    let second = resolver.resolve("candidate_photo", &uri);
    assert_eq!(first, second);
    assert!(resolver.warnings().is_empty());

    let path = Url::parse(&first).unwrap().to_file_path().unwrap();
    assert!(path.starts_with(fx.dir.path().join("media").join("certificates")));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
    assert_eq!(std::fs::read(&path).unwrap(), b"jpeg-bytes");

    let files = std::fs::read_dir(fx.dir.path().join("media/certificates")).unwrap().count();
    assert_eq!(files, 1);
}

#[test]
fn materialized_payloads_are_reported_with_their_stored_path() {
    let fx = Fixture::new();
    fx.put("media", "photos/logo.png");
    let uri = format!("data:image/png;base64,{}", STANDARD.encode(b"photo"));

    let mut preview = fx.resolver(RenderMode::Preview);
    preview.resolve("candidate_photo", &uri);
    assert!(preview.materialized().is_empty());

    let mut resolver = fx.resolver(RenderMode::Final);
    let address = resolver.resolve("candidate_photo", &uri);
    resolver.resolve("spa_logo", "photos/logo.png");
    let (warnings, materialized) = resolver.into_parts();
    assert!(warnings.is_empty());
    assert_eq!(materialized.len(), 1);
    assert_eq!(materialized[0].field, "candidate_photo");
    assert!(materialized[0].path.starts_with("certificates/"));
    assert_eq!(address, fx.file_uri("media", &materialized[0].path));
}

#[test]
fn undecodable_payload_degrades_to_empty() {
    let fx = Fixture::new();
    let mut resolver = fx.resolver(RenderMode::Final);
    assert_eq!(resolver.resolve("candidate_photo", "data:image/png;base64,@@@"), "");
    assert_eq!(resolver.warnings().len(), 1);
}

#[test]
fn ephemeral_reference_is_dropped_in_final_mode() {
    let fx = Fixture::new();
    let blob = "blob:http://localhost:3000/2f1c";
    assert_eq!(fx.resolver(RenderMode::Preview).resolve("candidate_photo", blob), blob);

    let mut resolver = fx.resolver(RenderMode::Final);
    assert_eq!(resolver.resolve("candidate_photo", blob), "");
    let warnings = resolver.into_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].reference, blob);
}

#[test]
fn own_urls_are_rewritten_to_files_in_final_mode() {
    let fx = Fixture::new();
    fx.put("uploads", "certificates/p.png");

    let mut resolver = fx.resolver(RenderMode::Final);
    let resolved = resolver.resolve("candidate_photo", "http://localhost:8000/uploads/certificates/p.png");
    assert_eq!(resolved, fx.file_uri("uploads", "certificates/p.png"));

    let foreign = "https://cdn.example.com/p.png";
    assert_eq!(resolver.resolve("candidate_photo", foreign), foreign);
    assert!(resolver.warnings().is_empty());

    assert_eq!(
        fx.resolver(RenderMode::Preview)
            .resolve("candidate_photo", "http://localhost:8000/uploads/certificates/p.png"),
        "http://localhost:8000/uploads/certificates/p.png"
    );
}

#[test]
fn static_assets_follow_the_mode() {
    let fx = Fixture::new();
    let preview = fx.resolver(RenderMode::Preview);
    assert_eq!(
        preview.static_asset("images/certificate-stamp.png"),
        "http://localhost:8000/static/images/certificate-stamp.png"
    );
    assert_eq!(preview.static_base(), "http://localhost:8000/static");

    let final_mode = fx.resolver(RenderMode::Final);
    assert_eq!(
        final_mode.static_asset("images/certificate-stamp.png"),
        fx.file_uri("static", "images/certificate-stamp.png")
    );
    let base = final_mode.static_base();
    assert!(base.starts_with("file://"));
    assert!(!base.ends_with('/'));
    assert!(Path::new(&Url::parse(&base).unwrap().to_file_path().unwrap()).ends_with("static"));
}

#[test]
fn blank_references_resolve_to_empty_without_warning() {
    let fx = Fixture::new();
    let mut resolver = fx.resolver(RenderMode::Final);
    assert_eq!(resolver.resolve("spa_logo", "   "), "");
    assert!(resolver.warnings().is_empty());
}
