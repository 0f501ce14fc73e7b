use infodocs_core::models::organization::Organization;
use infodocs_storage::assets::{AssetStore, LocalAssetStore};
use infodocs_storage::error::StorageError;
use infodocs_storage::{objects, records};
use uuid::Uuid;

#[test]
fn saving_identical_bytes_reuses_the_same_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalAssetStore::new(dir.path());
    let id = Uuid::new_v4();

    let first = store.save(b"png-bytes", id, "photo", "png").unwrap();
    let second = store.save(b"png-bytes", id, "photo", "png").unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with(&format!("certificates/cert_{id}_photo_")));
    assert!(first.ends_with(".png"));

    let stored = std::fs::read_dir(dir.path().join("certificates")).unwrap().count();
    assert_eq!(stored, 1);
}

#[test]
fn different_bytes_get_different_paths() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalAssetStore::new(dir.path());
    let id = Uuid::new_v4();

    let a = store.save(b"one", id, "signature", "png").unwrap();
    let b = store.save(b"two", id, "signature", "png").unwrap();
    assert_ne!(a, b);
    assert!(store.exists(dir.path(), &a));
    assert!(store.exists(dir.path(), &b));
}

#[test]
fn artifacts_overwrite_previous_render() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalAssetStore::new(dir.path());
    let id = Uuid::new_v4();

    let path = store.save_artifact(b"%PDF-1", id, "pdf").unwrap();
    store.save_artifact(b"%PDF-2", id, "pdf").unwrap();
    assert_eq!(path, format!("certificates/certificate_{id}.pdf"));
    assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), b"%PDF-2");
}

#[test]
fn exists_rejects_escaping_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalAssetStore::new(dir.path());
    assert!(!store.exists(dir.path(), "../etc/passwd"));
    assert!(!store.exists(dir.path(), "/etc/passwd"));
    assert!(!store.exists(dir.path(), "missing.png"));
    assert!(matches!(
        objects::get_object(dir.path(), "../x"),
        Err(StorageError::InvalidKey(_))
    ));
}

#[test]
fn records_round_trip_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let organization = Organization {
        id: Uuid::new_v4(),
        name: "Lotus Spa".into(),
        ..Default::default()
    };
    let key = infodocs_core::keys::organization(organization.id);
    records::save_record(dir.path(), &key, &organization).unwrap();
    std::fs::write(dir.path().join("organizations/broken.json"), b"{").unwrap();

    let loaded: Organization = records::load_record(dir.path(), &key).unwrap();
    assert_eq!(loaded.name, "Lotus Spa");

    let listed: Vec<Organization> = records::list_records(dir.path(), "organizations/").unwrap();
    assert_eq!(listed.len(), 1);

    let missing: Result<Organization, _> =
        records::load_record(dir.path(), "organizations/nope.json");
    assert!(matches!(missing, Err(StorageError::NotFound { .. })));

    let empty: Vec<Organization> = records::list_records(dir.path(), "templates/").unwrap();
    assert!(empty.is_empty());
}

#[test]
fn concurrent_saves_of_one_payload_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalAssetStore::new(dir.path());
    let id = Uuid::new_v4();
    let photo = vec![7u8; 1 << 20];

    for _ in 0..20 {
        let paths: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| store.save(&photo, id, "candidate_photo", "png")))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap().unwrap())
                .collect()
        });
        assert!(paths.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(std::fs::read(dir.path().join(&paths[0])).unwrap(), photo);
    }

    // No staging files are left behind.
    let stored = std::fs::read_dir(dir.path().join("certificates")).unwrap().count();
    assert_eq!(stored, 1);
}

#[test]
fn put_object_if_absent_keeps_the_first_body() {
    let dir = tempfile::tempdir().unwrap();
    assert!(objects::put_object_if_absent(dir.path(), "a/b.bin", b"first").unwrap());
    assert!(!objects::put_object_if_absent(dir.path(), "a/b.bin", b"second").unwrap());
    assert_eq!(objects::get_object(dir.path(), "a/b.bin").unwrap(), b"first");

    objects::put_object(dir.path(), "a/b.bin", b"third").unwrap();
    assert_eq!(objects::get_object(dir.path(), "a/b.bin").unwrap(), b"third");
}
