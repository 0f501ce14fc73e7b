use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Map a relative object key onto a path under `root`. Keys must stay inside
/// the root: absolute keys and `..` segments are rejected.
pub fn object_path(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let relative = Path::new(key);
    let valid = !key.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !valid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(root.join(relative))
}

/// Read an object.
pub fn get_object(root: &Path, key: &str) -> Result<Vec<u8>, StorageError> {
    let path = object_path(root, key)?;
    std::fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound {
            key: key.to_string(),
        },
        _ => StorageError::io(path, e),
    })
}

/// Write an object, creating parent directories. The body is staged in a
/// uniquely named temp file beside the target and renamed into place, so
/// readers never see a partial object and concurrent writers never share a
/// staging file.
pub fn put_object(root: &Path, key: &str, body: &[u8]) -> Result<(), StorageError> {
    let path = object_path(root, key)?;
    let staged = stage(&path, key, body)?;
    staged
        .persist(&path)
        .map_err(|e| StorageError::io(&path, e.error))?;

    tracing::debug!(key, bytes = body.len(), "object written");
    Ok(())
}

/// Write an object unless `key` already exists. Returns `false` when an
/// existing object was kept. When several writers race on one key, exactly
/// one of them writes and the others see the existing object.
pub fn put_object_if_absent(root: &Path, key: &str, body: &[u8]) -> Result<bool, StorageError> {
    let path = object_path(root, key)?;
    let staged = stage(&path, key, body)?;
    match staged.persist_noclobber(&path) {
        Ok(_) => {
            tracing::debug!(key, bytes = body.len(), "object written");
            Ok(true)
        }
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(StorageError::io(&path, e.error)),
    }
}

fn stage(path: &Path, key: &str, body: &[u8]) -> Result<NamedTempFile, StorageError> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::InvalidKey(key.to_string()))?;
    std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| StorageError::io(parent, e))?;
    staged
        .write_all(body)
        .and_then(|()| staged.flush())
        .map_err(|e| StorageError::io(staged.path(), e))?;
    Ok(staged)
}

/// Whether `key` names an existing regular file under `root`. Invalid keys
/// never exist.
pub fn object_exists(root: &Path, key: &str) -> bool {
    object_path(root, key).is_ok_and(|path| path.is_file())
}

/// Keys of the objects directly under `prefix` (e.g. `templates/`), sorted.
/// A missing prefix directory lists as empty.
pub fn list_objects(root: &Path, prefix: &str) -> Result<Vec<String>, StorageError> {
    let dir = object_path(root, prefix.trim_end_matches('/'))?;
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::io(dir, e)),
    };

    let mut keys = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(&dir, e))?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            keys.push(format!("{}/{name}", prefix.trim_end_matches('/')));
        }
    }
    keys.sort();
    Ok(keys)
}
