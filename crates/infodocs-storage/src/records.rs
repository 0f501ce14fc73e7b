use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageError;
use crate::objects;

/// Load a JSON record.
pub fn load_record<T: DeserializeOwned>(root: &Path, key: &str) -> Result<T, StorageError> {
    let body = objects::get_object(root, key)?;
    Ok(serde_json::from_slice(&body)?)
}

/// Save a JSON record, replacing any previous version.
pub fn save_record<T: Serialize>(root: &Path, key: &str, value: &T) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    objects::put_object(root, key, &body)
}

/// Load every `.json` record under `prefix`. Records that fail to parse are
/// skipped with a warning so one bad file does not hide the rest.
pub fn list_records<T: DeserializeOwned>(
    root: &Path,
    prefix: &str,
) -> Result<Vec<T>, StorageError> {
    let mut records = Vec::new();
    for key in objects::list_objects(root, prefix)? {
        if !key.ends_with(".json") {
            continue;
        }
        match load_record(root, &key) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(key, error = %e, "skipping unreadable record"),
        }
    }
    Ok(records)
}
