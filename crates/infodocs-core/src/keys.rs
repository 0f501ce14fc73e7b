//! Storage key/path conventions.
//!
//! Pure string functions with no filesystem dependency. These define the
//! canonical layout of records and assets relative to a storage root.

use uuid::Uuid;

pub const TEMPLATES_PREFIX: &str = "templates/";

pub fn template(id: Uuid) -> String {
    format!("templates/{id}.json")
}

pub fn organization(id: Uuid) -> String {
    format!("organizations/{id}.json")
}

pub fn document(id: Uuid) -> String {
    format!("documents/{id}.json")
}

/// An image materialized for a single document, e.g. a photo submitted as a
/// data URI. `digest` makes the name stable for identical bytes.
pub fn certificate_asset(document_id: Uuid, kind: &str, digest: &str, ext: &str) -> String {
    format!("certificates/cert_{document_id}_{kind}_{digest}.{ext}")
}

/// A rendered artifact (PDF or image) for a document.
pub fn certificate_artifact(document_id: Uuid, ext: &str) -> String {
    format!("certificates/certificate_{document_id}.{ext}")
}
