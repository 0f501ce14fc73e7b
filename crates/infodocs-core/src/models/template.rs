use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TemplateKind {
    #[default]
    Html,
    Image,
}

/// A stored certificate template. Written by the admin workflow, read-only
/// for the render pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub kind: TemplateKind,
    /// UI variant of the category, e.g. "modern" or "classic".
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub html_source: Option<String>,
    /// Background image for `Image` templates.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub config: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

fn default_true() -> bool {
    true
}

impl Template {
    /// The HTML source, if present and not blank.
    pub fn html(&self) -> Option<&str> {
        self.html_source
            .as_deref()
            .filter(|source| !source.trim().is_empty())
    }
}
