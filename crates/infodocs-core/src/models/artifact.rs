use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Output formats of a final render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ArtifactFormat {
    #[default]
    Pdf,
    Png,
    Jpeg,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "pdf",
            ArtifactFormat::Png => "png",
            ArtifactFormat::Jpeg => "jpg",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "application/pdf",
            ArtifactFormat::Png => "image/png",
            ArtifactFormat::Jpeg => "image/jpeg",
        }
    }

    /// Suggested download name, e.g. `certificate_<id>.pdf`.
    pub fn filename(&self, document_id: Uuid) -> String {
        format!("certificate_{document_id}.{}", self.extension())
    }
}
