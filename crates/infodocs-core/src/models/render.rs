use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Whether a render is for interactive display or for a durable artifact.
/// Decides how assets are addressed and what the pipeline returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RenderMode {
    /// Browser preview: assets by HTTP URL or embedded payload.
    Preview,
    /// PDF/image output: assets by absolute `file://` URI.
    Final,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Preview => "preview",
            RenderMode::Final => "final",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
