use thiserror::Error;

use crate::models::category::Category;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid certificate category: {0}")]
    InvalidCategory(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("an organization selection is required for {0} documents")]
    OrganizationRequired(Category),
}
