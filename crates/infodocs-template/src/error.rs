use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template source is empty")]
    Empty,
}
