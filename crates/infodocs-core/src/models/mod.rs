pub mod artifact;
pub mod category;
pub mod document;
pub mod organization;
pub mod render;
pub mod template;
