//! infodocs-export
//!
//! The certificate render pipeline: data normalization, asset resolution,
//! template interpretation and PDF/image conversion.

pub mod cache;
pub mod convert;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod settings;
pub mod styles;
