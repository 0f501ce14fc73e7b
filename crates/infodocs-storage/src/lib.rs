//! infodocs-storage
//!
//! Local-filesystem storage for infodocs: raw objects addressed by relative
//! keys, JSON records (templates, organizations, documents), and the asset
//! store used to materialize images and rendered artifacts.

pub mod assets;
pub mod error;
pub mod objects;
pub mod records;
