//! infodocs-core
//!
//! Pure domain types and storage key conventions for certificate generation.
//! No rendering or filesystem dependency; this is the shared vocabulary of
//! the infodocs crates.

pub mod error;
pub mod keys;
pub mod models;
