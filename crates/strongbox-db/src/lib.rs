//! Strongbox DB Library
//!
//! Metadata half of the storage gateway: the `FileMetadataStore` trait and
//! its Postgres implementation.

pub mod files;

pub use files::{FileMetadataStore, PgFileMetadataStore};
