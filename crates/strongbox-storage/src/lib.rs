//! Strongbox Storage Library
//!
//! Byte half of the storage gateway: the `Storage` trait plus a local
//! filesystem backend.
//!
//! # Storage key format
//!
//! Keys are owner-scoped: `files/{owner_id}/{stored_name}`. Keys must not
//! contain `..` or a leading `/`. Key generation is centralized in the `keys`
//! module so callers and backends stay consistent.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
