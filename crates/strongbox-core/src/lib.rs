//! Strongbox Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! validation shared across all strongbox components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{AppConfig, ScannerConfig, StorageConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
