//! Configuration module
//!
//! Configuration is loaded from environment variables (with `.env` support via
//! dotenvy). Each section has conservative defaults except `DATABASE_URL`,
//! which must be set explicitly.

use std::env;

use anyhow::Context;

// Common constants
const DEFAULT_CLAMD_HOST: &str = "localhost";
const DEFAULT_CLAMD_PORT: u16 = 3310;
const DEFAULT_CLAMD_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_FILE_SIZE_MB: usize = 50;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "pdf,png,jpg,jpeg,gif,doc,docx,odt,txt";
const DEFAULT_STORAGE_PATH: &str = "./data/files";

/// Virus scanner daemon configuration
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    pub host: String,
    pub port: u16,
    /// Timeout in milliseconds applied to every socket operation
    pub timeout_ms: u64,
}

/// Upload pipeline configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

/// File storage configuration
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub root_path: String,
}

/// Top-level application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub upload: UploadConfig,
    pub storage: StorageConfig,
    pub database_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .context("MAX_FILE_SIZE_MB must be a positive integer")?;

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(AppConfig {
            scanner: ScannerConfig {
                host: env::var("CLAMD_HOST").unwrap_or_else(|_| DEFAULT_CLAMD_HOST.to_string()),
                port: env::var("CLAMD_PORT")
                    .unwrap_or_else(|_| DEFAULT_CLAMD_PORT.to_string())
                    .parse::<u16>()
                    .context("CLAMD_PORT must be a valid port number")?,
                timeout_ms: env::var("CLAMD_TIMEOUT_MS")
                    .unwrap_or_else(|_| DEFAULT_CLAMD_TIMEOUT_MS.to_string())
                    .parse::<u64>()
                    .context("CLAMD_TIMEOUT_MS must be a positive integer")?,
            },
            upload: UploadConfig {
                max_file_size_bytes: max_file_size_mb * 1024 * 1024,
                allowed_extensions,
            },
            storage: StorageConfig {
                root_path: env::var("STORAGE_PATH")
                    .unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_string()),
            },
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.scanner.port == 0 {
            anyhow::bail!("CLAMD_PORT must not be 0");
        }
        if self.scanner.timeout_ms == 0 {
            anyhow::bail!("CLAMD_TIMEOUT_MS must be greater than 0");
        }
        if self.upload.max_file_size_bytes == 0 {
            anyhow::bail!("MAX_FILE_SIZE_MB must be greater than 0");
        }
        if self.upload.allowed_extensions.is_empty() {
            anyhow::bail!("ALLOWED_EXTENSIONS must list at least one extension");
        }
        if self.storage.root_path.trim().is_empty() {
            anyhow::bail!("STORAGE_PATH must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            scanner: ScannerConfig {
                host: "localhost".to_string(),
                port: 3310,
                timeout_ms: 30_000,
            },
            upload: UploadConfig {
                max_file_size_bytes: 50 * 1024 * 1024,
                allowed_extensions: vec!["pdf".to_string(), "png".to_string()],
            },
            storage: StorageConfig {
                root_path: "./data/files".to_string(),
            },
            database_url: "postgres://localhost/strongbox".to_string(),
        }
    }

    #[test]
    fn validate_accepts_sane_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = test_config();
        config.scanner.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_extension_list() {
        let mut config = test_config();
        config.upload.allowed_extensions.clear();
        assert!(config.validate().is_err());
    }
}
