//! Validation for incoming uploads
//!
//! All checks here are pure: no network or disk I/O is performed. Each
//! rejection carries a specific reason so callers can report it verbatim.

use crate::AppError;

/// Validate file size. An empty file and a file over `max_size` are both
/// rejected; a file exactly at `max_size` passes.
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size == 0 {
        return Err(AppError::InvalidInput("Empty file".to_string()));
    }
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size {} bytes exceeds maximum allowed size of {} bytes",
            file_size, max_size
        )));
    }
    Ok(())
}

/// Validate file extension against the allow-list. Returns the lowercased
/// extension on success.
pub fn validate_file_extension(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, AppError> {
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    if extension.is_empty() || extension == filename.to_lowercase() {
        return Err(AppError::InvalidInput(format!(
            "Missing file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    if !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension '{}'. Allowed extensions: {}",
            extension,
            allowed_extensions.join(", ")
        )));
    }

    Ok(extension)
}

/// Sanitize a filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains path traversal attempts.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    if filename.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 1024;

    #[test]
    fn file_at_exact_limit_passes() {
        assert!(validate_file_size(MAX, MAX).is_ok());
    }

    #[test]
    fn file_one_byte_over_limit_is_rejected_with_size_reason() {
        let err = validate_file_size(MAX + 1, MAX).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert!(err.to_string().contains("1025 bytes"));
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = validate_file_size(0, MAX).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("Empty file"));
    }

    #[test]
    fn extension_allow_list_is_enforced() {
        let allowed = vec!["pdf".to_string(), "png".to_string()];
        assert_eq!(validate_file_extension("report.PDF", &allowed).unwrap(), "pdf");
        assert!(validate_file_extension("payload.exe", &allowed).is_err());
        assert!(validate_file_extension("no_extension", &allowed).is_err());
    }

    #[test]
    fn sanitize_filename_rejects_path_traversal() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/../bar").is_err());
        assert!(sanitize_filename("....").is_err());
    }

    #[test]
    fn sanitize_filename_accepts_valid_names() {
        assert_eq!(sanitize_filename("image.png").unwrap(), "image.png");
        assert_eq!(sanitize_filename("my-file_1.jpg").unwrap(), "my-file_1.jpg");
    }

    #[test]
    fn sanitize_filename_replaces_invalid_characters() {
        assert_eq!(sanitize_filename("weird name!.pdf").unwrap(), "weird_name_.pdf");
    }
}
