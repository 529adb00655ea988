use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Snapshot file names must stay inside the snapshot directory.
pub fn validate_file_name(field_name: &str, name: &str) -> Result<()> {
    validate_path(field_name, name)?;
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Must be a plain file name without directory components".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_email(field_name: &str, address: &str) -> Result<()> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    });

    if !re.is_match(address) {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: address.to_string(),
            reason: "Not a valid email address".to_string(),
        });
    }
    Ok(())
}

/// Azure container names: 3-63 chars, lowercase letters, digits and single hyphens,
/// starting and ending with a letter or digit.
pub fn validate_container_name(field_name: &str, name: &str) -> Result<()> {
    static CONTAINER: OnceLock<Regex> = OnceLock::new();
    let re = CONTAINER.get_or_init(|| {
        Regex::new(r"^[a-z0-9](?:[a-z0-9]|-[a-z0-9])*$").expect("container pattern is valid")
    });

    if name.len() < 3 || name.len() > 63 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Container name must be between 3 and 63 characters".to_string(),
        });
    }

    if !re.is_match(name) {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Container name can only contain lowercase letters, numbers, and single hyphens, and must start and end with a letter or number".to_string(),
        });
    }

    Ok(())
}

/// Blob names: 1-1024 chars, not ending in '.' or '/'.
pub fn validate_blob_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;

    if name.len() > 1024 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Blob name cannot exceed 1024 characters".to_string(),
        });
    }

    if name.ends_with('.') || name.ends_with('/') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Blob name cannot end with a dot or a slash".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://example.com").is_ok());
        assert!(validate_url("source.endpoint", "http://example.com").is_ok());
        assert!(validate_url("source.endpoint", "").is_err());
        assert!(validate_url("source.endpoint", "invalid-url").is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("source.probe_page_size", 10, 1, 1000).is_ok());
        assert!(validate_range("source.probe_page_size", 0, 1, 1000).is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("snapshot.filename", "results.csv").is_ok());
        assert!(validate_file_name("snapshot.filename", "../results.csv").is_err());
        assert!(validate_file_name("snapshot.filename", "").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("notify.sender", "ops@example.com").is_ok());
        assert!(validate_email("notify.sender", "ops.example.com").is_err());
        assert!(validate_email("notify.sender", "ops @example.com").is_err());
    }

    #[test]
    fn test_validate_container_name() {
        assert!(validate_container_name("azure_container_name", "dld-data").is_ok());
        assert!(validate_container_name("azure_container_name", "ab").is_err());
        assert!(validate_container_name("azure_container_name", "DLD").is_err());
        assert!(validate_container_name("azure_container_name", "dld--data").is_err());
        assert!(validate_container_name("azure_container_name", "-dld").is_err());
    }

    #[test]
    fn test_validate_blob_name() {
        assert!(validate_blob_name("azure_blob_name", "exports/transactions.csv").is_ok());
        assert!(validate_blob_name("azure_blob_name", "exports/").is_err());
        assert!(validate_blob_name("azure_blob_name", "  ").is_err());
    }
}
