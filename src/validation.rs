//! Filename sanitation, extension/size validation and content digesting.
//!
//! Pure functions with no I/O beyond reading the input buffer. Digests are
//! recorded for audit and dedup detection only; nothing here makes a trust
//! decision based on them.

use md5::Context;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("file type `{0}` is not allowed")]
    ExtensionNotAllowed(String),
    #[error("file size {size} exceeds the {max} byte limit")]
    FileTooLarge { size: i64, max: i64 },
}

/// Limits applied to every upload, taken from configuration.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_file_size: i64,
    pub allowed_extensions: Vec<String>,
}

/// Both digests of a file's content, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDigests {
    pub sha256: String,
    pub md5: String,
}

/// Strip path-traversal sequences and directory separators from a
/// user-supplied filename. The extension is left untouched.
pub fn sanitize_file_name(name: &str) -> String {
    name.replace("..", "").replace(['/', '\\'], "")
}

/// Extract and validate the extension: the substring after the final `.`,
/// lower-cased, compared against the configured allow-list.
pub fn validate_extension(name: &str, allowed: &[String]) -> Result<String, ValidationError> {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if extension.is_empty() || !allowed.iter().any(|a| a == &extension) {
        return Err(ValidationError::ExtensionNotAllowed(extension));
    }
    Ok(extension)
}

/// Reject payloads larger than the configured ceiling.
pub fn validate_size(size: i64, max: i64) -> Result<(), ValidationError> {
    if size > max {
        return Err(ValidationError::FileTooLarge { size, max });
    }
    Ok(())
}

/// Compute SHA-256 and MD5 over the full content in one pass.
pub fn digest(bytes: &[u8]) -> ContentDigests {
    let mut sha = Sha256::new();
    sha.update(bytes);
    let mut md5_ctx = Context::new();
    md5_ctx.consume(bytes);

    ContentDigests {
        sha256: hex::encode(sha.finalize()),
        md5: format!("{:x}", md5_ctx.compute()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["pdf".into(), "txt".into(), "jpg".into()]
    }

    #[test]
    fn sanitize_strips_traversal_and_separators() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_file_name("dir\\evil.txt"), "direvil.txt");
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
    }

    #[test]
    fn sanitize_preserves_extension() {
        assert!(sanitize_file_name("a/../b.TXT").ends_with(".TXT"));
    }

    #[test]
    fn extension_is_final_suffix_lowercased() {
        assert_eq!(validate_extension("a.b.TXT", &allowed()).unwrap(), "txt");
    }

    #[test]
    fn extension_outside_allow_list_rejected() {
        let err = validate_extension("run.exe", &allowed()).unwrap_err();
        assert!(matches!(err, ValidationError::ExtensionNotAllowed(ext) if ext == "exe"));
    }

    #[test]
    fn missing_extension_rejected() {
        assert!(validate_extension("noext", &allowed()).is_err());
    }

    #[test]
    fn size_ceiling_enforced() {
        assert!(validate_size(10, 10).is_ok());
        let err = validate_size(11, 10).unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { size: 11, max: 10 }));
    }

    #[test]
    fn digests_match_known_vectors() {
        let d = digest(b"hello world");
        assert_eq!(
            d.sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(d.md5, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }
}
