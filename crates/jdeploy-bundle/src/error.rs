//! Error types for bundle operations.

use thiserror::Error;

/// Errors that can occur during bundle operations.
#[derive(Debug, Error)]
pub enum BundleError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Project manifest (package.json) is malformed.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Caller supplied an unusable argument (missing directory, missing
    /// platform, blank identifier). Never recovered.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Platform not usable for the requested operation.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    /// Missing required file.
    #[error("Missing required file: {0}")]
    MissingFile(String),

    /// The external packer failed.
    #[error("Packing failed for {path}: {reason}")]
    Pack { path: String, reason: String },

    /// Signature verification failed after a bundle was modified.
    #[error("Signature mismatch for {path}")]
    SignatureMismatch { path: String },
}

impl BundleError {
    /// Whether this error belongs to the configuration class, which aborts
    /// a whole generation call instead of degrading to a fallback.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::InvalidManifest(_) | Self::UnsupportedPlatform(_)
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn BundleError___io___displays_message() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BundleError = io_err.into();

        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn BundleError___invalid_config___displays_message() {
        let err = BundleError::InvalidConfig(
            "Universal publish directory must exist: /tmp/none".to_string(),
        );

        assert_eq!(
            err.to_string(),
            "Invalid configuration: Universal publish directory must exist: /tmp/none"
        );
    }

    #[test]
    fn BundleError___pack___displays_all_fields() {
        let err = BundleError::Pack {
            path: "out/myapp-mac-x64".to_string(),
            reason: "npm exited with 1".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("out/myapp-mac-x64"));
        assert!(msg.contains("npm exited with 1"));
    }

    #[test]
    fn BundleError___is_configuration___classifies_variants() {
        assert!(BundleError::InvalidConfig("x".to_string()).is_configuration());
        assert!(BundleError::InvalidManifest("x".to_string()).is_configuration());
        assert!(!BundleError::MissingFile("x".to_string()).is_configuration());

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        assert!(!BundleError::from(io_err).is_configuration());
    }

    #[test]
    fn BundleError___from_io_error___converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let bundle_err: BundleError = io_err.into();

        assert!(matches!(bundle_err, BundleError::Io(_)));
    }
}
