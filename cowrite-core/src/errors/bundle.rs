//! Backup bundle error types
//!
//! Raised while decoding an uploaded backup, before any write begins. The two
//! variants are reported to clients with distinct messages so that an
//! outdated bundle is not mistaken for a corrupt file.
//!
//! # Examples
//!
//! ```rust
//! use cowrite::errors::BundleError;
//!
//! let err = BundleError::UnsupportedVersion("2".to_string());
//! assert!(err.is_version_error());
//! ```

use thiserror::Error;

use super::CoreError;

#[derive(Error, Debug)]
pub enum BundleError {
    /// The bundle parsed but declares a format version this build cannot read
    #[error("Unsupported backup version: {0}")]
    UnsupportedVersion(String),

    /// Neither a backup archive nor a bare backup document
    #[error("Unreadable backup file: {0}")]
    Unreadable(String),
}

impl BundleError {
    pub fn is_version_error(&self) -> bool {
        matches!(self, BundleError::UnsupportedVersion(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BundleError::UnsupportedVersion(_) => "UNSUPPORTED_VERSION",
            BundleError::Unreadable(_) => "UNREADABLE_FILE",
        }
    }
}

impl From<BundleError> for CoreError {
    fn from(err: BundleError) -> Self {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert("reason".to_string(), err.error_code().to_string());
        CoreError::bad_bundle(err.to_string()).with_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn version_and_unreadable_are_distinct() {
        let version: CoreError = BundleError::UnsupportedVersion("2".to_string()).into();
        let unreadable: CoreError = BundleError::Unreadable("not a zip".to_string()).into();

        assert_eq!(version.kind(), CoreErrorKind::BadBundle);
        assert_eq!(unreadable.kind(), CoreErrorKind::BadBundle);
        assert_eq!(version.message(), "Unsupported backup version: 2");
        assert_ne!(version.message(), unreadable.message());
        assert_eq!(
            version.fields().and_then(|f| f.get("reason")).map(String::as_str),
            Some("UNSUPPORTED_VERSION")
        );
    }
}
