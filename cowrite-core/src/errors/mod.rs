//! Error types for cowrite-core
//!
//! - **CoreError**: kinded error surfaced by the public operations
//! - **BundleError**: backup decoding failures, converted into `CoreError`

pub mod bundle;
pub mod core_error;

pub use bundle::BundleError;
pub use core_error::{CoreError, CoreErrorKind};

/// Result type alias for public operations
pub type CoreResult<T> = Result<T, CoreError>;
