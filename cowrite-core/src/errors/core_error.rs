use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreErrorKind {
    NotFound,
    Validation,
    BadBundle,
    Forbidden,
    Unauthorized,
    PayloadTooLarge,
    WriteFailure,
    Internal,
}

impl CoreErrorKind {
    /// Stable code used in API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            CoreErrorKind::NotFound => "NOT_FOUND",
            CoreErrorKind::Validation => "VALIDATION_FAILED",
            CoreErrorKind::BadBundle => "BAD_BUNDLE",
            CoreErrorKind::Forbidden => "FORBIDDEN",
            CoreErrorKind::Unauthorized => "UNAUTHORIZED",
            CoreErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            CoreErrorKind::WriteFailure => "IMPORT_FAILED",
            CoreErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            CoreErrorKind::NotFound => 404,
            CoreErrorKind::Validation | CoreErrorKind::BadBundle => 400,
            CoreErrorKind::Forbidden => 403,
            CoreErrorKind::Unauthorized => 401,
            CoreErrorKind::PayloadTooLarge => 413,
            CoreErrorKind::WriteFailure | CoreErrorKind::Internal => 500,
        }
    }
}

#[derive(Debug)]
pub struct CoreError {
    kind: CoreErrorKind,
    message: String,
    fields: Option<BTreeMap<String, String>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
            source: None,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("entity".to_string(), entity.into());
        fields.insert("id".to_string(), id.into());

        Self {
            kind: CoreErrorKind::NotFound,
            message: "Resource not found".to_string(),
            fields: Some(fields),
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Validation, message)
    }

    pub fn bad_bundle(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::BadBundle, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Forbidden, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unauthorized, message)
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            CoreErrorKind::PayloadTooLarge,
            format!("Upload exceeds the {} byte limit", limit),
        )
    }

    /// The write phase of an import failed. The message stays generic; the
    /// underlying cause is kept as the error source for logging.
    pub fn write_failure(source: anyhow::Error) -> Self {
        Self::new(CoreErrorKind::WriteFailure, "Import failed").with_source(AnyhowSource(source))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::internal("Unhandled error").with_source(AnyhowSource(err))
    }
}

impl From<sea_orm::DbErr> for CoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        CoreError::internal(format!("Database error: {}", err)).with_source(err)
    }
}

/// `anyhow::Error` does not implement `std::error::Error`; this wrapper lets it
/// travel as a boxed source.
#[derive(Debug)]
struct AnyhowSource(anyhow::Error);

impl fmt::Display for AnyhowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.0)
    }
}

impl StdError for AnyhowSource {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_entity_fields() {
        let err = CoreError::not_found("Project", "abc");
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
        let fields = err.fields().expect("fields");
        assert_eq!(fields.get("entity").map(String::as_str), Some("Project"));
        assert_eq!(fields.get("id").map(String::as_str), Some("abc"));
        assert_eq!(err.kind().http_status_code(), 404);
    }

    #[test]
    fn write_failure_hides_cause_in_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = CoreError::write_failure(anyhow::Error::new(io));
        assert_eq!(err.message(), "Import failed");
        assert_eq!(err.kind().code(), "IMPORT_FAILED");
        assert!(err.source().is_some());
    }

    #[test]
    fn kinds_map_to_client_and_server_statuses() {
        assert_eq!(CoreErrorKind::BadBundle.http_status_code(), 400);
        assert_eq!(CoreErrorKind::Forbidden.http_status_code(), 403);
        assert_eq!(CoreErrorKind::Unauthorized.http_status_code(), 401);
        assert_eq!(CoreErrorKind::PayloadTooLarge.http_status_code(), 413);
        assert_eq!(CoreErrorKind::WriteFailure.http_status_code(), 500);
    }

    #[test]
    fn anyhow_errors_become_internal() {
        let err: CoreError = anyhow::anyhow!("boom").into();
        assert_eq!(err.kind(), CoreErrorKind::Internal);
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
    }
}
