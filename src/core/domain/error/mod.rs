use thiserror::Error;

/// The main error type for GECOS console operations.
///
/// This enum represents all possible errors that can occur while talking
/// to the GECOS Control Center API or mutating the console state:
/// connection problems, HTTP failures, authorization failures, validation
/// failures and staging conflicts.
#[derive(Error, Debug)]
pub enum GecosError {
    /// Represents errors that occur while reaching the server
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the request
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered `403 Forbidden`.
    ///
    /// The global forbidden handler has already been invoked when this
    /// value is returned, so callers should not raise a regular alert.
    ///
    /// # Fields
    /// * `0` - The request path that was rejected
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The server answered with a non-success status other than 403/404
    ///
    /// # Fields
    /// * `status` - The HTTP status code
    /// * `message` - The response body or status text
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The requested resource does not exist server side
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The resource is already queued for deletion in the staging buffer.
    ///
    /// The conflict is reported to the user once, at staging time; every
    /// later consumer must treat this value as "already reported".
    #[error("Resource {id} is already staged for deletion")]
    StagedForDeletion { id: String },

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },
}

impl GecosError {
    /// Returns true when the error must not produce another alert.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        matches!(
            self,
            GecosError::StagedForDeletion { .. } | GecosError::Forbidden(_)
        )
    }

    /// HTTP status attached to the error, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            GecosError::Api { status, .. } => Some(*status),
            GecosError::Forbidden(_) => Some(403),
            GecosError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<ValidationError> for GecosError {
    fn from(error: ValidationError) -> Self {
        GecosError::Validation { source: error }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a GecosError
pub type GecosResult<T> = Result<T, GecosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_conflict_is_suppressed() {
        let err = GecosError::StagedForDeletion {
            id: "abc".to_string(),
        };
        assert!(err.is_suppressed());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_api_error_is_not_suppressed() {
        let err = GecosError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert!(!err.is_suppressed());
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "API error (500): Internal Server Error");
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: GecosError = ValidationError::Format("bad".to_string()).into();
        assert!(matches!(err, GecosError::Validation { .. }));
    }
}
