use crate::core::domain::error::ValidationError;
use url::Url;

/// Maximum accepted length of the server base URL.
const MAX_URL_LENGTH: usize = 2083;

/// A validated GECOS Control Center base URL.
///
/// The value always ends with a slash so API paths can be joined onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GecosUrl(Url);

impl GecosUrl {
    /// Parses and validates a base URL.
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        validate_url(value)?;
        let normalized = if value.ends_with('/') {
            value.to_string()
        } else {
            format!("{}/", value)
        };
        Url::parse(&normalized)
            .map(Self)
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))
    }

    /// Joins an API path (`api/nodes/`) onto the base URL.
    pub fn join(&self, path: &str) -> Result<Url, ValidationError> {
        self.0
            .join(path.trim_start_matches('/'))
            .map_err(|e| ValidationError::Format(format!("Invalid API path '{}': {}", path, e)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validates a base URL: http(s) scheme, a host, bounded length.
pub(crate) fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed =
        Url::parse(url).map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(
            "Invalid scheme. Must be one of: http, https".to_string(),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::ConstraintViolation(
            "URL must include a host".to_string(),
        ));
    }

    Ok(())
}
