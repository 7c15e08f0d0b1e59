use crate::core::domain::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a server-side resource (the `_id` of the wire object).
///
/// The synthetic tree root uses the literal marker [`ResourceId::ROOT`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Marker used as the parent id of top-level nodes.
    pub const ROOT: &'static str = "root";

    /// Creates a new id after validating it.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_resource_id(&value)?;
        Ok(Self(value))
    }

    /// Creates a new id without validation.
    pub(crate) fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The synthetic root id.
    #[must_use]
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::new_unchecked(value)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validates a resource id.
///
/// Ids travel inside comma-joined paths and id lists, so they may not
/// contain commas or whitespace.
pub(crate) fn validate_resource_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Field {
            field: "id".to_string(),
            message: "Resource id cannot be empty".to_string(),
        });
    }
    if value.chars().any(|c| c == ',' || c.is_whitespace()) {
        return Err(ValidationError::Format(format!(
            "Resource id '{}' contains a comma or whitespace",
            value
        )));
    }
    Ok(())
}
