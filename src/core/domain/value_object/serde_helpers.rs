//! Serde helpers for the GECOS wire format.

use crate::core::domain::value_object::NodePath;
use serde::{Deserialize, Deserializer, Serializer};

/// Serialization and deserialization of a [`NodePath`] as the comma-joined
/// string the server uses.
pub mod comma_path {
    use super::*;

    pub fn serialize<S>(path: &NodePath, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&path.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NodePath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NodePath::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Same as [`comma_path`] for optional paths; a missing or empty string
/// becomes `None`.
pub mod opt_comma_path {
    use super::*;

    pub fn serialize<S>(path: &Option<NodePath>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match path {
            Some(path) => serializer.serialize_str(&path.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NodePath>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(raw) if !raw.trim().is_empty() => NodePath::parse(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
