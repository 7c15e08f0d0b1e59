//! Generic resource document exchanged with the `/api/{type}s/` endpoints.

use crate::core::domain::{
    model::resource_type::ResourceType,
    value_object::{NodePath, ResourceId, serde_helpers},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A resource of any type as returned by `GET /api/{type}s/{id}/`.
///
/// The fields every type shares are typed; the type-specific ones (email,
/// ip address, printer model, repository uri, ...) stay in `attributes`
/// so forms can edit them generically.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Resource {
    /// Server identifier; `None` until the resource has been created.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Ancestor ids, starting at `root`.
    #[serde(
        default,
        with = "serde_helpers::opt_comma_path",
        skip_serializing_if = "Option::is_none"
    )]
    pub path: Option<NodePath>,
    /// Policies attached to the resource, keyed by policy id.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub policies: Map<String, Value>,
    /// Every other field of the document.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Resource {
    /// A new, unsaved resource placed under `path`.
    #[must_use]
    pub fn new(resource_type: ResourceType, name: impl Into<String>, path: NodePath) -> Self {
        Self {
            id: None,
            name: name.into(),
            resource_type,
            path: Some(path),
            policies: Map::new(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// String value of a field, looking at the typed fields first.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.clone()),
            "path" => self.path.as_ref().map(ToString::to_string),
            _ => self.attributes.get(field).and_then(|value| match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
        }
    }

    /// Sets a field; `name` goes to the typed field, anything else to
    /// `attributes`.
    pub fn set_field(&mut self, field: &str, value: Value) {
        if field == "name" {
            self.name = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.attributes.insert(field.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_user() {
        let resource: Resource = serde_json::from_value(json!({
            "_id": "5a1f0e3b9c7d2e0012345678",
            "name": "jdoe",
            "type": "user",
            "path": "root,ou1,ou2",
            "email": "jdoe@example.org",
            "policies": {"p1": {"enabled": true}}
        }))
        .unwrap();

        assert_eq!(resource.id.as_ref().unwrap().as_str(), "5a1f0e3b9c7d2e0012345678");
        assert_eq!(resource.resource_type, ResourceType::User);
        assert_eq!(resource.path.as_ref().unwrap().len(), 3);
        assert_eq!(resource.field("email").as_deref(), Some("jdoe@example.org"));
        assert!(resource.policies.contains_key("p1"));
    }

    #[test]
    fn test_new_resource_serializes_without_id() {
        let resource = Resource::new(ResourceType::Ou, "Sales", NodePath::root());
        let value = serde_json::to_value(&resource).unwrap();
        assert!(value.get("_id").is_none());
        assert_eq!(value["path"], "root");
        assert_eq!(value["type"], "ou");
    }
}
