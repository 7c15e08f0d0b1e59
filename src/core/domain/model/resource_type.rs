//! Kinds of resources managed by the console.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of a node in the organizational hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Ou,
    User,
    Computer,
    Printer,
    Group,
    Storage,
    Repository,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Ou,
        ResourceType::User,
        ResourceType::Computer,
        ResourceType::Printer,
        ResourceType::Group,
        ResourceType::Storage,
        ResourceType::Repository,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Ou => "ou",
            ResourceType::User => "user",
            ResourceType::Computer => "computer",
            ResourceType::Printer => "printer",
            ResourceType::Group => "group",
            ResourceType::Storage => "storage",
            ResourceType::Repository => "repository",
        }
    }

    /// Plural used by the REST collections.
    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceType::Repository => "repositories",
            ResourceType::Ou => "ous",
            ResourceType::User => "users",
            ResourceType::Computer => "computers",
            ResourceType::Printer => "printers",
            ResourceType::Group => "groups",
            ResourceType::Storage => "storages",
        }
    }

    /// Collection path of this type (`api/ous/`).
    #[must_use]
    pub fn collection_path(&self) -> String {
        format!("api/{}/", self.plural())
    }

    /// Path of a single resource (`api/ous/{id}/`).
    #[must_use]
    pub fn resource_path(&self, id: &str) -> String {
        format!("api/{}/{}/", self.plural(), id)
    }

    /// Only organizational units hold children in the tree.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, ResourceType::Ou)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
