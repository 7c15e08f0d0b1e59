//! Policy definitions that can be attached to resources.

use crate::core::domain::{model::resource_type::ResourceType, value_object::ResourceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A policy as listed by `GET /api/policies/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Policy {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Resource types the policy can be attached to.
    #[serde(default)]
    pub targets: Vec<ResourceType>,
    #[serde(default)]
    pub is_emitter_policy: bool,
    /// Form schema of the policy values.
    #[serde(default)]
    pub schema: Value,
}

/// Filters of the policy lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyQuery {
    pub ids: Vec<ResourceId>,
    pub ou_id: Option<ResourceId>,
    pub item_id: Option<ResourceId>,
}
