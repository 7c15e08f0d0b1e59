//! Node entries of the `/api/nodes/` listing.

use crate::core::domain::{
    model::resource_type::ResourceType,
    value_object::{NodePath, ResourceId, serde_helpers},
};
use serde::{Deserialize, Serialize};

/// Metadata of one node as listed by `GET /api/nodes/`.
///
/// The listing only carries what the tree needs to draw the node; full
/// documents are fetched through the per-type endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeRecord {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Ancestors of the node; never includes the node itself.
    #[serde(with = "serde_helpers::comma_path")]
    pub path: NodePath,
}
