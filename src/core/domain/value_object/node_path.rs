use crate::core::domain::{error::ValidationError, value_object::ResourceId};
use std::fmt;

/// Ordered list of ancestor ids, starting at the `root` marker.
///
/// On the wire a path is the comma-joined id list (`"root,a,b"`). A node's
/// own id is never part of its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<ResourceId>);

impl NodePath {
    /// Path made of the root marker only (parent of top-level nodes).
    #[must_use]
    pub fn root() -> Self {
        Self(vec![ResourceId::root()])
    }

    /// Parses a comma-joined path. Empty segments are ignored.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let ids: Vec<ResourceId> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ResourceId::new)
            .collect::<Result<_, _>>()?;
        match ids.first() {
            Some(first) if first.is_root() => Ok(Self(ids)),
            Some(_) => Err(ValidationError::Format(format!(
                "Path '{}' must start with '{}'",
                value,
                ResourceId::ROOT
            ))),
            None => Err(ValidationError::Field {
                field: "path".to_string(),
                message: "Path cannot be empty".to_string(),
            }),
        }
    }

    pub(crate) fn from_ids(ids: Vec<ResourceId>) -> Self {
        Self(ids)
    }

    #[must_use]
    pub fn ids(&self) -> &[ResourceId] {
        &self.0
    }

    /// Last id of the path: the parent of the node that owns this path.
    #[must_use]
    pub fn last(&self) -> Option<&ResourceId> {
        self.0.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.0.contains(id)
    }

    /// Path of the children of the node at the end of this path.
    #[must_use]
    pub fn child(&self, id: &ResourceId) -> Self {
        let mut ids = self.0.clone();
        ids.push(id.clone());
        Self(ids)
    }

}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ResourceId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path = NodePath::parse("root,a,b").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.last().unwrap().as_str(), "b");
        assert_eq!(path.to_string(), "root,a,b");
    }

    #[test]
    fn test_parse_requires_root() {
        assert!(NodePath::parse("a,b").is_err());
        assert!(NodePath::parse("").is_err());
    }

    #[test]
    fn test_child_appends_id() {
        let path = NodePath::root().child(&ResourceId::from("a"));
        assert_eq!(path.to_string(), "root,a");
        assert!(path.contains(&ResourceId::root()));
        assert_eq!(path.last().unwrap().as_str(), "a");
    }
}
