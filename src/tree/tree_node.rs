use crate::core::domain::{
    model::{node_record::NodeRecord, resource_type::ResourceType},
    value_object::{NodePath, ResourceId},
};

/// The page of children currently held by a paginated node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedChildren {
    pub current_page: u32,
    pub total_pages: u32,
    /// Children on `current_page` only.
    pub items: Vec<ResourceId>,
}

/// Load state of a node and where its children live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// Seen in a path before its metadata was fetched.
    Unknown { children: Vec<ResourceId> },
    /// Name and type known; children held inline.
    MetaOnly { children: Vec<ResourceId> },
    /// Children come from the server one page at a time.
    Paginated(PagedChildren),
}

/// Discriminant of [`NodeState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Unknown,
    MetaOnly,
    Paginated,
}

impl NodeState {
    pub fn status(&self) -> NodeStatus {
        match self {
            NodeState::Unknown { .. } => NodeStatus::Unknown,
            NodeState::MetaOnly { .. } => NodeStatus::MetaOnly,
            NodeState::Paginated(_) => NodeStatus::Paginated,
        }
    }

    /// Children currently materialized: inline ones, or the current page.
    pub fn children(&self) -> &[ResourceId] {
        match self {
            NodeState::Unknown { children } | NodeState::MetaOnly { children } => children,
            NodeState::Paginated(page) => &page.items,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<ResourceId> {
        match self {
            NodeState::Unknown { children } | NodeState::MetaOnly { children } => children,
            NodeState::Paginated(page) => &mut page.items,
        }
    }
}

/// A node of the console tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: ResourceId,
    /// Empty while the node is [`NodeStatus::Unknown`].
    pub name: String,
    /// `None` for the synthetic root and unresolved placeholders.
    pub resource_type: Option<ResourceType>,
    /// Ancestors, never including `id`.
    pub path: NodePath,
    pub closed: bool,
    pub state: NodeState,
}

impl TreeNode {
    pub(crate) fn root() -> Self {
        Self {
            id: ResourceId::root(),
            name: ResourceId::ROOT.to_string(),
            resource_type: None,
            path: NodePath::default(),
            closed: false,
            state: NodeState::MetaOnly {
                children: Vec::new(),
            },
        }
    }

    pub(crate) fn placeholder(id: ResourceId, path: NodePath) -> Self {
        Self {
            id,
            name: String::new(),
            resource_type: None,
            path,
            closed: true,
            state: NodeState::Unknown {
                children: Vec::new(),
            },
        }
    }

    pub(crate) fn from_record(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            resource_type: Some(record.resource_type),
            path: record.path,
            closed: true,
            state: NodeState::MetaOnly {
                children: Vec::new(),
            },
        }
    }

    /// Fills in name and type; an unknown node becomes meta-only, any other
    /// state is kept.
    pub(crate) fn apply_record(&mut self, record: &NodeRecord) {
        self.name = record.name.clone();
        self.resource_type = Some(record.resource_type);
        if self.status() == NodeStatus::Unknown {
            let children = std::mem::take(self.state.children_mut());
            self.state = NodeState::MetaOnly { children };
        }
    }

    pub fn status(&self) -> NodeStatus {
        self.state.status()
    }

    pub fn children(&self) -> &[ResourceId] {
        self.state.children()
    }

    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    /// Path the server expects when listing this node's children.
    pub fn children_path(&self) -> NodePath {
        self.path.child(&self.id)
    }

    pub fn paged(&self) -> Option<&PagedChildren> {
        match &self.state {
            NodeState::Paginated(page) => Some(page),
            _ => None,
        }
    }
}
