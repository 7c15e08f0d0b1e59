use crate::{
    core::{
        domain::{
            error::{GecosError, GecosResult, ValidationError},
            model::{list_page::ListPage, node_record::NodeRecord},
            value_object::{NodePath, ResourceId},
        },
        infrastructure::api_client::ApiClient,
    },
    tree::tree_node::{NodeState, NodeStatus, PagedChildren, TreeNode},
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Structural change published to tree subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    /// The whole tree was rebuilt.
    Reloaded,
    /// A node received a new page of children.
    ChildrenLoaded { id: ResourceId },
    /// A node's display name changed.
    NodeUpdated { id: ResourceId },
    /// Placeholders received their metadata.
    NodesResolved { ids: Vec<ResourceId> },
    /// A node was opened or closed.
    Toggled { id: ResourceId, closed: bool },
}

/// In-memory mirror of the organizational hierarchy.
///
/// Nodes live in an arena keyed by id. The arena only ever holds nodes
/// reachable from the synthetic root through inline children or the
/// current page of a paginated node, so a lookup by id only finds what a
/// breadth-first walk would find.
#[derive(Debug)]
pub struct NodeTree {
    api: Arc<ApiClient>,
    nodes: HashMap<ResourceId, TreeNode>,
    changes: broadcast::Sender<TreeChange>,
}

impl NodeTree {
    /// Creates a tree holding only the synthetic root.
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let mut nodes = HashMap::new();
        nodes.insert(ResourceId::root(), TreeNode::root());
        Self {
            api,
            nodes,
            changes,
        }
    }

    /// Registers an observer of structural changes.
    pub fn subscribe(&self) -> broadcast::Receiver<TreeChange> {
        self.changes.subscribe()
    }

    /// Discards the tree and rebuilds it from the depth-limited root
    /// listing. On failure the previous tree is kept.
    pub async fn reload_tree(&mut self) -> GecosResult<()> {
        let config = self.api.config();
        let page = self
            .api
            .fetch_nodes(
                &NodePath::root(),
                Some(config.max_depth),
                config.root_page_size,
                None,
            )
            .await?;

        self.nodes.clear();
        self.nodes.insert(ResourceId::root(), TreeNode::root());
        self.insert_listing(page.items);
        tracing::info!(nodes = self.nodes.len() - 1, "Tree reloaded");
        self.notify(TreeChange::Reloaded);
        Ok(())
    }

    /// Builds the tree from an already fetched listing. Every listed node
    /// starts meta-only; missing ancestors become unknown placeholders.
    /// Known nodes listed under another parent are moved there.
    pub fn insert_listing(&mut self, mut records: Vec<NodeRecord>) {
        records.sort_by_key(|record| record.path.len());
        for record in records {
            self.ensure_path(record.path.ids(), false);
            if self.nodes.contains_key(&record.id) {
                self.merge_record(&record);
            } else {
                let id = record.id.clone();
                let parent = record.path.last().cloned();
                self.nodes.insert(id.clone(), TreeNode::from_record(record));
                if let Some(parent) = parent {
                    self.attach_child(&parent, &id);
                }
            }
        }
    }

    /// Walks `path`, creating unknown placeholders for ids never seen, and
    /// opens every node along the way.
    ///
    /// Returns the ids on the path that are still unknown.
    pub fn make_path(&mut self, path: &NodePath) -> Vec<ResourceId> {
        self.ensure_path(path.ids(), true);
        path.ids()
            .iter()
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .is_some_and(|node| node.status() == NodeStatus::Unknown)
            })
            .cloned()
            .collect()
    }

    /// Shows the children of the node at the end of `path`.
    ///
    /// Placeholders are created for unseen ancestors and resolved in one
    /// batch, then the target node is promoted to paginated with its first
    /// page. When `reveal` is given and not on that page, following pages
    /// are fetched one after another until it shows up.
    ///
    /// Returns whether `reveal` (if any) is visible. `silent` suppresses
    /// the change notification.
    pub async fn load_from_path(
        &mut self,
        path: &NodePath,
        reveal: Option<&ResourceId>,
        silent: bool,
    ) -> GecosResult<bool> {
        let target = path.last().cloned().ok_or_else(|| ValidationError::Field {
            field: "path".to_string(),
            message: "Path cannot be empty".to_string(),
        })?;

        let unknown = self.make_path(path);
        if !unknown.is_empty() {
            self.resolve(&unknown, true).await?;
        }

        self.fetch_page(&target, 1).await?;

        let found = match reveal {
            Some(child) => self.search_page_for_node(&target, child).await?,
            None => true,
        };

        tracing::debug!(path = %path, found, "Loaded path");
        if !silent {
            self.notify(TreeChange::ChildrenLoaded { id: target });
        }
        Ok(found)
    }

    /// Pages forward through `parent`'s children until `child` is on the
    /// current page or the last page is reached. Pages are fetched strictly
    /// one at a time.
    pub async fn search_page_for_node(
        &mut self,
        parent: &ResourceId,
        child: &ResourceId,
    ) -> GecosResult<bool> {
        loop {
            let node = self
                .nodes
                .get(parent)
                .ok_or_else(|| GecosError::NotFound(parent.to_string()))?;

            if node.children().contains(child) {
                return Ok(true);
            }

            let Some(page) = node.paged() else {
                return Ok(false);
            };
            if page.current_page >= page.total_pages {
                return Ok(false);
            }
            let next = page.current_page + 1;
            self.fetch_page(parent, next).await?;
        }
    }

    /// Fetches an arbitrary page of a node's children.
    pub async fn go_to_page(&mut self, id: &ResourceId, page: u32) -> GecosResult<()> {
        if page == 0 {
            return Err(ValidationError::ConstraintViolation(
                "Pages are numbered from 1".to_string(),
            )
            .into());
        }
        if let Some(paged) = self.nodes.get(id).and_then(TreeNode::paged) {
            if page > paged.total_pages {
                return Err(ValidationError::ConstraintViolation(format!(
                    "Page {} is beyond the last page ({})",
                    page, paged.total_pages
                ))
                .into());
            }
        }
        self.fetch_page(id, page).await?;
        self.notify(TreeChange::ChildrenLoaded { id: id.clone() });
        Ok(())
    }

    /// Re-fetches the children of the node at the end of `path`.
    ///
    /// `root` rebuilds the whole tree; nodes that are not in the tree are
    /// not visible and are left alone. Neither the open state nor the load
    /// state of any node changes: a paginated node refetches its current
    /// page, any other node re-reads its inline children.
    pub async fn reload_subtree(&mut self, path: &NodePath) -> GecosResult<()> {
        let Some(target) = path.last() else {
            return Ok(());
        };
        if target.is_root() {
            return self.reload_tree().await;
        }
        let Some(node) = self.nodes.get(target) else {
            tracing::debug!(path = %path, "Subtree not loaded, nothing to reload");
            return Ok(());
        };

        let target = target.clone();
        match node.paged().map(|page| page.current_page) {
            Some(current) => {
                self.fetch_page(&target, current).await?;
                // The page may have vanished if children were removed.
                if let Some(last) = self
                    .nodes
                    .get(&target)
                    .and_then(TreeNode::paged)
                    .map(|page| page.total_pages)
                    .filter(|total| *total < current)
                {
                    self.fetch_page(&target, last).await?;
                }
                self.notify(TreeChange::ChildrenLoaded { id: target });
                Ok(())
            }
            None if node.resource_type.is_some_and(|t| !t.is_container()) => Ok(()),
            None => {
                self.refresh_inline_children(&target).await?;
                self.notify(TreeChange::ChildrenLoaded { id: target });
                Ok(())
            }
        }
    }

    /// Resolves unknown placeholders in one `oids` lookup.
    ///
    /// Ids that are not in the tree or already known are ignored; with
    /// nothing left to resolve no request is made. Resolved nodes become
    /// meta-only, never paginated.
    pub async fn resolve_unknown_nodes(&mut self, ids: &[ResourceId]) -> GecosResult<usize> {
        self.resolve(ids, false).await
    }

    /// Re-fetches a node's display name without touching the structure.
    ///
    /// Returns `false` when the node is not in the tree.
    pub async fn update_node_by_id(&mut self, id: &ResourceId) -> GecosResult<bool> {
        let Some(resource_type) = self.nodes.get(id).and_then(|node| node.resource_type) else {
            return Ok(false);
        };
        let resource = self.api.fetch_resource(resource_type, id).await?;
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = resource.name;
        }
        self.notify(TreeChange::NodeUpdated { id: id.clone() });
        Ok(true)
    }

    /// Looks a node up among the materialized ones. Children on pages that
    /// have not been fetched are not found.
    pub fn find_node_by_id(&self, id: &ResourceId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Breadth-first search over inline children and current pages.
    pub fn find_nodes<P>(&self, predicate: P) -> Vec<&TreeNode>
    where
        P: Fn(&TreeNode) -> bool,
    {
        let mut found = Vec::new();
        let mut queue: VecDeque<&ResourceId> = VecDeque::new();
        let root = ResourceId::root();
        if let Some(node) = self.nodes.get(&root) {
            queue.extend(node.children());
        }
        while let Some(id) = queue.pop_front() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if predicate(node) {
                found.push(node);
            }
            queue.extend(node.children());
        }
        found
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.get(&ResourceId::root())
    }

    /// Full path of a materialized node, itself included.
    pub fn path_to(&self, id: &ResourceId) -> Option<NodePath> {
        self.nodes.get(id).map(TreeNode::children_path)
    }

    /// Materialized children of `id`, in server order.
    pub fn children_of(&self, id: &ResourceId) -> Vec<&TreeNode> {
        self.nodes
            .get(id)
            .map(|node| {
                node.children()
                    .iter()
                    .filter_map(|child| self.nodes.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of materialized nodes, excluding the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn open(&mut self, id: &ResourceId) -> bool {
        self.set_closed(id, false)
    }

    pub fn close(&mut self, id: &ResourceId) -> bool {
        self.set_closed(id, true)
    }

    /// Flips the `closed` flag; returns the new value.
    pub fn toggle(&mut self, id: &ResourceId) -> Option<bool> {
        let closed = !self.nodes.get(id)?.closed;
        self.set_closed(id, closed);
        Some(closed)
    }

    fn set_closed(&mut self, id: &ResourceId, closed: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.closed = closed;
                self.notify(TreeChange::Toggled {
                    id: id.clone(),
                    closed,
                });
                true
            }
            None => false,
        }
    }

    async fn resolve(&mut self, ids: &[ResourceId], silent: bool) -> GecosResult<usize> {
        let mut seen = HashSet::new();
        let pending: Vec<ResourceId> = ids
            .iter()
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .is_some_and(|node| node.status() == NodeStatus::Unknown)
            })
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();

        if pending.is_empty() {
            return Ok(0);
        }

        let records = self.api.fetch_nodes_by_ids(&pending).await?;
        let mut resolved = Vec::new();
        for record in records {
            let unknown = self
                .nodes
                .get(&record.id)
                .is_some_and(|node| node.status() == NodeStatus::Unknown);
            if unknown {
                self.merge_record(&record);
                resolved.push(record.id);
            }
        }

        tracing::debug!(requested = pending.len(), resolved = resolved.len(), "Resolved unknown nodes");
        let count = resolved.len();
        if !silent && count > 0 {
            self.notify(TreeChange::NodesResolved { ids: resolved });
        }
        Ok(count)
    }

    async fn fetch_page(&mut self, id: &ResourceId, page: u32) -> GecosResult<()> {
        let path = self
            .nodes
            .get(id)
            .map(TreeNode::children_path)
            .ok_or_else(|| GecosError::NotFound(id.to_string()))?;
        let page_size = self.api.config().page_size;
        let listing = self
            .api
            .fetch_nodes(&path, None, page_size, Some(page))
            .await?;
        self.install_page(id, page, listing);
        Ok(())
    }

    /// Re-reads the direct children of a node that is not paginated and
    /// keeps them inline.
    async fn refresh_inline_children(&mut self, id: &ResourceId) -> GecosResult<()> {
        let path = self
            .nodes
            .get(id)
            .map(TreeNode::children_path)
            .ok_or_else(|| GecosError::NotFound(id.to_string()))?;
        let page_size = self.api.config().root_page_size;
        let listing = self.api.fetch_nodes(&path, None, page_size, None).await?;

        let records = listing
            .items
            .into_iter()
            .filter(|record| record.path == path)
            .collect();
        let children = self.replace_children(id, records);
        if let Some(node) = self.nodes.get_mut(id) {
            *node.state.children_mut() = children;
        }
        Ok(())
    }

    /// Replaces the children of `id` with one fetched page. Children that
    /// are not on the page are dropped together with their subtrees.
    fn install_page(&mut self, id: &ResourceId, page: u32, listing: ListPage<NodeRecord>) {
        let items = self.replace_children(id, listing.items);
        if let Some(node) = self.nodes.get_mut(id) {
            node.state = NodeState::Paginated(PagedChildren {
                current_page: page,
                total_pages: listing.pages.max(1),
                items,
            });
        }
    }

    /// Merges the listed children of `id` into the arena and detaches the
    /// previous children that are no longer listed. Returns the new child
    /// ids in server order; the caller stores them.
    fn replace_children(&mut self, id: &ResourceId, records: Vec<NodeRecord>) -> Vec<ResourceId> {
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            if self.nodes.contains_key(&record.id) {
                self.merge_record(&record);
            } else {
                self.nodes
                    .insert(record.id.clone(), TreeNode::from_record(record.clone()));
            }
            if !items.contains(&record.id) {
                items.push(record.id);
            }
        }

        let previous = self
            .nodes
            .get(id)
            .map(|node| node.children().to_vec())
            .unwrap_or_default();
        for old in previous.iter().filter(|old| !items.contains(old)) {
            self.detach_subtree(old);
        }
        items
    }

    /// Applies a listed record to a node already in the arena. A node listed
    /// under another parent leaves its old parent and takes its
    /// materialized subtree along.
    fn merge_record(&mut self, record: &NodeRecord) {
        let Some(node) = self.nodes.get_mut(&record.id) else {
            return;
        };
        node.apply_record(record);
        if node.path == record.path || record.path.contains(&record.id) {
            return;
        }

        let old_path = std::mem::replace(&mut node.path, record.path.clone());
        tracing::debug!(id = %record.id, from = %old_path, to = %record.path, "Node moved");
        if let Some(old_parent) = old_path.last() {
            if let Some(parent) = self.nodes.get_mut(old_parent) {
                parent.state.children_mut().retain(|child| child != &record.id);
            }
        }
        self.ensure_path(record.path.ids(), false);
        if let Some(new_parent) = record.path.last() {
            self.attach_child(new_parent, &record.id);
        }
        self.rebase_subtree(&record.id);
    }

    /// Rewrites the paths of the materialized descendants of `id` after it
    /// moved.
    fn rebase_subtree(&mut self, id: &ResourceId) {
        let mut stack: Vec<(ResourceId, NodePath)> = match self.nodes.get(id) {
            Some(node) => {
                let path = node.children_path();
                node.children()
                    .iter()
                    .map(|child| (child.clone(), path.clone()))
                    .collect()
            }
            None => return,
        };
        while let Some((current, path)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(&current) else {
                continue;
            };
            let children_path = path.child(&current);
            node.path = path;
            stack.extend(
                node.children()
                    .iter()
                    .map(|child| (child.clone(), children_path.clone())),
            );
        }
    }

    fn ensure_path(&mut self, ids: &[ResourceId], open: bool) {
        for (index, id) in ids.iter().enumerate() {
            if !self.nodes.contains_key(id) {
                let ancestors = NodePath::from_ids(ids[..index].to_vec());
                self.nodes
                    .insert(id.clone(), TreeNode::placeholder(id.clone(), ancestors));
                if let Some(parent) = index.checked_sub(1).map(|i| &ids[i]) {
                    self.attach_child(parent, id);
                }
            }
            if open {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.closed = false;
                }
            }
        }
    }

    fn attach_child(&mut self, parent: &ResourceId, child: &ResourceId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            let children = node.state.children_mut();
            if !children.contains(child) {
                children.push(child.clone());
            }
        }
    }

    fn detach_subtree(&mut self, id: &ResourceId) {
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children().iter().cloned());
            }
        }
    }

    fn notify(&self, change: TreeChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}
