//! Partially materialized, paginated mirror of the server-side hierarchy.

mod node_tree;
mod tree_node;

pub use node_tree::{NodeTree, TreeChange};
pub use tree_node::{NodeState, NodeStatus, PagedChildren, TreeNode};
