mod field_rule;
mod gecos_url;
mod node_path;
mod resource_id;
pub(crate) mod serde_helpers;

pub use field_rule::FieldRule;
pub use gecos_url::GecosUrl;
pub use node_path::NodePath;
pub use resource_id::ResourceId;

