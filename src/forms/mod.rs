//! Per-type resource editors.

mod alert;
mod resource_editor;
mod schema;

pub use alert::{Alert, AlertLevel};
pub use resource_editor::ResourceEditor;
pub use schema::{FieldSpec, form_schema};
