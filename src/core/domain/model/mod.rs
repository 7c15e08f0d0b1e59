pub mod catalog;
pub mod gecos_connection;
pub mod job;
pub mod list_page;
pub mod live_event;
pub mod node_record;
pub mod policy;
pub mod resource;
pub mod resource_type;
