//! Push notifications delivered by the live update channel.

use crate::core::domain::{
    error::{GecosError, GecosResult},
    model::resource_type::ResourceType,
    value_object::{NodePath, ResourceId, serde_helpers},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The object a `change`/`delete` notification refers to.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventObject {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, with = "serde_helpers::opt_comma_path")]
    pub path: Option<NodePath>,
}

/// The four event kinds the console core reacts to.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A resource was modified elsewhere.
    Change { object: EventObject },
    /// A resource was deleted elsewhere.
    Delete { object: EventObject },
    /// The job list of `user` changed.
    Jobs {
        #[serde(default)]
        user: Option<String>,
    },
    /// The subtree below `path` changed shape.
    UpdateTree { path: String },
}

/// A decoded frame of the live channel.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveMessage {
    Event(LiveEvent),
    /// The server lost its message broker (`{"redis": "error"}`).
    BrokerError,
    /// A chunk of a tailed log file.
    LogData(Value),
    /// An envelope with an action this client does not handle.
    Unknown(String),
}

impl LiveMessage {
    /// Decodes one text frame.
    pub fn parse(frame: &str) -> GecosResult<Self> {
        let value: Value = serde_json::from_str(frame)
            .map_err(|e| GecosError::Decode(format!("Invalid live frame: {}", e)))?;

        if value.get("redis").and_then(Value::as_str) == Some("error") {
            return Ok(LiveMessage::BrokerError);
        }

        let action = value
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match action.as_str() {
            "change" | "delete" | "jobs" | "update_tree" => serde_json::from_value(value)
                .map(LiveMessage::Event)
                .map_err(|e| GecosError::Decode(format!("Invalid '{}' event: {}", action, e))),
            "logdata" => Ok(LiveMessage::LogData(value)),
            _ => Ok(LiveMessage::Unknown(action)),
        }
    }
}
