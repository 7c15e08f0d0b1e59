//! Background job records shown in the live job log.

use crate::core::domain::value_object::ResourceId;
use serde::{Deserialize, Serialize};

/// Execution status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Finished,
    Errors,
    Warnings,
    Paused,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Wire name, as used by the `status` filter of the job log.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Finished => "finished",
            JobStatus::Errors => "errors",
            JobStatus::Warnings => "warnings",
            JobStatus::Paused => "paused",
            JobStatus::Unknown => "unknown",
        }
    }
}

/// A job as pushed or listed by the server. The console never mutates it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobRecord {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    pub status: JobStatus,
    /// Parent job when this one is a child of a macro job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceId>,
    #[serde(default)]
    pub archived: bool,
    /// Administrator who triggered the job.
    #[serde(default, rename = "administrator_username")]
    pub user: Option<String>,
    /// Computer the job runs on.
    #[serde(default, rename = "computername")]
    pub workstation: Option<String>,
    /// Policy or action that produced the job.
    #[serde(default, rename = "policyname")]
    pub source: Option<String>,
    /// Affected object name.
    #[serde(default, rename = "objname")]
    pub object_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
}

/// Filters of the job listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    pub page: u32,
    pub page_size: u32,
    pub status: Option<JobStatus>,
    pub archived: Option<bool>,
}
