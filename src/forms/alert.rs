use crate::{
    core::domain::{error::GecosError, value_object::ResourceId},
    staging::SaveFailure,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Error,
    Warning,
    Info,
}

/// A dismissible message shown above a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

impl Alert {
    /// A staged write failed on commit.
    pub fn save_failed(failure: &SaveFailure) -> Self {
        let message = match failure.status {
            Some(status) => format!("{} ({}): {}", failure.key, status, failure.message),
            None => format!("{}: {}", failure.key, failure.message),
        };
        Self {
            level: AlertLevel::Error,
            title: "Error saving the object".to_string(),
            message,
        }
    }

    /// A request failed outside of a commit. Suppressed errors were already
    /// reported and produce no alert.
    pub fn from_error(id: Option<&ResourceId>, error: &GecosError) -> Option<Self> {
        if error.is_suppressed() {
            return None;
        }
        let subject = id.map(ToString::to_string).unwrap_or_else(|| "new object".to_string());
        Some(Self {
            level: AlertLevel::Error,
            title: "Request failed".to_string(),
            message: format!("{}: {}", subject, error),
        })
    }

    /// The resource is already queued for deletion.
    pub fn staged_for_deletion(id: &ResourceId) -> Self {
        Self {
            level: AlertLevel::Warning,
            title: "Already marked for deletion".to_string(),
            message: format!(
                "{} will be deleted on the next save; further changes are ignored",
                id
            ),
        }
    }

    /// Someone else modified the resource being edited.
    pub fn changed_elsewhere(id: &ResourceId) -> Self {
        Self {
            level: AlertLevel::Warning,
            title: "Object modified".to_string(),
            message: format!(
                "Someone else changed {} while you were editing it; reload before saving",
                id
            ),
        }
    }

    /// Someone else deleted the resource being edited.
    pub fn deleted_elsewhere(id: &ResourceId) -> Self {
        Self {
            level: AlertLevel::Warning,
            title: "Object deleted".to_string(),
            message: format!("Someone else deleted {} while you were editing it", id),
        }
    }
}
