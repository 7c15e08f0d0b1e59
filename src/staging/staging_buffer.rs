use crate::core::{
    domain::{
        error::{GecosError, GecosResult, ValidationError},
        model::resource::Resource,
        value_object::ResourceId,
    },
    infrastructure::api_client::ApiClient,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

/// How a model is staged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Extra query arguments sent with the write.
    pub arguments: Vec<(String, String)>,
    /// Stage a deletion instead of a create/update.
    pub destroy: bool,
}

impl SaveOptions {
    pub fn destroy() -> Self {
        Self {
            arguments: Vec::new(),
            destroy: true,
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push((key.into(), value.into()));
        self
    }
}

/// Key of a staged entry. Unsaved resources have no server id yet and get a
/// local one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StageKey {
    Remote(ResourceId),
    Local(u64),
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKey::Remote(id) => write!(f, "{}", id),
            StageKey::Local(n) => write!(f, "new-{}", n),
        }
    }
}

/// Why a staged write failed; enough to build the user-facing alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub key: StageKey,
    pub status: Option<u16>,
    pub message: String,
}

/// What happened to a staged entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedOutcome {
    /// Created or updated; carries the server response.
    Saved(Value),
    /// Deleted; carries the server response.
    Deleted(Value),
    Failed(SaveFailure),
    /// Removed from the buffer without reaching the server.
    Dropped,
}

/// Resolves once the staged entry has been committed or dropped.
#[derive(Debug)]
pub struct StagedHandle {
    key: StageKey,
    receiver: oneshot::Receiver<StagedOutcome>,
}

impl StagedHandle {
    pub fn key(&self) -> &StageKey {
        &self.key
    }

    /// Waits for the outcome of the entry.
    pub async fn outcome(self) -> StagedOutcome {
        self.receiver.await.unwrap_or(StagedOutcome::Dropped)
    }
}

/// One pending write.
#[derive(Debug)]
pub struct StagingEntry {
    pub key: StageKey,
    pub model: Resource,
    pub pending_arguments: Vec<(String, String)>,
    pub marked_for_deletion: bool,
    waiters: Vec<oneshot::Sender<StagedOutcome>>,
}

impl StagingEntry {
    fn resolve(self, outcome: StagedOutcome) {
        for waiter in self.waiters {
            // The caller may have dropped its handle.
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Result of [`StagingBuffer::save_all`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    pub saved: Vec<StageKey>,
    pub deleted: Vec<StageKey>,
    pub failed: Vec<SaveFailure>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered buffer of pending create/update/delete operations.
///
/// Writes are only sent on [`StagingBuffer::save_all`]. Once a resource is
/// staged for deletion every further attempt to stage it is rejected with
/// [`GecosError::StagedForDeletion`].
#[derive(Debug)]
pub struct StagingBuffer {
    api: Arc<ApiClient>,
    entries: Vec<StagingEntry>,
    next_local: u64,
}

impl StagingBuffer {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            entries: Vec::new(),
            next_local: 0,
        }
    }

    /// Stages `model`.
    ///
    /// Staging an id that is already staged for update replaces the model
    /// and arguments in place; staging it with `destroy` turns the entry
    /// into a deletion.
    ///
    /// # Errors
    /// * `GecosError::StagedForDeletion` if the id is already queued for
    ///   deletion. The buffer is left untouched.
    /// * `GecosError::Validation` when deleting a resource that was never
    ///   created.
    pub fn add(&mut self, model: Resource, options: SaveOptions) -> GecosResult<StagedHandle> {
        let (sender, receiver) = oneshot::channel();

        let Some(id) = model.id.clone() else {
            if options.destroy {
                return Err(ValidationError::ConstraintViolation(
                    "Cannot stage the deletion of an unsaved resource".to_string(),
                )
                .into());
            }
            self.next_local += 1;
            let key = StageKey::Local(self.next_local);
            tracing::debug!(key = %key, "Staging new resource");
            self.entries.push(StagingEntry {
                key: key.clone(),
                model,
                pending_arguments: options.arguments,
                marked_for_deletion: false,
                waiters: vec![sender],
            });
            return Ok(StagedHandle { key, receiver });
        };

        if self.is_marked_for_deletion(&id) {
            tracing::warn!(id = %id, "Resource already staged for deletion");
            return Err(GecosError::StagedForDeletion { id: id.to_string() });
        }

        let key = StageKey::Remote(id.clone());
        match self.position(&key) {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.model = model;
                entry.pending_arguments = options.arguments;
                entry.marked_for_deletion = options.destroy;
                entry.waiters.push(sender);
            }
            None => self.entries.push(StagingEntry {
                key: key.clone(),
                model,
                pending_arguments: options.arguments,
                marked_for_deletion: options.destroy,
                waiters: vec![sender],
            }),
        }
        tracing::debug!(id = %id, destroy = options.destroy, "Staged resource");
        Ok(StagedHandle { key, receiver })
    }

    /// Stages several models with the same options, one result per model.
    pub fn add_many(
        &mut self,
        models: Vec<Resource>,
        options: SaveOptions,
    ) -> Vec<GecosResult<StagedHandle>> {
        models
            .into_iter()
            .map(|model| self.add(model, options.clone()))
            .collect()
    }

    /// Sends every staged write, in staging order.
    ///
    /// Each entry is removed whatever its outcome; the buffer is always
    /// empty afterwards.
    pub async fn save_all(&mut self) -> SaveReport {
        let entries = std::mem::take(&mut self.entries);
        let mut report = SaveReport::default();

        for entry in entries {
            let key = entry.key.clone();
            let result = match (&entry.model.id, entry.marked_for_deletion) {
                (Some(id), true) => self
                    .api
                    .delete_resource(entry.model.resource_type, id)
                    .await
                    .map(StagedOutcome::Deleted),
                _ => self
                    .api
                    .save_resource(&entry.model, &entry.pending_arguments)
                    .await
                    .map(StagedOutcome::Saved),
            };

            let outcome = match result {
                Ok(outcome) => {
                    match &outcome {
                        StagedOutcome::Deleted(_) => report.deleted.push(key),
                        _ => report.saved.push(key),
                    }
                    outcome
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Staged write failed");
                    let failure = SaveFailure {
                        key,
                        status: e.status(),
                        message: e.to_string(),
                    };
                    report.failed.push(failure.clone());
                    StagedOutcome::Failed(failure)
                }
            };
            entry.resolve(outcome);
        }

        tracing::info!(
            saved = report.saved.len(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Committed staged changes"
        );
        report
    }

    /// Unstages `id`. With `restore`, the resource is fetched again so the
    /// caller can throw away its unsaved local edits.
    ///
    /// Returns the fresh copy when one was fetched.
    pub async fn drop_model(
        &mut self,
        id: &ResourceId,
        restore: bool,
    ) -> GecosResult<Option<Resource>> {
        let Some(entry) = self.take(&StageKey::Remote(id.clone())) else {
            return Ok(None);
        };
        let resource_type = entry.model.resource_type;
        entry.resolve(StagedOutcome::Dropped);

        if !restore {
            return Ok(None);
        }
        let fresh = self.api.fetch_resource(resource_type, id).await?;
        Ok(Some(fresh))
    }

    /// Silently unstages `id` after the server reported it changed or was
    /// deleted elsewhere. Never touches the network.
    pub fn discard_remote(&mut self, id: &ResourceId) -> bool {
        match self.take(&StageKey::Remote(id.clone())) {
            Some(entry) => {
                tracing::debug!(id = %id, "Discarding staged entry after remote update");
                entry.resolve(StagedOutcome::Dropped);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.position(&StageKey::Remote(id.clone())).is_some()
    }

    pub fn is_marked_for_deletion(&self, id: &ResourceId) -> bool {
        self.entries.iter().any(|entry| {
            entry.marked_for_deletion && entry.key == StageKey::Remote(id.clone())
        })
    }

    pub fn entry(&self, key: &StageKey) -> Option<&StagingEntry> {
        self.entries.iter().find(|entry| &entry.key == key)
    }

    /// Keys in staging order.
    pub fn staged_keys(&self) -> Vec<StageKey> {
        self.entries.iter().map(|entry| entry.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &StageKey) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.key == key)
    }

    fn take(&mut self, key: &StageKey) -> Option<StagingEntry> {
        self.position(key).map(|index| self.entries.remove(index))
    }
}
