use crate::{
    console::ConsoleContext,
    core::domain::{
        error::{GecosError, GecosResult, ValidationError},
        model::{policy::Policy, resource::Resource, resource_type::ResourceType},
        value_object::ResourceId,
    },
    forms::{
        alert::Alert,
        schema::{FieldSpec, form_schema},
    },
    live::ViewNotice,
    staging::{SaveOptions, StagedHandle, StagingBuffer},
};
use serde_json::Value;

/// Form state of one resource.
///
/// Edits stay local until [`ResourceEditor::stage`] hands the model to the
/// staging buffer. Field checks run before anything is staged, and a
/// remote change or deletion of the resource disables saving.
#[derive(Debug, Clone)]
pub struct ResourceEditor {
    model: Resource,
    errors: Vec<ValidationError>,
    alert: Option<Alert>,
    save_disabled: bool,
}

impl ResourceEditor {
    pub fn new(model: Resource) -> Self {
        Self {
            model,
            errors: Vec::new(),
            alert: None,
            save_disabled: false,
        }
    }

    /// Opens an editor on an existing resource, cache first.
    pub async fn load(
        ctx: &mut ConsoleContext,
        resource_type: ResourceType,
        id: &ResourceId,
    ) -> GecosResult<Self> {
        let model = ctx.resource(resource_type, id).await?;
        Ok(Self::new(model))
    }

    pub fn model(&self) -> &Resource {
        &self.model
    }

    pub fn id(&self) -> Option<&ResourceId> {
        self.model.id.as_ref()
    }

    pub fn schema(&self) -> &'static [FieldSpec] {
        form_schema(self.model.resource_type)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn set_alert(&mut self, alert: Alert) {
        self.alert = Some(alert);
    }

    pub fn is_save_disabled(&self) -> bool {
        self.save_disabled
    }

    pub fn set_field(&mut self, field: &str, value: impl Into<Value>) {
        self.model.set_field(field, value.into());
    }

    /// Runs every field check of the schema; no request is made.
    pub fn validate(&mut self) -> Result<(), Vec<ValidationError>> {
        self.errors = self
            .schema()
            .iter()
            .flat_map(|spec| {
                let value = self.model.field(spec.name);
                spec.rules
                    .iter()
                    .filter_map(move |rule| rule.check(spec.name, value.as_deref()).err())
            })
            .collect();

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Attaches `policy` with `value`; the policy must target this type.
    pub fn attach_policy(&mut self, policy: &Policy, value: Value) -> GecosResult<()> {
        if !policy.targets.is_empty() && !policy.targets.contains(&self.model.resource_type) {
            return Err(ValidationError::ConstraintViolation(format!(
                "Policy '{}' cannot be applied to a {}",
                policy.name, self.model.resource_type
            ))
            .into());
        }
        self.model
            .policies
            .insert(policy.id.to_string(), value);
        Ok(())
    }

    /// Removes a policy; returns its previous value.
    pub fn detach_policy(&mut self, policy_id: &ResourceId) -> Option<Value> {
        self.model.policies.remove(policy_id.as_str())
    }

    /// Validates the form and stages the model for create/update.
    pub fn stage(&mut self, staging: &mut StagingBuffer) -> GecosResult<StagedHandle> {
        self.ensure_savable()?;
        if let Err(errors) = self.validate() {
            let first = errors
                .into_iter()
                .next()
                .unwrap_or_else(|| ValidationError::Format("Invalid form".to_string()));
            return Err(first.into());
        }
        self.stage_with(staging, SaveOptions::default())
    }

    /// Stages the deletion of the resource.
    pub fn stage_delete(&mut self, staging: &mut StagingBuffer) -> GecosResult<StagedHandle> {
        self.ensure_savable()?;
        self.stage_with(staging, SaveOptions::destroy())
    }

    /// Reacts to a notice from the live relay about any resource.
    pub fn apply_notice(&mut self, notice: &ViewNotice) {
        let Some(id) = self.model.id.clone() else {
            return;
        };
        match notice {
            ViewNotice::ResourceChanged { id: changed } if *changed == id => {
                self.save_disabled = true;
                self.alert = Some(Alert::changed_elsewhere(&id));
            }
            ViewNotice::ResourceDeleted { id: deleted } if *deleted == id => {
                self.save_disabled = true;
                self.alert = Some(Alert::deleted_elsewhere(&id));
            }
            _ => {}
        }
    }

    /// Replaces the model with a fresh server copy and re-enables saving.
    pub fn reload(&mut self, model: Resource) {
        self.model = model;
        self.errors.clear();
        self.alert = None;
        self.save_disabled = false;
    }

    fn ensure_savable(&self) -> GecosResult<()> {
        if self.save_disabled {
            return Err(ValidationError::ConstraintViolation(
                "The object was modified elsewhere; reload it first".to_string(),
            )
            .into());
        }
        Ok(())
    }

    fn stage_with(
        &mut self,
        staging: &mut StagingBuffer,
        options: SaveOptions,
    ) -> GecosResult<StagedHandle> {
        match staging.add(self.model.clone(), options) {
            Ok(handle) => Ok(handle),
            Err(GecosError::StagedForDeletion { id }) => {
                // Reported here, once; callers see the suppressed sentinel.
                self.alert = Some(Alert::staged_for_deletion(&ResourceId::new_unchecked(
                    id.clone(),
                )));
                Err(GecosError::StagedForDeletion { id })
            }
            Err(e) => {
                self.alert = Alert::from_error(self.model.id.as_ref(), &e);
                Err(e)
            }
        }
    }
}
