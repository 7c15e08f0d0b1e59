//! Application context owning the state shared by every console view.

use crate::{
    cache::ObjectCache,
    core::{
        domain::{
            error::GecosResult,
            model::{resource::Resource, resource_type::ResourceType},
            value_object::ResourceId,
        },
        infrastructure::api_client::ApiClient,
    },
    staging::{SaveReport, StageKey, StagingBuffer},
    tree::NodeTree,
};
use std::sync::Arc;

/// The object cache, the staging buffer and the tree of one console
/// session.
///
/// Views receive the context explicitly; nothing here is global. All three
/// members live exactly as long as the context.
#[derive(Debug)]
pub struct ConsoleContext {
    api: Arc<ApiClient>,
    pub cache: ObjectCache<ResourceId, Resource>,
    pub staging: StagingBuffer,
    pub tree: NodeTree,
}

impl ConsoleContext {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let capacity = api.config().cache_capacity;
        Self {
            cache: ObjectCache::new(capacity),
            staging: StagingBuffer::new(api.clone()),
            tree: NodeTree::new(api.clone()),
            api,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Returns a resource, from the cache when it has been seen before.
    pub async fn resource(
        &mut self,
        resource_type: ResourceType,
        id: &ResourceId,
    ) -> GecosResult<Resource> {
        if let Some(resource) = self.cache.get(id) {
            return Ok(resource.clone());
        }
        self.refresh_resource(resource_type, id).await
    }

    /// Fetches a resource from the server and caches it.
    pub async fn refresh_resource(
        &mut self,
        resource_type: ResourceType,
        id: &ResourceId,
    ) -> GecosResult<Resource> {
        let resource = self.api.fetch_resource(resource_type, id).await?;
        self.cache.set(id.clone(), resource.clone());
        Ok(resource)
    }

    /// Unstages `id`; with `restore` the server copy replaces the cached
    /// one and is returned so the view can drop its local edits.
    pub async fn drop_staged(
        &mut self,
        id: &ResourceId,
        restore: bool,
    ) -> GecosResult<Option<Resource>> {
        let fresh = self.staging.drop_model(id, restore).await?;
        match &fresh {
            Some(resource) => {
                self.cache.set(id.clone(), resource.clone());
            }
            None => {
                self.cache.drop(id);
            }
        }
        Ok(fresh)
    }

    /// Commits the staging buffer. Cached copies of every touched resource
    /// are invalidated, whatever the outcome.
    pub async fn commit(&mut self) -> SaveReport {
        let touched: Vec<ResourceId> = self
            .staging
            .staged_keys()
            .into_iter()
            .filter_map(|key| match key {
                StageKey::Remote(id) => Some(id),
                StageKey::Local(_) => None,
            })
            .collect();

        let report = self.staging.save_all().await;
        for id in &touched {
            self.cache.drop(id);
        }
        report
    }
}
