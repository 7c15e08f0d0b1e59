mod cache;
mod console;
mod core;
mod forms;
mod live;
mod staging;
mod tree;

pub use crate::cache::{DEFAULT_CAPACITY, ObjectCache};
pub use crate::console::ConsoleContext;
pub use crate::core::{
    config::{ClientConfig, RateLimitConfig},
    domain::{
        error::{GecosError, GecosResult, ValidationError},
        model::{
            catalog::{Package, PrinterModel, ServiceProvider},
            gecos_connection::{Credentials, GecosConnection},
            job::{JobQuery, JobRecord, JobStatus},
            list_page::ListPage,
            live_event::{EventObject, LiveEvent, LiveMessage},
            node_record::NodeRecord,
            policy::{Policy, PolicyQuery},
            resource::Resource,
            resource_type::ResourceType,
        },
        value_object::{FieldRule, GecosUrl, NodePath, ResourceId},
    },
    infrastructure::api_client::{ApiClient, ForbiddenHandler},
};
pub use crate::forms::{Alert, AlertLevel, FieldSpec, ResourceEditor, form_schema};
pub use crate::live::{LiveUpdateRelay, ViewNotice};
pub use crate::staging::{
    SaveFailure, SaveOptions, SaveReport, StageKey, StagedHandle, StagedOutcome, StagingBuffer,
    StagingEntry,
};
pub use crate::tree::{NodeState, NodeStatus, NodeTree, PagedChildren, TreeChange, TreeNode};

use std::sync::Arc;

/// A client for the GECOS Control Center API
///
/// This client provides:
/// - The console state ([`ConsoleContext`]): tree, object cache and
///   staging buffer
/// - The live update relay ([`LiveUpdateRelay`])
/// - Catalog lookups used by the forms (policies, packages, service
///   providers, printer models) and the job log
///
/// # Examples
///
/// ```no_run
/// use gecos_console::{GecosClient, GecosResult, NodePath};
///
/// #[tokio::main]
/// async fn main() -> GecosResult<()> {
///     let client = GecosClient::builder()
///         .url("https://gecoscc.example.org")?
///         .credentials("admin", "password")
///         .build()?;
///
///     let mut console = client.console();
///     console.tree.reload_tree().await?;
///     console
///         .tree
///         .load_from_path(&NodePath::parse("root,5a1f0e3b9c7d2e0012345678")?, None, false)
///         .await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GecosClient {
    pub(crate) api_client: Arc<ApiClient>,
}

/// Builder for GecosClient configuration
#[derive(Default)]
pub struct GecosClientBuilder {
    url: Option<GecosUrl>,
    credentials: Option<Credentials>,
    config: ClientConfig,
    forbidden_handler: Option<ForbiddenHandler>,
}

impl GecosClientBuilder {
    /// Sets the Control Center base URL.
    pub fn url(mut self, url: &str) -> GecosResult<Self> {
        self.url = Some(GecosUrl::new(url)?);
        Ok(self)
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.config.rate_limit = Some(RateLimitConfig {
            requests_per_second,
            burst_size,
        });
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    /// Handler called whenever the server answers `403 Forbidden`.
    pub fn on_forbidden<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.forbidden_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> GecosResult<GecosClient> {
        let url = self.url.ok_or_else(|| ValidationError::Field {
            field: "url".to_string(),
            message: "URL is required".to_string(),
        })?;

        if let Some(credentials) = &self.credentials {
            if credentials.username().is_empty() {
                return Err(ValidationError::Field {
                    field: "username".to_string(),
                    message: "Username cannot be empty".to_string(),
                }
                .into());
            }
        }

        let connection = GecosConnection::new(url, self.credentials);
        let mut api_client = ApiClient::new(connection, self.config)?;
        if let Some(handler) = self.forbidden_handler {
            api_client.set_forbidden_handler(handler);
        }

        Ok(GecosClient {
            api_client: Arc::new(api_client),
        })
    }
}

impl GecosClient {
    /// Creates a new builder for GecosClient configuration
    pub fn builder() -> GecosClientBuilder {
        GecosClientBuilder::default()
    }

    /// Creates the console state of a new session.
    pub fn console(&self) -> ConsoleContext {
        ConsoleContext::new(self.api_client.clone())
    }

    /// Creates a live relay filtering job notices on the logged-in user.
    pub fn live_relay(&self) -> LiveUpdateRelay {
        LiveUpdateRelay::new(
            self.api_client
                .connection()
                .username()
                .map(ToString::to_string),
        )
    }

    pub fn config(&self) -> &ClientConfig {
        self.api_client.config()
    }

    /// Fetches one resource, bypassing any cache.
    pub async fn resource(
        &self,
        resource_type: ResourceType,
        id: &ResourceId,
    ) -> GecosResult<Resource> {
        self.api_client.fetch_resource(resource_type, id).await
    }

    /// Looks policies up by id, optionally scoped to an OU and an item.
    pub async fn policies(&self, query: &PolicyQuery) -> GecosResult<Vec<Policy>> {
        let mut params = Vec::new();
        if !query.ids.is_empty() {
            let oids = query
                .ids
                .iter()
                .map(ResourceId::as_str)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("oids", oids));
        }
        if let Some(ou_id) = &query.ou_id {
            params.push(("ou_id", ou_id.to_string()));
        }
        if let Some(item_id) = &query.item_id {
            params.push(("item_id", item_id.to_string()));
        }
        let page: ListPage<Policy> = self.api_client.get("api/policies/", &params).await?;
        Ok(page.items)
    }

    /// One page of the job log.
    pub async fn jobs(&self, query: &JobQuery) -> GecosResult<ListPage<JobRecord>> {
        let mut params = vec![
            ("page", query.page.max(1).to_string()),
            ("pagesize", query.page_size.max(1).to_string()),
        ];
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(archived) = query.archived {
            params.push(("archived", archived.to_string()));
        }
        self.api_client.get("api/jobs/", &params).await
    }

    /// Archives every finished job of the current administrator.
    pub async fn archive_jobs(&self) -> GecosResult<serde_json::Value> {
        self.api_client
            .put("api/archive_jobs/", &serde_json::json!({}))
            .await
    }

    pub async fn packages(&self, package_name: &str) -> GecosResult<Vec<Package>> {
        let page: ListPage<Package> = self
            .api_client
            .get("api/packages/", &[("package_name", package_name.to_string())])
            .await?;
        Ok(page.items)
    }

    pub async fn service_providers(&self, name: &str) -> GecosResult<Vec<ServiceProvider>> {
        let page: ListPage<ServiceProvider> = self
            .api_client
            .get("api/serviceproviders/", &[("name", name.to_string())])
            .await?;
        Ok(page.items)
    }

    /// One page of the printer model catalog, filtered by manufacturer and
    /// model name.
    pub async fn printer_models(
        &self,
        manufacturer: Option<&str>,
        model: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> GecosResult<ListPage<PrinterModel>> {
        let mut params = vec![
            ("page", page.max(1).to_string()),
            ("pagesize", page_size.max(1).to_string()),
        ];
        if let Some(manufacturer) = manufacturer {
            params.push(("manufacturer", manufacturer.to_string()));
        }
        if let Some(model) = model {
            params.push(("imodel", model.to_string()));
        }
        self.api_client.get("api/printer_models/", &params).await
    }
}

#[cfg(test)]
mod tests;
