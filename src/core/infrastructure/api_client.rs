//! Internal HTTP client shared by every console component.

use crate::core::{
    config::ClientConfig,
    domain::{
        error::{GecosError, GecosResult},
        model::{
            gecos_connection::GecosConnection, list_page::ListPage, node_record::NodeRecord,
            resource::Resource, resource_type::ResourceType,
        },
        value_object::{NodePath, ResourceId},
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Callback invoked with the request path whenever the server answers 403.
pub type ForbiddenHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Internal HTTP client that talks to the GECOS Control Center API.
///
/// Every request goes through [`ApiClient::execute_request`], which applies
/// the optional rate limit, adds basic credentials, routes `403 Forbidden`
/// to the global forbidden handler and turns other failures into
/// [`GecosError`] values carrying the HTTP status and text.
pub struct ApiClient {
    http_client: Client,
    connection: GecosConnection,
    config: ClientConfig,
    rate_limiter: Option<DefaultDirectRateLimiter>,
    forbidden_handler: Option<ForbiddenHandler>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("connection", &self.connection)
            .field("config", &self.config)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Errors
    /// Returns `GecosError::Connection` if the HTTP client cannot be built.
    pub fn new(connection: GecosConnection, config: ClientConfig) -> GecosResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GecosError::Connection(e.to_string()))?;

        let rate_limiter = config.rate_limit.and_then(|rl| {
            let per_second = NonZeroU32::new(rl.requests_per_second)?;
            let burst = NonZeroU32::new(rl.burst_size).unwrap_or(per_second);
            Some(DefaultDirectRateLimiter::direct(
                Quota::per_second(per_second).allow_burst(burst),
            ))
        });

        Ok(Self {
            http_client,
            connection,
            config,
            rate_limiter,
            forbidden_handler: None,
        })
    }

    /// Installs the handler called on every `403 Forbidden` answer.
    pub fn set_forbidden_handler(&mut self, handler: ForbiddenHandler) {
        self.forbidden_handler = Some(handler);
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &GecosConnection {
        &self.connection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs a GET request with query parameters.
    pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> GecosResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::GET, path, query, None::<&()>)
            .await
    }

    /// Performs a POST request with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> GecosResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(Method::POST, path, &[], Some(body))
            .await
    }

    /// Performs a PUT request with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> GecosResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(Method::PUT, path, &[], Some(body))
            .await
    }

    /// Performs a DELETE request.
    pub async fn delete<T>(&self, path: &str) -> GecosResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::DELETE, path, &[], None::<&()>)
            .await
    }

    async fn execute_request<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> GecosResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let mut url = self.connection.base_url().join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        tracing::debug!(method = %method, url = %url, "GECOS API request");

        let mut req_builder = self.http_client.request(method.clone(), url);
        if let Some(credentials) = self.connection.credentials() {
            req_builder = req_builder.basic_auth(credentials.username(), Some(credentials.password()));
        }
        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| GecosError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            tracing::warn!(method = %method, path = %path, "Forbidden");
            if let Some(handler) = &self.forbidden_handler {
                handler(path);
            }
            return Err(GecosError::Forbidden(path.to_string()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GecosError::Connection(format!("Failed to read response: {}", e)))?;

        if status == StatusCode::NOT_FOUND {
            return Err(GecosError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                text
            };
            return Err(GecosError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text)
            .map_err(|e| GecosError::Decode(format!("Failed to parse response: {}", e)))
    }
}

/// Typed endpoints consumed by the tree, the staging buffer and the forms.
impl ApiClient {
    /// `GET /api/nodes/?path=&maxdepth=&pagesize=&page=`
    pub async fn fetch_nodes(
        &self,
        path: &NodePath,
        max_depth: Option<u32>,
        page_size: u32,
        page: Option<u32>,
    ) -> GecosResult<ListPage<NodeRecord>> {
        let mut query = vec![
            ("path", path.to_string()),
            ("pagesize", page_size.to_string()),
        ];
        if let Some(max_depth) = max_depth {
            query.push(("maxdepth", max_depth.to_string()));
        }
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        self.get("api/nodes/", &query).await
    }

    /// `GET /api/nodes/?oids=a,b,c`
    pub async fn fetch_nodes_by_ids(&self, ids: &[ResourceId]) -> GecosResult<Vec<NodeRecord>> {
        let oids = ids
            .iter()
            .map(ResourceId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let page: ListPage<NodeRecord> = self.get("api/nodes/", &[("oids", oids)]).await?;
        Ok(page.items)
    }

    /// `GET /api/{type}s/{id}/`
    pub async fn fetch_resource(
        &self,
        resource_type: ResourceType,
        id: &ResourceId,
    ) -> GecosResult<Resource> {
        self.get(&resource_type.resource_path(id.as_str()), &[])
            .await
    }

    /// `POST /api/{type}s/` for new resources, `PUT /api/{type}s/{id}/`
    /// otherwise. `arguments` are sent as query parameters.
    pub async fn save_resource(
        &self,
        resource: &Resource,
        arguments: &[(String, String)],
    ) -> GecosResult<serde_json::Value> {
        let method = if resource.is_new() {
            Method::POST
        } else {
            Method::PUT
        };
        let path = match &resource.id {
            Some(id) => resource.resource_type.resource_path(id.as_str()),
            None => resource.resource_type.collection_path(),
        };
        let query: Vec<(&str, String)> = arguments
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        self.execute_request(method, &path, &query, Some(resource))
            .await
    }

    /// `DELETE /api/{type}s/{id}/`
    pub async fn delete_resource(
        &self,
        resource_type: ResourceType,
        id: &ResourceId,
    ) -> GecosResult<serde_json::Value> {
        self.delete(&resource_type.resource_path(id.as_str()))
            .await
    }
}
