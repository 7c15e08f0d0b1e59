use crate::{ClientConfig, GecosClient, Resource};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub(crate) fn create_test_client(mock_server: &MockServer, page_size: u32) -> GecosClient {
    GecosClient::builder()
        .url(&mock_server.uri())
        .unwrap()
        .credentials("admin", "secret")
        .config(ClientConfig {
            page_size,
            ..Default::default()
        })
        .build()
        .unwrap()
}

/// Node entry as served by `/api/nodes/`.
pub(crate) fn node(id: &str, name: &str, kind: &str, node_path: &str) -> Value {
    json!({"_id": id, "name": name, "type": kind, "path": node_path})
}

pub(crate) fn user(id: &str, name: &str) -> Resource {
    serde_json::from_value(json!({
        "_id": id,
        "name": name,
        "type": "user",
        "path": "root,A",
        "email": format!("{}@example.org", name)
    }))
    .unwrap()
}

pub(crate) async fn mount_root_listing(mock_server: &MockServer, nodes: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/nodes/"))
        .and(query_param("path", "root"))
        .and(query_param("maxdepth", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": nodes,
            "pages": 1
        })))
        .mount(mock_server)
        .await;
}

pub(crate) async fn mount_children_page(
    mock_server: &MockServer,
    node_path: &str,
    page: u32,
    pages: u32,
    nodes: Vec<Value>,
) {
    Mock::given(method("GET"))
        .and(path("/api/nodes/"))
        .and(query_param("path", node_path))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": nodes,
            "pages": pages
        })))
        .mount(mock_server)
        .await;
}
