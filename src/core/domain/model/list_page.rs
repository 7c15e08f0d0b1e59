//! Paged list envelopes returned by every listing endpoint.

use serde::Deserialize;

/// `{<list key>: [...], pages: N}` envelope.
///
/// Each endpoint names its list after the resource it returns; the aliases
/// cover every listing the console consumes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListPage<T> {
    #[serde(
        alias = "nodes",
        alias = "policies",
        alias = "jobs",
        alias = "packages",
        alias = "serviceproviders",
        alias = "printer_models"
    )]
    pub items: Vec<T>,
    /// Total number of pages; the server omits it for unpaged requests.
    #[serde(default = "default_pages")]
    pub pages: u32,
    /// Current page, when the server echoes it.
    #[serde(default)]
    pub page: Option<u32>,
}

fn default_pages() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_aliases() {
        let page: ListPage<serde_json::Value> =
            serde_json::from_str(r#"{"nodes": [{"a": 1}], "pages": 3}"#).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pages, 3);

        let page: ListPage<serde_json::Value> =
            serde_json::from_str(r#"{"printer_models": []}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pages, 1);
    }
}
