//! Requests against the catalog API

use serde::{Deserialize, Serialize};

use crate::cache::fingerprint;

/// Namespace prefix for catalog entries in a shared cache
const CACHE_PREFIX: &str = "catalog_";

/// A resource path plus query parameters in caller-defined order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRequest {
    pub resource_path: String,
    pub query_params: Vec<(String, String)>,
}

impl CatalogRequest {
    pub fn new(resource_path: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            query_params: Vec::new(),
        }
    }

    /// Appends a parameter; order of calls is preserved
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((name.into(), value.to_string()));
        self
    }

    /// Cache key for this request
    ///
    /// Parameters are not sorted, so the same parameters supplied in a
    /// different order map to a different entry.
    pub fn cache_key(&self) -> String {
        format!(
            "{}{}",
            CACHE_PREFIX,
            fingerprint(&self.resource_path, &self.query_params)
        )
    }
}

/// Listing options for the `products` resource
///
/// Defaults are those of the embeddable product widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Number of products to return
    pub limit: u32,
    /// Zone id to restrict to; empty means all areas
    pub area: String,
    /// Only recommended products, in random order
    pub recommended: bool,
    pub lang: String,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            limit: 4,
            area: String::new(),
            recommended: false,
            lang: "en".to_string(),
        }
    }
}

impl ProductQuery {
    pub fn to_request(&self) -> CatalogRequest {
        CatalogRequest::new("products")
            .param("limit", self.limit)
            .param("zone_id", &self.area)
            .param("recommended", u8::from(self.recommended))
            .param("lang", &self.lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_query_defaults() {
        let request = ProductQuery::default().to_request();
        assert_eq!(request.resource_path, "products");
        assert_eq!(
            request.query_params,
            vec![
                ("limit".to_string(), "4".to_string()),
                ("zone_id".to_string(), String::new()),
                ("recommended".to_string(), "0".to_string()),
                ("lang".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn test_recommended_flag_renders_as_digit() {
        let query = ProductQuery {
            recommended: true,
            ..Default::default()
        };
        assert!(query
            .to_request()
            .query_params
            .contains(&("recommended".to_string(), "1".to_string())));
    }

    #[test]
    fn test_cache_key_is_namespaced() {
        let key = CatalogRequest::new("zones").cache_key();
        assert!(key.starts_with("catalog_"));
    }

    #[test]
    fn test_cache_key_depends_on_params() {
        let a = ProductQuery::default().to_request().cache_key();
        let b = ProductQuery {
            limit: 8,
            ..Default::default()
        }
        .to_request()
        .cache_key();
        assert_ne!(a, b);
    }
}
