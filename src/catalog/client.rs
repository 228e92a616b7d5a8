//! Authenticated, cached access to the catalog API

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::FetchError;
use super::model::{CategoryList, Customer, CustomerList, ProductDetail, ProductList, ZoneList};
use super::request::{CatalogRequest, ProductQuery};
use crate::cache::CacheStore;
use crate::config::{ClientConfig, AUTH_HEADER};
use crate::credentials::CredentialStore;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Whether a fetch may be answered from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheMode {
    ReadThrough,
    Fresh,
}

/// Client for the Holli catalog API
///
/// Identical requests inside the TTL window are answered from the cache, so
/// each distinct request costs at most one network call per window. Two
/// concurrent misses for the same key may both go to the network; the later
/// write wins.
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
    credentials: Arc<dyn CredentialStore>,
    config: ClientConfig,
}

impl CatalogClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            transport,
            cache,
            credentials,
            config: ClientConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Fetches a resource, consulting the cache first
    ///
    /// # Returns
    /// * `Ok(Value)` - decoded JSON body, fresh from cache or network
    /// * `Err(FetchError::NoCredential)` - no key configured; nothing was attempted
    /// * `Err(FetchError)` - network, API or decode failure; nothing was cached
    pub async fn fetch(&self, request: &CatalogRequest) -> Result<Value, FetchError> {
        let mode = if self.config.force_fresh {
            CacheMode::Fresh
        } else {
            CacheMode::ReadThrough
        };
        self.fetch_with(request, mode).await
    }

    /// Fetches a resource and enforces credential invalidation
    ///
    /// Same as [`fetch`](Self::fetch), except that an authentication failure
    /// clears the stored credential before the error is returned.
    pub async fn fetch_resource(&self, request: &CatalogRequest) -> Result<Value, FetchError> {
        let result = self.fetch(request).await;
        self.invalidate_on_auth_failure(result)
    }

    pub async fn products(&self, query: &ProductQuery) -> Result<ProductList, FetchError> {
        self.fetch_as(&query.to_request()).await
    }

    pub async fn product(&self, product_id: &str) -> Result<ProductDetail, FetchError> {
        self.fetch_as(&CatalogRequest::new(format!("products/{}", product_id)))
            .await
    }

    pub async fn zones(&self) -> Result<ZoneList, FetchError> {
        self.fetch_as(&CatalogRequest::new("zones")).await
    }

    pub async fn categories(&self) -> Result<CategoryList, FetchError> {
        self.fetch_as(&CatalogRequest::new("categories")).await
    }

    /// Checks the configured key against the `customers` endpoint
    ///
    /// Always goes to the network. On success the customer identity is stored
    /// as the credential's GUID.
    pub async fn verify_identity(&self) -> Result<Option<Customer>, FetchError> {
        let request = CatalogRequest::new("customers");
        let result = self.fetch_with(&request, CacheMode::Fresh).await;
        let value = self.invalidate_on_auth_failure(result)?;
        let customers: CustomerList = self.decode(&request, value)?;

        let Some(customer) = customers.data.into_iter().next() else {
            return Ok(None);
        };

        let mut credential = self.credentials.get();
        if credential.api_guid.as_deref() != Some(customer.identity()) {
            credential.api_guid = Some(customer.identity().to_string());
            if let Err(e) = self.credentials.set(credential) {
                warn!(error = %e, "failed to store API identity");
            } else {
                info!(guid = customer.identity(), "stored API identity");
            }
        }
        Ok(Some(customer))
    }

    async fn fetch_as<T: DeserializeOwned>(&self, request: &CatalogRequest) -> Result<T, FetchError> {
        let value = self.fetch_resource(request).await?;
        self.decode(request, value)
    }

    /// Decodes into an endpoint type; a body of the wrong shape is evicted
    fn decode<T: DeserializeOwned>(&self, request: &CatalogRequest, value: Value) -> Result<T, FetchError> {
        serde_json::from_value(value).map_err(|e| {
            error!(resource = %request.resource_path, error = %e, "catalog response has unexpected shape");
            if let Err(e) = self.cache.delete(&request.cache_key()) {
                warn!(error = %e, "failed to evict malformed cache entry");
            }
            FetchError::Decode(e.to_string())
        })
    }

    fn invalidate_on_auth_failure(&self, result: Result<Value, FetchError>) -> Result<Value, FetchError> {
        if let Err(err) = &result {
            if err.is_auth_failure() {
                warn!(error = %err, "API rejected the key, clearing stored credential");
                if let Err(e) = self.credentials.clear() {
                    error!(error = %e, "failed to clear credential");
                }
            }
        }
        result
    }

    async fn fetch_with(&self, request: &CatalogRequest, mode: CacheMode) -> Result<Value, FetchError> {
        let credential = self.credentials.get();
        let Some(api_key) = credential.api_key() else {
            debug!(resource = %request.resource_path, "no API key configured, skipping fetch");
            return Err(FetchError::NoCredential);
        };

        let key = request.cache_key();
        if mode == CacheMode::ReadThrough {
            if let Some(value) = self.cache.get(&key) {
                debug!(resource = %request.resource_path, key = %key, "catalog cache hit");
                return Ok(value);
            }
        }

        let url = self.endpoint_url(request)?;
        debug!(%url, "fetching catalog resource");

        let http_request = HttpRequest::get(url, self.config.timeout)
            .header(AUTH_HEADER, api_key)
            .header("Content-Type", "application/json");

        let response = self.transport.get(&http_request).await.map_err(|e| {
            warn!(resource = %request.resource_path, error = %e, "catalog request failed");
            FetchError::Transport(e.to_string())
        })?;

        let value = classify_response(&response).inspect_err(|e| {
            if let FetchError::Decode(_) = e {
                error!(resource = %request.resource_path, status = response.status, error = %e, "malformed catalog response");
            } else {
                warn!(resource = %request.resource_path, error = %e, "catalog API returned an error");
            }
        })?;

        if let Err(e) = self.cache.set(&key, &value, self.config.catalog_ttl) {
            warn!(key = %key, error = %e, "failed to cache catalog response");
        }
        Ok(value)
    }

    /// `{origin}/api/{version}/{path}?{params}`
    fn endpoint_url(&self, request: &CatalogRequest) -> Result<String, FetchError> {
        let base = format!(
            "{}/api/{}/{}",
            self.config.api_origin.trim_end_matches('/'),
            self.config.api_version,
            request.resource_path.trim_start_matches('/')
        );
        let mut url = Url::parse(&base)
            .map_err(|e| FetchError::Transport(format!("invalid endpoint URL {base}: {e}")))?;
        if !request.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query_params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url.into())
    }
}

/// Sorts a raw response into a payload or an error
fn classify_response(response: &HttpResponse) -> Result<Value, FetchError> {
    if !response.is_success() {
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| api_error_message(&body))
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        return Err(FetchError::Api {
            status: Some(response.status),
            message,
        });
    }

    let value: Value =
        serde_json::from_str(&response.body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if let Some(message) = api_error_message(&value) {
        return Err(FetchError::Api {
            status: Some(response.status),
            message,
        });
    }
    Ok(value)
}

/// Extracts `error.message` from a `{ "error": ... }` body
fn api_error_message(body: &Value) -> Option<String> {
    let error = body.get("error").filter(|e| !e.is_null())?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .unwrap_or("unknown API error");
    Some(message.to_string())
}
