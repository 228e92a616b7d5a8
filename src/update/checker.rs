//! Manifest polling with its own cache entry and purge hook

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::manifest::{ManifestInfo, UpdateOffer};
use super::version::{update_available, HostEnvironment};
use crate::cache::CacheStore;
use crate::config::UpdateConfig;
use crate::http::{HttpRequest, Transport, TransportError};

/// Why a manifest fetch failed; logged, never surfaced to callers
#[derive(Debug, Error)]
enum UpdateError {
    #[error("manifest request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("manifest endpoint returned HTTP {0}")]
    Status(u16),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Checks the release manifest for a newer version
///
/// Every failure is silent: a check that cannot reach the manifest falls back
/// to the last cached copy, or offers nothing.
#[derive(Clone)]
pub struct UpdateChecker {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
    config: UpdateConfig,
}

impl UpdateChecker {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            transport,
            cache,
            config: UpdateConfig::default(),
        }
    }

    pub fn with_config(mut self, config: UpdateConfig) -> Self {
        self.config = config;
        self
    }

    fn cache_key(&self) -> String {
        format!("update_{}", self.config.slug)
    }

    /// Current manifest: cached if fresh, else fetched, else the stale copy
    pub async fn manifest(&self) -> Option<ManifestInfo> {
        let key = self.cache_key();

        if self.config.cache_allowed {
            if let Some(value) = self.cache.get(&key) {
                match serde_json::from_value::<ManifestInfo>(value) {
                    Ok(manifest) => {
                        debug!(version = %manifest.version, "manifest cache hit");
                        return Some(manifest);
                    }
                    Err(e) => warn!(error = %e, "discarding unreadable cached manifest"),
                }
            }
        }

        match self.fetch_remote().await {
            Ok(manifest) => {
                if self.config.cache_allowed {
                    self.store(&key, &manifest);
                }
                Some(manifest)
            }
            Err(e) => {
                warn!(url = %self.config.manifest_url, error = %e, "update check failed");
                if !self.config.cache_allowed {
                    return None;
                }
                let stale = self.cache.read(&key)?;
                serde_json::from_value(stale.data).ok()
            }
        }
    }

    /// Returns the manifest when it describes an installable update
    pub async fn check_for_update(&self, installed_version: &str, host: &HostEnvironment) -> Option<ManifestInfo> {
        let manifest = self.manifest().await?;
        if update_available(installed_version, &manifest, host) {
            info!(installed = installed_version, available = %manifest.version, "update available");
            Some(manifest)
        } else {
            None
        }
    }

    /// Update notification payload for the host, if an update is available
    pub async fn offer(&self, installed_version: &str, host: &HostEnvironment) -> Option<UpdateOffer> {
        self.check_for_update(installed_version, host)
            .await
            .map(|manifest| UpdateOffer::from(&manifest))
    }

    /// Manifest details for the "view details" dialog of `slug`
    pub async fn details(&self, slug: &str) -> Option<ManifestInfo> {
        if slug != self.config.slug {
            return None;
        }
        self.manifest().await
    }

    /// Deletes the cached manifest
    ///
    /// Only call this once an update has actually been installed; a version
    /// mismatch alone is not a reason to refetch.
    pub fn purge(&self) {
        if let Err(e) = self.cache.delete(&self.cache_key()) {
            warn!(error = %e, "failed to purge cached manifest");
        }
    }

    /// Install hook: purges when this package is among the updated ones
    pub fn on_installed<S: AsRef<str>>(&self, updated_slugs: &[S]) {
        if updated_slugs.iter().any(|s| s.as_ref() == self.config.slug) {
            info!(slug = %self.config.slug, "package updated, purging cached manifest");
            self.purge();
        }
    }

    fn store(&self, key: &str, manifest: &ManifestInfo) {
        let result = serde_json::to_value(manifest)
            .map_err(Into::into)
            .and_then(|value: Value| self.cache.set(key, &value, self.config.manifest_ttl));
        if let Err(e) = result {
            warn!(error = %e, "failed to cache manifest");
        }
    }

    async fn fetch_remote(&self) -> Result<ManifestInfo, UpdateError> {
        let request = HttpRequest::get(&self.config.manifest_url, self.config.timeout)
            .header("Accept", "application/json");
        let response = self.transport.get(&request).await?;
        if !response.is_success() {
            return Err(UpdateError::Status(response.status));
        }
        Ok(serde_json::from_str(&response.body)?)
    }
}
