//! Storage for the single API key / identity pair of an installation
//!
//! The settings UI is the only writer in production; the catalog client only
//! reads. The one exception is credential invalidation: an authentication
//! failure reported by the API clears the store so the user is prompted for a
//! new key instead of the client retrying a revoked one forever.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur when persisting credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// API key plus the GUID the backend assigns after the first identity check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_guid: Option<String>,
}

impl Credential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            api_guid: None,
        }
    }

    pub fn with_guid(mut self, api_guid: impl Into<String>) -> Self {
        self.api_guid = Some(api_guid.into());
        self
    }

    /// The key, if one is set and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

/// Holder of the installation's credential
pub trait CredentialStore: Send + Sync + fmt::Debug {
    /// Current credential; empty when nothing is configured
    fn get(&self) -> Credential;

    fn set(&self, credential: Credential) -> Result<(), CredentialError>;

    fn clear(&self) -> Result<(), CredentialError>;
}

/// Credential kept in a JSON settings file
///
/// Uses `~/.config/holli/settings.json` on Linux.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store in the platform config directory
    ///
    /// Returns `None` if the config directory cannot be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("com", "talpaq", "holli")?;
        Some(Self::with_path(project_dirs.config_dir().join("settings.json")))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Credential {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Credential::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read settings file, treating as empty");
                return Credential::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "settings file is unreadable, treating as empty");
            Credential::default()
        })
    }

    fn set(&self, credential: Credential) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&credential)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Credential held in memory for the life of the process
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Credential>,
}

impl MemoryCredentialStore {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(credential),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Credential {
        self.credential
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, credential: Credential) -> Result<(), CredentialError> {
        *self.credential.lock().unwrap_or_else(|e| e.into_inner()) = credential;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.set(Credential::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_blank_key_is_not_configured() {
        assert!(!Credential::default().is_configured());
        assert!(!Credential::new("   ").is_configured());
        assert_eq!(Credential::new(" abc ").api_key(), Some("abc"));
    }

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemoryCredentialStore::default();
        assert_eq!(store.get(), Credential::default());

        store.set(Credential::new("key-1").with_guid("guid-1")).unwrap();
        assert_eq!(store.get().api_key(), Some("key-1"));
        assert_eq!(store.get().api_guid.as_deref(), Some("guid-1"));

        store.clear().unwrap();
        assert!(!store.get().is_configured());
        assert!(store.get().api_guid.is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::with_path(temp_dir.path().join("conf").join("settings.json"));

        assert!(!store.get().is_configured());

        store.set(Credential::new("secret")).unwrap();
        let reloaded = FileCredentialStore::with_path(store.path().clone());
        assert_eq!(reloaded.get().api_key(), Some("secret"));
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::with_path(temp_dir.path().join("settings.json"));

        store.set(Credential::new("secret")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(store.get(), Credential::default());
    }

    #[test]
    fn test_file_store_tolerates_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileCredentialStore::with_path(path);
        assert_eq!(store.get(), Credential::default());
    }

    #[test]
    fn test_file_store_unreadable_path_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::create_dir(&path).unwrap();

        let store = FileCredentialStore::with_path(path);
        assert_eq!(store.get(), Credential::default());
        assert!(store.set(Credential::new("secret")).is_err());
    }

    #[test]
    fn test_settings_file_shape() {
        let json = serde_json::to_string(&Credential::new("k")).unwrap();
        assert_eq!(json, r#"{"api_key":"k"}"#);
    }
}
