//! The release manifest served at the fixed manifest URL

use serde::{Deserialize, Serialize};

/// Latest publishable release, as described by the manifest JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestInfo {
    pub name: String,
    pub slug: String,
    pub version: String,
    /// Minimum host version
    #[serde(rename = "requires", default, skip_serializing_if = "Option::is_none")]
    pub requires_host: Option<String>,
    /// Minimum runtime version
    #[serde(rename = "requires_php", default, skip_serializing_if = "Option::is_none")]
    pub requires_runtime: Option<String>,
    /// Highest host version the release was tested against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested: Option<String>,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default)]
    pub sections: Sections,
    #[serde(default)]
    pub banners: Banners,
}

/// HTML sections shown in the "view details" dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub installation: Option<String>,
    #[serde(default)]
    pub changelog: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banners {
    #[serde(default)]
    pub low: Option<String>,
    #[serde(default)]
    pub high: Option<String>,
}

/// What the host's update notification needs to offer an install
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOffer {
    pub slug: String,
    pub new_version: String,
    /// Download location of the release archive
    pub package: String,
    pub tested: Option<String>,
    pub requires_host: Option<String>,
    pub requires_runtime: Option<String>,
}

impl From<&ManifestInfo> for UpdateOffer {
    fn from(manifest: &ManifestInfo) -> Self {
        Self {
            slug: manifest.slug.clone(),
            new_version: manifest.version.clone(),
            package: manifest.download_url.clone(),
            tested: manifest.tested.clone(),
            requires_host: manifest.requires_host.clone(),
            requires_runtime: manifest.requires_runtime.clone(),
        }
    }
}
