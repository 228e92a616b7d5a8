//! Version parsing and the "update available" decision

use semver::Version;
use tracing::debug;

use super::manifest::ManifestInfo;

/// Versions of the environment the package runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    pub host_version: String,
    pub runtime_version: String,
}

impl HostEnvironment {
    pub fn new(host_version: impl Into<String>, runtime_version: impl Into<String>) -> Self {
        Self {
            host_version: host_version.into(),
            runtime_version: runtime_version.into(),
        }
    }
}

/// Parses a version, padding missing minor/patch components
///
/// `5` and `5.0` both read as `5.0.0`; a leading `v` is ignored.
pub fn parse_version(raw: &str) -> Result<Version, semver::Error> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);
    let split = raw.find(|c: char| c == '-' || c == '+').unwrap_or(raw.len());
    let (core, suffix) = raw.split_at(split);

    let mut padded = core.to_string();
    for _ in core.split('.').count()..3 {
        padded.push_str(".0");
    }
    padded.push_str(suffix);
    Version::parse(&padded)
}

/// `true` if `current` is at least `required`; an absent requirement always holds
fn satisfies(current: &str, required: Option<&str>) -> Result<bool, semver::Error> {
    match required.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(true),
        Some(required) => Ok(parse_version(current)? >= parse_version(required)?),
    }
}

/// Whether `manifest` should be offered as an update
///
/// Requires all of: the manifest version is newer than `installed`, the host
/// meets `requires`, and the runtime meets `requires_php`. Any version that
/// fails to parse means no offer.
pub fn update_available(installed: &str, manifest: &ManifestInfo, host: &HostEnvironment) -> bool {
    let decide = || -> Result<bool, semver::Error> {
        if parse_version(installed)? >= parse_version(&manifest.version)? {
            debug!(installed, remote = %manifest.version, "installed version is current");
            return Ok(false);
        }
        if !satisfies(&host.host_version, manifest.requires_host.as_deref())? {
            debug!(host = %host.host_version, required = ?manifest.requires_host, "host too old for update");
            return Ok(false);
        }
        if !satisfies(&host.runtime_version, manifest.requires_runtime.as_deref())? {
            debug!(runtime = %host.runtime_version, required = ?manifest.requires_runtime, "runtime too old for update");
            return Ok(false);
        }
        Ok(true)
    };

    decide().unwrap_or_else(|e| {
        debug!(error = %e, "unparseable version in update check");
        false
    })
}
