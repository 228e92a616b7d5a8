//! Fixed endpoints, TTLs and the runtime configuration built from them
//!
//! Everything here is a compile-time constant in production. The config
//! structs exist so tests and staging setups can point the clients at a
//! different origin without touching the call sites.

use chrono::Duration;

/// Origin of the Holli backend
pub const API_ORIGIN: &str = "https://backend.holliapp.com";

/// Protocol version path segment appended after `/api/`
pub const API_VERSION: &str = "v3";

/// Booking page that product links point at
pub const BOOKING_LINK: &str = "https://www.tickets-tours.com/tour/details/?pid=";

/// Static release manifest polled by the update checker
pub const MANIFEST_URL: &str = "https://raw.githubusercontent.com/laemol/holli/master/info.json";

/// Slug this package is published under
pub const PLUGIN_SLUG: &str = "holli";

/// Version of this build, compared against the manifest
pub const INSTALLED_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the raw API key
pub const AUTH_HEADER: &str = "x-authorization";

/// Per-request network timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Time-to-live for catalog cache entries in hours
pub const CATALOG_TTL_HOURS: i64 = 24;

/// Time-to-live for the cached release manifest in hours
pub const MANIFEST_TTL_HOURS: i64 = 24;

/// Settings for [`CatalogClient`](crate::catalog::CatalogClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash
    pub api_origin: String,
    /// Version segment, e.g. `v3`
    pub api_version: String,
    /// Network timeout applied to every request
    pub timeout: std::time::Duration,
    /// How long a successful response stays fresh
    pub catalog_ttl: Duration,
    /// Skip cache reads and always hit the network (debug override)
    pub force_fresh: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_origin: API_ORIGIN.to_string(),
            api_version: API_VERSION.to_string(),
            timeout: std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS),
            catalog_ttl: Duration::hours(CATALOG_TTL_HOURS),
            force_fresh: false,
        }
    }
}

/// Settings for [`UpdateChecker`](crate::update::UpdateChecker)
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub manifest_url: String,
    pub slug: String,
    pub timeout: std::time::Duration,
    pub manifest_ttl: Duration,
    /// When false the manifest is fetched on every check and never stored
    pub cache_allowed: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            manifest_url: MANIFEST_URL.to_string(),
            slug: PLUGIN_SLUG.to_string(),
            timeout: std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS),
            manifest_ttl: Duration::hours(MANIFEST_TTL_HOURS),
            cache_allowed: true,
        }
    }
}
