//! Self-update checks against a static release manifest

mod checker;
mod manifest;
mod version;

pub use checker::UpdateChecker;
pub use manifest::{Banners, ManifestInfo, Sections, UpdateOffer};
pub use version::{parse_version, update_available, HostEnvironment};
