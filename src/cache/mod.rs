//! Response cache with per-entry expiry
//!
//! Both the catalog client and the update checker go through the
//! [`CacheStore`] trait. Expiry is evaluated lazily on read; nothing sweeps
//! old entries. Two stores are provided: [`FileCache`] persists entries as
//! JSON files in the XDG cache directory, [`MemoryCache`] keeps them in
//! process memory.

mod file;
mod fingerprint;
mod memory;
mod store;

pub use file::FileCache;
pub use fingerprint::fingerprint;
pub use memory::MemoryCache;
pub use store::{CacheEntry, CacheError, CacheStore, CachedData};
