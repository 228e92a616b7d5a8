//! Holli catalog sync library
//!
//! Fetches catalog listings from the Holli backend through a TTL response
//! cache, and checks a static release manifest for self-updates. The binary in
//! `main.rs` is a thin adapter over these modules.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod http;
pub mod update;
