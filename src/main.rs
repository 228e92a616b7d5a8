//! Holli CLI - fetch catalog data and check for updates
//!
//! Wires the file-backed stores, the reqwest transport and the clients
//! together and runs a single subcommand per invocation.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use holli::cache::{CacheStore, FileCache, MemoryCache};
use holli::catalog::{CatalogClient, CatalogRequest, FetchError, ProductQuery};
use holli::cli::{Cli, Command, KeyAction, LogLevel, UpdateAction};
use holli::config::ClientConfig;
use holli::credentials::{Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore};
use holli::http::{ReqwestTransport, Transport};
use holli::update::{HostEnvironment, UpdateChecker};

/// Logs go to stderr so stdout stays clean JSON
fn initialize_tracing(log_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_cache() -> Arc<dyn CacheStore> {
    match FileCache::new() {
        Some(cache) => Arc::new(cache),
        None => {
            warn!("no cache directory available, caching in memory for this run");
            Arc::new(MemoryCache::new())
        }
    }
}

fn open_credentials() -> Arc<dyn CredentialStore> {
    match FileCredentialStore::new() {
        Some(store) => Arc::new(store),
        None => {
            warn!("no config directory available, API key will not persist");
            Arc::new(MemoryCredentialStore::default())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints the outcome of a catalog call
///
/// A missing key is an expected state, not a failure.
fn report<T: Serialize>(result: Result<T, FetchError>) -> Result<ExitCode> {
    match result {
        Ok(value) => {
            print_json(&value)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(FetchError::NoCredential) => {
            eprintln!("{}", FetchError::NoCredential.user_message());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new());
    let cache = open_cache();
    let credentials = open_credentials();

    let config = ClientConfig {
        force_fresh: cli.fresh,
        ..Default::default()
    };
    let catalog = CatalogClient::new(transport.clone(), cache.clone(), credentials.clone())
        .with_config(config);
    let updates = UpdateChecker::new(transport, cache);

    match cli.command {
        Command::Products(args) => report(catalog.products(&ProductQuery::from(args)).await),
        Command::Product { id } => report(catalog.product(&id).await),
        Command::Zones => report(catalog.zones().await),
        Command::Categories => report(catalog.categories().await),
        Command::Fetch { path, params } => {
            let request = CatalogRequest {
                resource_path: path,
                query_params: params,
            };
            report(catalog.fetch_resource(&request).await)
        }
        Command::Status => report(catalog.verify_identity().await),
        Command::Key { action } => match action {
            KeyAction::Set { api_key } => {
                credentials
                    .set(Credential::new(api_key))
                    .context("failed to save API key")?;
                eprintln!("Saved!");
                Ok(ExitCode::SUCCESS)
            }
            KeyAction::Clear => {
                credentials.clear().context("failed to clear API key")?;
                Ok(ExitCode::SUCCESS)
            }
            KeyAction::Show => {
                let credential = credentials.get();
                print_json(&serde_json::json!({
                    "configured": credential.is_configured(),
                    "api_guid": credential.api_guid,
                }))?;
                Ok(ExitCode::SUCCESS)
            }
        },
        Command::Update { action } => match action {
            UpdateAction::Check {
                installed,
                host,
                runtime,
            } => {
                let host = HostEnvironment::new(host, runtime);
                print_json(&updates.offer(&installed, &host).await)?;
                Ok(ExitCode::SUCCESS)
            }
            UpdateAction::Purge => {
                updates.purge();
                Ok(ExitCode::SUCCESS)
            }
            UpdateAction::Installed { slugs } => {
                updates.on_installed(slugs.as_slice());
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
