//! Command-line interface parsing for the Holli client
//!
//! The binary plays the part of the host adapter: each subcommand maps onto
//! one typed call into the catalog client, the credential store or the
//! update checker.

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::catalog::ProductQuery;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A `--param` value without `=`
    #[error("Invalid parameter: '{0}'. Expected NAME=VALUE")]
    InvalidParam(String),
}

/// Holli catalog client
#[derive(Parser, Debug)]
#[command(name = "holli")]
#[command(about = "Fetch Holli catalog data and check for updates")]
#[command(version)]
pub struct Cli {
    /// Ignore cached responses and always ask the API
    #[arg(long, global = true)]
    pub fresh: bool,

    /// Log verbosity (RUST_LOG overrides this)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List products
    Products(ProductArgs),
    /// Show a single product
    Product {
        id: String,
    },
    /// List zones usable as `--area`
    Zones,
    /// List categories
    Categories,
    /// Fetch any resource as raw JSON
    ///
    /// Parameters are sent in the order given.
    Fetch {
        /// Resource path below /api/v3/, e.g. `products`
        path: String,
        /// Query parameter as NAME=VALUE, repeatable
        #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Check the configured API key against the backend
    Status,
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Self-update checks
    Update {
        #[command(subcommand)]
        action: UpdateAction,
    },
}

/// Listing options of `products`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProductArgs {
    /// Number of products to show
    #[arg(long, default_value_t = 4)]
    pub limit: u32,
    /// Zone id to restrict to (see `zones`)
    #[arg(long, default_value = "")]
    pub area: String,
    /// Only recommended products, in random order
    #[arg(long)]
    pub recommended: bool,
    #[arg(long, default_value = "en")]
    pub lang: String,
}

impl From<ProductArgs> for ProductQuery {
    fn from(args: ProductArgs) -> Self {
        Self {
            limit: args.limit,
            area: args.area,
            recommended: args.recommended,
            lang: args.lang,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Store a new API key
    Set { api_key: String },
    /// Remove the stored API key
    Clear,
    /// Show whether a key is configured
    Show,
}

#[derive(Subcommand, Debug)]
pub enum UpdateAction {
    /// Check the release manifest for a newer version
    Check {
        /// Installed version to compare against
        #[arg(long, default_value = crate::config::INSTALLED_VERSION)]
        installed: String,
        /// Host platform version
        #[arg(long)]
        host: String,
        /// Runtime version
        #[arg(long)]
        runtime: String,
    },
    /// Drop the cached manifest
    Purge,
    /// Report that packages were installed; purges if this one is among them
    Installed {
        slugs: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Parses a `NAME=VALUE` argument; the value may be empty
pub fn parse_param(s: &str) -> Result<(String, String), CliError> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| CliError::InvalidParam(s.to_string()))?;
    if name.is_empty() {
        return Err(CliError::InvalidParam(s.to_string()));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("limit=4").unwrap(),
            ("limit".to_string(), "4".to_string())
        );
        assert_eq!(parse_param("area=").unwrap(), ("area".to_string(), String::new()));
        assert_eq!(
            parse_param("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn test_parse_param_invalid() {
        let err = parse_param("limit").unwrap_err();
        assert!(err.to_string().contains("Invalid parameter"));
        assert!(parse_param("=4").is_err());
    }

    #[test]
    fn test_cli_parse_products_defaults() {
        let cli = Cli::parse_from(["holli", "products"]);
        assert!(!cli.fresh);
        assert_eq!(cli.log_level, LogLevel::Warn);
        match cli.command {
            Command::Products(args) => assert_eq!(ProductQuery::from(args), ProductQuery::default()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_products_options() {
        let cli = Cli::parse_from([
            "holli", "products", "--limit", "8", "--area", "3", "--recommended", "--lang", "nl",
        ]);
        let Command::Products(args) = cli.command else {
            panic!("expected products");
        };
        let query = ProductQuery::from(args);
        assert_eq!(query.limit, 8);
        assert_eq!(query.area, "3");
        assert!(query.recommended);
        assert_eq!(query.lang, "nl");
    }

    #[test]
    fn test_cli_parse_fetch_keeps_param_order() {
        let cli = Cli::parse_from([
            "holli", "fetch", "products", "--param", "lang=en", "--param", "limit=4",
        ]);
        let Command::Fetch { path, params } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(path, "products");
        assert_eq!(params[0].0, "lang");
        assert_eq!(params[1].0, "limit");
    }

    #[test]
    fn test_cli_rejects_bad_param() {
        let result = Cli::try_parse_from(["holli", "fetch", "products", "--param", "oops"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["holli", "zones", "--fresh", "--log-level", "debug"]);
        assert!(cli.fresh);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert!(matches!(cli.command, Command::Zones));
    }

    #[test]
    fn test_cli_parse_update_check() {
        let cli = Cli::parse_from(["holli", "update", "check", "--host", "6.2", "--runtime", "8.1"]);
        match cli.command {
            Command::Update {
                action: UpdateAction::Check { installed, host, runtime },
            } => {
                assert_eq!(installed, crate::config::INSTALLED_VERSION);
                assert_eq!(host, "6.2");
                assert_eq!(runtime, "8.1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_update_check_requires_host_versions() {
        assert!(Cli::try_parse_from(["holli", "update", "check"]).is_err());
    }

    #[test]
    fn test_cli_parse_key_set() {
        let cli = Cli::parse_from(["holli", "key", "set", "abc123"]);
        assert!(matches!(
            cli.command,
            Command::Key { action: KeyAction::Set { ref api_key } } if api_key == "abc123"
        ));
    }
}
