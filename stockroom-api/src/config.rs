//! Server configuration resolution
//!
//! **Priority:** command line / environment → TOML → compiled default
//!
//! The API key is special: when it is found nowhere, access control is
//! disabled and a warning is logged at startup.

use clap::Parser;
use std::path::PathBuf;
use stockroom_common::config::{
    first_configured, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use tracing::{info, warn};

/// Command-line arguments for stockroom-api
#[derive(Parser, Debug, Default)]
#[command(name = "stockroom-api")]
#[command(about = "Material inventory REST API")]
#[command(version)]
pub struct Args {
    /// Folder holding the database and uploaded photos
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "STOCKROOM_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "STOCKROOM_PORT")]
    pub port: Option<u16>,

    /// Shared secret required in the x-api-key header
    #[arg(long, env = "STOCKROOM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum request body size in bytes
    #[arg(long, env = "STOCKROOM_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Fully resolved server settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    /// Empty means access control disabled
    pub api_key: String,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl ServerSettings {
    pub fn resolve(args: &Args, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = RootFolderResolver::new("stockroom-api")
            .with_cli_arg(args.root_folder.clone())
            .with_toml(toml)
            .resolve();

        Self {
            root_folder,
            host: first_configured("host", args.host.clone(), toml.host.clone(), defaults.host),
            port: first_configured("port", args.port, toml.port, defaults.port),
            api_key: resolve_api_key(args.api_key.as_deref(), toml.api_key.as_deref()),
            max_upload_bytes: first_configured(
                "max_upload_bytes",
                args.max_upload_bytes,
                toml.max_upload_bytes,
                defaults.max_upload_bytes,
            ),
            log_level: first_configured(
                "log_level",
                args.log_level.clone(),
                Some(toml.logging.level.clone()),
                defaults.log_level,
            ),
        }
    }

    pub fn paths(&self) -> RootFolderInitializer {
        RootFolderInitializer::new(self.root_folder.clone())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve the shared secret from command line/environment, then TOML
///
/// Whitespace-only values count as unset.
pub fn resolve_api_key(cli_or_env: Option<&str>, toml: Option<&str>) -> String {
    let cli_or_env = cli_or_env.filter(|k| is_valid_key(k));
    let toml = toml.filter(|k| is_valid_key(k));

    if cli_or_env.is_some() && toml.is_some() {
        warn!("API key found in multiple sources: command line/environment, TOML. Using command line/environment.");
    }

    match (cli_or_env, toml) {
        (Some(key), _) => {
            info!("API key loaded from command line/environment");
            key.to_string()
        }
        (None, Some(key)) => {
            info!("API key loaded from TOML config");
            key.to_string()
        }
        (None, None) => String::new(),
    }
}

/// Non-empty, non-whitespace
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
